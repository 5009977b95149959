/// 终止符的位模式 `1111111111111110`，按 MSB 优先写入载体。
pub const TERMINATOR: u16 = 0xFFFE;

/// 终止符占用的位数。
pub const TERMINATOR_BITS: usize = 16;

/// 每个字节展开后的位数。
pub const BITS_PER_BYTE: usize = 8;

/// 加密阶段遇到终止符冲突时，重新加密的最大尝试次数。
pub const MAX_ENCRYPTION_ATTEMPTS: usize = 8;

/// 未指定输出路径时，隐写图像文件名的前缀。
pub const DOCTORED_PREFIX: &str = "doctored_";

/// 未指定输出路径时，恢复数据文件名的前缀。
pub const RECOVERED_PREFIX: &str = "recovered_";

/// 默认的隐写图像扩展名。
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// 默认的恢复数据扩展名。
pub const DEFAULT_PAYLOAD_EXTENSION: &str = "bin";

/// 提取时为位序列预先分配的最大位数，更大的载体按需增长。
pub const EXTRACT_RESERVE_BITS: usize = 1 << 20;

/// 计算 CRC 时读取文件所用的缓冲区大小 (字节)。
pub const CHECKSUM_BUFFER_SIZE: usize = 8192;

/// Argon2 盐的长度 (字节)。
pub const SALT_SIZE: usize = 16;

/// AES-GCM 随机数的长度 (字节)。
pub const NONCE_SIZE: usize = 12;

/// AES-GCM 认证标签的长度 (字节)。
pub const TAG_SIZE: usize = 16;
