//! # 完整性校验
//!
//! CRC-32 校验和，供调用方在提取之后验证载荷。隐写核心本身不会调用它。
//! 每次计算都使用新的 `Hasher`，不存在跨调用共享的状态。

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crc32fast::Hasher;

use crate::constants::CHECKSUM_BUFFER_SIZE;

/// 计算字节序列的 CRC-32。
pub fn crc32_bytes(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// 计算字符串 (UTF-8 编码) 的 CRC-32。
pub fn crc32_text(text: &str) -> u32 {
    crc32_bytes(text.as_bytes())
}

/// 分块读取文件并计算 CRC-32。
///
/// # Errors
///
/// 文件无法打开或读取时返回 I/O 错误。
pub fn crc32_file(path: &Path) -> io::Result<u32> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; CHECKSUM_BUFFER_SIZE];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

/// 实际校验和与期望值的比较结果。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Verification {
    pub expected: u32,
    pub actual: u32,
}

impl Verification {
    pub fn is_match(&self) -> bool {
        self.expected == self.actual
    }
}

pub fn verify_bytes(data: &[u8], expected: u32) -> Verification {
    Verification {
        expected,
        actual: crc32_bytes(data),
    }
}

/// 只读取一遍文件，同时得到实际校验和与比较结果。
pub fn verify_file(path: &Path, expected: u32) -> io::Result<Verification> {
    Ok(Verification {
        expected,
        actual: crc32_file(path)?,
    })
}

/// 以 8 位大写十六进制显示校验和。
pub fn format_crc(crc: u32) -> String {
    format!("{crc:08X}")
}

/// 解析十六进制校验和，允许 `0x` 前缀和大小写混用。
pub fn parse_crc(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u32::from_str_radix(digits, 16).ok()
}
