//! # 错误类型模块
//!
//! 隐写核心返回的所有错误都在这里定义。命令行层再用 `anyhow` 包装并附加上下文。

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 带有内部 [`StegoError`] 的 `Result` 别名。
pub type Result<T> = std::result::Result<T, StegoError>;

/// 流水线中可能失败的外部变换阶段。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Compress,
    Encrypt,
    Decrypt,
    Decompress,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Compress => "compression",
            Stage::Encrypt => "encryption",
            Stage::Decrypt => "decryption",
            Stage::Decompress => "decompression",
        })
    }
}

/// 压缩或加密协作者返回的错误。
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("gzip stream error: {0}")]
    Gzip(#[from] std::io::Error),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("an encryption key is required when encryption is enabled")]
    EmptyKey,

    #[error("cipher rejected the data (wrong key or corrupted ciphertext)")]
    Cipher,

    #[error("ciphertext too short: {len} bytes, at least {min} required")]
    CiphertextTooShort { len: usize, min: usize },
}

/// 隐写核心的错误类型。
#[derive(Error, Debug)]
pub enum StegoError {
    /// 载体容量不足，在写入任何像素之前就被拒绝。
    #[error("Not enough space in the image. Required: {required} bits, Available: {available} bits")]
    InsufficientCapacity { required: u64, available: u64 },

    /// 扫描完整个载体也没有找到终止符。
    #[error(
        "No terminator found after reading {bits_read} bits; the image probably carries no payload"
    )]
    NoTerminatorFound { bits_read: usize },

    /// 去掉终止符后剩余的位数不是 8 的倍数。
    #[error("Malformed bit stream: {len} bits is not a whole number of bytes")]
    MalformedBitLength { len: usize },

    /// 外部变换失败，标注出错的阶段。
    #[error("The {stage} stage failed: {source}")]
    Transform {
        stage: Stage,
        #[source]
        source: TransformError,
    },

    /// 调用方取消了正在进行的操作。
    #[error("The operation was cancelled")]
    Cancelled,

    /// 输出格式是有损的，会破坏最低有效位。
    #[error("{format} is a lossy format and would destroy the hidden bits; use PNG, BMP, TIFF, WebP or QOI")]
    LossyFormat { format: String },

    /// 无法根据扩展名确定输出格式。
    #[error("Unsupported output image format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// 目标文件已存在且未允许覆盖。
    #[error("Output file already exists: {}", path.display())]
    OutputExists { path: PathBuf },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StegoError {
    pub(crate) fn transform(stage: Stage) -> impl FnOnce(TransformError) -> StegoError {
        move |source| StegoError::Transform { stage, source }
    }
}
