//! # red_lsb 库
//!
//! 本库包含红色通道 LSB 隐写工具的核心逻辑：位序列编解码、容量模型、
//! 通道嵌入与提取，以及组合压缩和加密的流水线。

// 声明库包含的所有模块。

pub mod bits;
pub mod capacity;
pub mod checksum;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod image_io;
pub mod pipeline;
pub mod progress;
pub mod steganography;
pub mod transform;
