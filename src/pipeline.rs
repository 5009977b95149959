//! # 流水线协调
//!
//! 固定压缩、加密与嵌入之间的顺序，使编码和解码严格互逆：
//!
//! * 编码: `载荷 -> [压缩] -> [加密] -> 嵌入`
//! * 解码: `提取 -> [解密] -> [解压] -> 载荷`
//!
//! 载体中不记录使用了哪些阶段，解码时必须提供与编码时相同的选项。
//! 选项不匹配时，解压非 gzip 数据会报错，而跳过解密则会直接得到密文。

use image::RgbImage;
use log::{debug, info, warn};

use crate::bits::{BitSequence, append_terminator, find_terminator, to_bits};
use crate::capacity::{capacity_bits, ensure_capacity};
use crate::constants::MAX_ENCRYPTION_ATTEMPTS;
use crate::error::{Result, Stage, StegoError, TransformError};
use crate::progress::Progress;
use crate::steganography::{embed_with_progress, extract_with_progress};
use crate::transform::{AesGcmCipher, Cipher, CompressionReport, Compressor, Gzip};

/// 编码与解码都要使用的阶段开关。提供密钥即表示启用加密。
#[derive(Clone, Debug, Default)]
pub struct PipelineOptions {
    pub compress: bool,
    pub key: Option<String>,
}

/// 空白密钥等同于没有密钥，在进入加密或解密阶段之前拒绝。
fn require_key(key: &str, stage: Stage) -> Result<&str> {
    if key.trim().is_empty() {
        return Err(StegoError::Transform {
            stage,
            source: TransformError::EmptyKey,
        });
    }
    Ok(key)
}

/// 经过所有可选变换后、准备嵌入的载荷。
#[derive(Clone, Debug)]
pub struct PreparedPayload {
    /// 变换后的载荷位序列，不含终止符。
    pub bits: BitSequence,
    /// 变换后的载荷字节数。
    pub len: usize,
    pub compression: Option<CompressionReport>,
    /// 载荷自身包含终止符时，第一次出现的位置。
    pub terminator_collision: Option<usize>,
}

/// 一次成功编码的摘要。
#[derive(Clone, Debug)]
pub struct EncodeReport {
    pub width: u32,
    pub height: u32,
    pub capacity_bits: u64,
    pub used_bits: u64,
    pub payload_len: usize,
    pub compression: Option<CompressionReport>,
    pub terminator_collision: Option<usize>,
}

pub struct Pipeline<C = Gzip, E = AesGcmCipher> {
    compressor: C,
    cipher: E,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Gzip::default(), AesGcmCipher::new())
    }
}

impl<C: Compressor, E: Cipher> Pipeline<C, E> {
    pub fn new(compressor: C, cipher: E) -> Self {
        Self { compressor, cipher }
    }

    /// 依次执行压缩和加密，并检查结果是否与终止符冲突。
    ///
    /// 启用加密时，若密文中出现终止符，会用新的盐和随机数重新加密，最多尝试
    /// [`MAX_ENCRYPTION_ATTEMPTS`] 次。未加密的数据无法重排，只记录冲突位置并发出警告。
    ///
    /// # Errors
    ///
    /// 任何一个变换失败时，返回带有阶段标记的 [`StegoError::Transform`]。
    pub fn prepare(&self, payload: &[u8], options: &PipelineOptions) -> Result<PreparedPayload> {
        let mut data = payload.to_vec();
        let mut compression = None;

        if options.compress {
            let compressed = self
                .compressor
                .compress(&data)
                .map_err(StegoError::transform(Stage::Compress))?;
            let report = CompressionReport {
                original_size: data.len(),
                compressed_size: compressed.len(),
            };
            info!(
                "Compressed {} bytes to {} bytes ({:.2}%)",
                report.original_size,
                report.compressed_size,
                report.ratio()
            );
            compression = Some(report);
            data = compressed;
        }

        let (bits, terminator_collision) = match &options.key {
            Some(key) => {
                let key = require_key(key, Stage::Encrypt)?;
                self.encrypt_avoiding_terminator(&mut data, key)?
            }
            None => {
                let bits = to_bits(&data);
                let collision = find_terminator(&bits);
                (bits, collision)
            }
        };

        if let Some(index) = terminator_collision {
            warn!(
                "The payload contains the terminator pattern at bit {index}; extraction will stop there"
            );
        }

        Ok(PreparedPayload {
            bits,
            len: data.len(),
            compression,
            terminator_collision,
        })
    }

    fn encrypt_avoiding_terminator(
        &self,
        data: &mut Vec<u8>,
        key: &str,
    ) -> Result<(BitSequence, Option<usize>)> {
        let mut attempt = 1;
        loop {
            let encrypted = self
                .cipher
                .encrypt(data, key)
                .map_err(StegoError::transform(Stage::Encrypt))?;
            let bits = to_bits(&encrypted);
            let collision = find_terminator(&bits);

            if collision.is_none() || attempt >= MAX_ENCRYPTION_ATTEMPTS {
                debug!("Encrypted payload after {attempt} attempt(s)");
                *data = encrypted;
                return Ok((bits, collision));
            }

            debug!("Ciphertext attempt {attempt} contains the terminator, re-encrypting");
            attempt += 1;
        }
    }

    /// 对载荷执行可选变换，检查容量，然后嵌入载体。
    ///
    /// 容量检查使用变换之后的长度，失败时不会写入任何像素。
    pub fn encode(
        &self,
        carrier: &RgbImage,
        payload: &[u8],
        options: &PipelineOptions,
        progress: &Progress,
    ) -> Result<(RgbImage, EncodeReport)> {
        let (width, height) = carrier.dimensions();
        let prepared = self.prepare(payload, options)?;

        ensure_capacity(width, height, prepared.len)?;

        let bits = append_terminator(prepared.bits);
        let used_bits = bits.len() as u64;
        let output = embed_with_progress(carrier, &bits, progress)?;

        Ok((
            output,
            EncodeReport {
                width,
                height,
                capacity_bits: capacity_bits(width, height),
                used_bits,
                payload_len: prepared.len,
                compression: prepared.compression,
                terminator_collision: prepared.terminator_collision,
            },
        ))
    }

    /// 提取载荷并按与编码相反的顺序撤销变换。
    pub fn decode(
        &self,
        carrier: &RgbImage,
        options: &PipelineOptions,
        progress: &Progress,
    ) -> Result<Vec<u8>> {
        let mut data = extract_with_progress(carrier, progress)?;
        debug!("Extracted {} bytes", data.len());

        if let Some(key) = &options.key {
            let key = require_key(key, Stage::Decrypt)?;
            data = self
                .cipher
                .decrypt(&data, key)
                .map_err(StegoError::transform(Stage::Decrypt))?;
        }

        if options.compress {
            data = self
                .compressor
                .decompress(&data)
                .map_err(StegoError::transform(Stage::Decompress))?;
        }

        Ok(data)
    }
}

/// 使用默认的 gzip 与 AES-GCM 变换进行编码。
pub fn encode(
    carrier: &RgbImage,
    payload: &[u8],
    options: &PipelineOptions,
) -> Result<(RgbImage, EncodeReport)> {
    Pipeline::default().encode(carrier, payload, options, &Progress::new())
}

/// 使用默认的 gzip 与 AES-GCM 变换进行解码。
pub fn decode(carrier: &RgbImage, options: &PipelineOptions) -> Result<Vec<u8>> {
    Pipeline::default().decode(carrier, options, &Progress::new())
}
