//! # 外部变换
//!
//! 压缩与加密都只是字节到字节的变换，流水线通过 [`Compressor`] 和 [`Cipher`] 两个 trait 调用它们。
//! 默认实现为 gzip (`flate2`) 和 Argon2id + AES-256-GCM。

use std::io::{Read, Write};

use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce, aead::Aead};
use argon2::Argon2;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::constants::{NONCE_SIZE, SALT_SIZE, TAG_SIZE};
use crate::error::TransformError;

/// 可逆的压缩变换。
pub trait Compressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, TransformError>;
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// 以外部密钥为参数的可逆加密变换。
pub trait Cipher {
    fn encrypt(&self, data: &[u8], key: &str) -> Result<Vec<u8>, TransformError>;
    fn decrypt(&self, data: &[u8], key: &str) -> Result<Vec<u8>, TransformError>;
}

/// gzip 格式的压缩。
#[derive(Clone, Copy, Debug)]
pub struct Gzip {
    level: Compression,
}

impl Gzip {
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl Default for Gzip {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl Compressor for Gzip {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), self.level);
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut decoder = GzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(decompressed)
    }
}

/// Argon2id 派生密钥的 AES-256-GCM 加密。
///
/// 输出格式为 `salt (16) || nonce (12) || ciphertext || tag (16)`，
/// 每次加密都使用新的随机盐和随机数，因此同一明文的两次加密结果不同。
#[derive(Clone, Default)]
pub struct AesGcmCipher {
    argon2: Argon2<'static>,
}

impl AesGcmCipher {
    pub fn new() -> Self {
        Self::default()
    }

    fn derive_key(&self, key: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, TransformError> {
        let mut key_bytes = Zeroizing::new([0u8; 32]);
        self.argon2
            .hash_password_into(key.as_bytes(), salt, &mut key_bytes[..])
            .map_err(|e| TransformError::KeyDerivation(e.to_string()))?;
        Ok(key_bytes)
    }
}

impl Cipher for AesGcmCipher {
    fn encrypt(&self, data: &[u8], key: &str) -> Result<Vec<u8>, TransformError> {
        let mut salt = [0u8; SALT_SIZE];
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        let mut rng = rand::rng();
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut nonce_bytes);

        let key_bytes = self.derive_key(key, &salt)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes[..]));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), data)
            .map_err(|_| TransformError::Cipher)?;

        let mut output = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + ciphertext.len());
        output.extend_from_slice(&salt);
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    fn decrypt(&self, data: &[u8], key: &str) -> Result<Vec<u8>, TransformError> {
        let min = SALT_SIZE + NONCE_SIZE + TAG_SIZE;
        if data.len() < min {
            return Err(TransformError::CiphertextTooShort {
                len: data.len(),
                min,
            });
        }

        let (salt, rest) = data.split_at(SALT_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let key_bytes = self.derive_key(key, salt)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes[..]));
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| TransformError::Cipher)
    }
}

/// 一次压缩的统计结果。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressionReport {
    pub original_size: usize,
    pub compressed_size: usize,
}

impl CompressionReport {
    /// 节省的空间百分比，`(原始 - 压缩后) / 原始 * 100`。数据膨胀时为负数。
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (self.original_size as f64 - self.compressed_size as f64) / self.original_size as f64
            * 100.0
    }
}
