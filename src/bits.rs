//! # 位序列编解码模块
//!
//! 在字节载荷与按 MSB 优先排列的位序列之间相互转换，并负责追加和查找 16 位终止符。

use crate::constants::{BITS_PER_BYTE, TERMINATOR, TERMINATOR_BITS};
use crate::error::{Result, StegoError};

/// 有序的单个位序列，每个元素是 0 或 1。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BitSequence {
    bits: Vec<bool>,
}

impl BitSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }
}

impl FromIterator<bool> for BitSequence {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

/// 以 MSB 优先的顺序展开终止符。
fn terminator_bits() -> [bool; TERMINATOR_BITS] {
    std::array::from_fn(|i| (TERMINATOR >> (TERMINATOR_BITS - 1 - i)) & 1 == 1)
}

/// 将字节载荷展开为位序列 (每字节 8 位，MSB 优先)，不附带终止符。
pub fn to_bits(payload: &[u8]) -> BitSequence {
    payload
        .iter()
        .flat_map(|&byte| (0..BITS_PER_BYTE).rev().map(move |shift| (byte >> shift) & 1 == 1))
        .collect()
}

/// 在位序列末尾追加终止符 `1111111111111110`。
pub fn append_terminator(mut bits: BitSequence) -> BitSequence {
    bits.bits.extend_from_slice(&terminator_bits());
    bits
}

/// 将位序列按 MSB 优先重新组装为字节。
///
/// # Errors
///
/// 如果位数不是 8 的倍数，返回 [`StegoError::MalformedBitLength`]。
pub fn from_bits(bits: &BitSequence) -> Result<Vec<u8>> {
    if bits.len() % BITS_PER_BYTE != 0 {
        return Err(StegoError::MalformedBitLength { len: bits.len() });
    }

    Ok(bits
        .bits
        .chunks_exact(BITS_PER_BYTE)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect())
}

/// 查找终止符第一次出现的起始位置。
///
/// 匹配不要求字节对齐。载荷自身的位模式如果包含终止符，返回的是这个更早的位置。
pub fn find_terminator(bits: &BitSequence) -> Option<usize> {
    let pattern = terminator_bits();
    bits.bits
        .windows(TERMINATOR_BITS)
        .position(|window| window == pattern)
}
