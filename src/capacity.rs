//! # 容量模型
//!
//! 每个像素只使用红色通道的最低有效位，因此容量等于像素数。

use crate::constants::{BITS_PER_BYTE, TERMINATOR_BITS};
use crate::error::{Result, StegoError};

/// 载体可容纳的位数 (`width * height`)。
pub fn capacity_bits(width: u32, height: u32) -> u64 {
    u64::from(width) * u64::from(height)
}

/// 载荷加上终止符所需的位数。
pub fn required_bits(payload_len: usize) -> u64 {
    (payload_len as u64)
        .saturating_mul(BITS_PER_BYTE as u64)
        .saturating_add(TERMINATOR_BITS as u64)
}

/// 判断 `payload_len` 字节的载荷能否嵌入给定尺寸的载体。
pub fn can_embed(width: u32, height: u32, payload_len: usize) -> bool {
    capacity_bits(width, height) >= required_bits(payload_len)
}

/// 在触碰任何像素之前执行容量检查。
///
/// # Errors
///
/// 容量不足时返回 [`StegoError::InsufficientCapacity`]，附带所需与可用的位数。
pub fn ensure_capacity(width: u32, height: u32, payload_len: usize) -> Result<()> {
    let available = capacity_bits(width, height);
    let required = required_bits(payload_len);
    if available < required {
        return Err(StegoError::InsufficientCapacity {
            required,
            available,
        });
    }
    Ok(())
}

/// 载体最多能容纳的载荷字节数。
pub fn max_payload_bytes(width: u32, height: u32) -> u64 {
    capacity_bits(width, height).saturating_sub(TERMINATOR_BITS as u64) / BITS_PER_BYTE as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_pixel_count() {
        assert_eq!(capacity_bits(100, 100), 10_000);
        assert_eq!(capacity_bits(0, 500), 0);
        assert_eq!(capacity_bits(u32::MAX, 2), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn test_boundary() {
        // 8 x 4 = 32 像素: 2 字节 + 终止符恰好放得下
        assert!(can_embed(8, 4, 2));
        assert!(!can_embed(8, 4, 3));
        assert!(can_embed(4, 4, 0));
        assert!(!can_embed(3, 5, 0));
    }

    #[test]
    fn test_ensure_capacity_reports_counts() {
        match ensure_capacity(10, 10, 11) {
            Err(StegoError::InsufficientCapacity {
                required,
                available,
            }) => {
                assert_eq!(required, 104);
                assert_eq!(available, 100);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(ensure_capacity(10, 10, 10).is_ok());
    }

    #[test]
    fn test_max_payload_bytes() {
        assert_eq!(max_payload_bytes(100, 100), 1248);
        assert_eq!(max_payload_bytes(2, 2), 0);
        assert!(can_embed(100, 100, 1248));
        assert!(!can_embed(100, 100, 1249));
    }
}
