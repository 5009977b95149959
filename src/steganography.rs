//! # 通道嵌入与提取
//!
//! 按行优先顺序 (自上而下、自左向右) 遍历像素，只读写红色通道的最低有效位。
//! 绿色和蓝色通道以及红色的高 7 位保持不变。

use image::RgbImage;
use log::debug;

use crate::bits::{BitSequence, from_bits};
use crate::capacity::capacity_bits;
use crate::constants::{EXTRACT_RESERVE_BITS, TERMINATOR, TERMINATOR_BITS};
use crate::error::{Result, StegoError};
use crate::progress::Progress;

/// 将位序列写入载体，返回新的图像，输入载体不会被修改。
///
/// `bits` 应当已经包含终止符。
///
/// # Errors
///
/// 位序列长于载体像素数时返回 [`StegoError::InsufficientCapacity`]，此时不会写入任何像素。
pub fn embed(carrier: &RgbImage, bits: &BitSequence) -> Result<RgbImage> {
    embed_with_progress(carrier, bits, &Progress::new())
}

/// 与 [`embed`] 相同，但每扫描一行就更新 `progress`，并在行之间响应取消请求。
pub fn embed_with_progress(
    carrier: &RgbImage,
    bits: &BitSequence,
    progress: &Progress,
) -> Result<RgbImage> {
    let (width, height) = carrier.dimensions();
    let available = capacity_bits(width, height);
    let required = bits.len() as u64;
    if required > available {
        return Err(StegoError::InsufficientCapacity {
            required,
            available,
        });
    }

    progress.start(available);
    let mut output = carrier.clone();
    let mut source = bits.iter().peekable();

    for row in output.rows_mut() {
        if source.peek().is_none() {
            break;
        }
        progress.check_cancelled()?;

        for pixel in row {
            let Some(bit) = source.next() else {
                break;
            };
            pixel[0] = (pixel[0] & 0xFE) | u8::from(bit);
        }
        progress.advance(u64::from(width));
    }

    progress.finish();
    debug!("Embedded {required} bits into a {width}x{height} carrier");

    Ok(output)
}

/// 从载体中读取红色通道的最低有效位，直到遇到终止符，返回恢复的字节。
///
/// # Errors
///
/// * [`StegoError::NoTerminatorFound`] - 扫描完所有像素仍未找到终止符。
/// * [`StegoError::MalformedBitLength`] - 终止符之前的位数不是 8 的倍数。
pub fn extract(carrier: &RgbImage) -> Result<Vec<u8>> {
    extract_with_progress(carrier, &Progress::new())
}

/// 与 [`extract`] 相同，但会更新 `progress` 并响应取消请求。
pub fn extract_with_progress(carrier: &RgbImage, progress: &Progress) -> Result<Vec<u8>> {
    let (width, height) = carrier.dimensions();
    let capacity = capacity_bits(width, height);
    progress.start(capacity);

    let reserve = usize::try_from(capacity).map_or(EXTRACT_RESERVE_BITS, |bits| {
        bits.min(EXTRACT_RESERVE_BITS)
    });
    let mut bits = BitSequence::with_capacity(reserve);
    // 最近读取的 16 位
    let mut window: u16 = 0;

    for row in carrier.rows() {
        progress.check_cancelled()?;

        for pixel in row {
            let bit = pixel[0] & 1 == 1;
            bits.push(bit);
            window = (window << 1) | u16::from(bit);

            if bits.len() >= TERMINATOR_BITS && window == TERMINATOR {
                bits.truncate(bits.len() - TERMINATOR_BITS);
                progress.finish();
                debug!(
                    "Terminator found after {} bits in a {width}x{height} carrier",
                    bits.len() + TERMINATOR_BITS
                );
                return from_bits(&bits);
            }
        }
        progress.advance(u64::from(width));
    }

    Err(StegoError::NoTerminatorFound {
        bits_read: bits.len(),
    })
}
