//! # 图像读写
//!
//! 负责把图像文件解码为 8 位 RGB 载体，以及把结果原子地写回磁盘。
//! 输出格式必须是逐像素无损的，否则最低有效位会在重新量化时丢失。

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::{Result, StegoError};

/// 有损格式在重新编码时会改写像素值，隐藏的位无法保留。
pub fn is_lossy(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Jpeg | ImageFormat::Avif)
}

/// 读取并解码图像，转换为三通道载体。
///
/// 格式按文件内容识别。有损格式仍可作为载体读取，但会记录警告：
/// 源文件已经过压缩，若之后再以有损格式保存，隐藏的数据就会丢失。
pub fn load_carrier(path: &Path) -> Result<RgbImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    if let Some(format) = format.filter(|f| is_lossy(*f)) {
        warn!(
            "{} is a lossy {format:?} image; embedding works, but the result must be saved losslessly",
            path.display()
        );
    }

    let image = reader.decode()?;
    debug!(
        "Loaded {} ({}x{}, {:?}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color(),
        format
    );
    Ok(normalize(image))
}

/// 转换为 8 位 RGB，丢弃 alpha 等额外通道。
pub fn normalize(image: DynamicImage) -> RgbImage {
    image.into_rgb8()
}

/// 根据扩展名确定输出格式，只接受无损格式。
///
/// # Errors
///
/// * [`StegoError::LossyFormat`] - 扩展名对应 JPEG 等有损格式。
/// * [`StegoError::UnsupportedFormat`] - 无法识别扩展名。
pub fn output_format(path: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path).map_err(|_| StegoError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    if is_lossy(format) {
        return Err(StegoError::LossyFormat {
            format: format!("{format:?}").to_uppercase(),
        });
    }

    match format {
        ImageFormat::Png
        | ImageFormat::Bmp
        | ImageFormat::Tiff
        | ImageFormat::WebP
        | ImageFormat::Qoi => Ok(format),
        _ => Err(StegoError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// 目标文件已存在且没有 `force` 时拒绝继续。
pub fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        return Err(StegoError::OutputExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// 先写入同目录下的临时文件，再原子地替换目标，失败时不会留下半成品。
fn publish_with<F>(dest: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut std::fs::File>) -> Result<()>,
{
    let mut temp = NamedTempFile::new_in(parent_dir(dest))?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.persist(dest).map_err(|e| e.error)?;
    debug!("Published {}", dest.display());
    Ok(())
}

/// 以扩展名对应的无损格式保存载体。
pub fn publish_carrier(image: &RgbImage, dest: &Path) -> Result<()> {
    let format = output_format(dest)?;
    publish_with(dest, |writer| Ok(image.write_to(writer, format)?))
}

/// 保存提取出的载荷。
pub fn publish_bytes(data: &[u8], dest: &Path) -> Result<()> {
    publish_with(dest, |writer| Ok(writer.write_all(data)?))
}
