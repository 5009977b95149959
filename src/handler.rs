//! # 命令处理逻辑模块
//!
//! 包含处理各个子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用隐写流水线以及向用户报告结果。

use crate::capacity::{capacity_bits, max_payload_bytes, required_bits};
use crate::checksum::{
    Verification, crc32_bytes, crc32_file, crc32_text, format_crc, parse_crc, verify_bytes, verify_file,
};
use crate::cli::{CapacityArgs, ChecksumArgs, EmbedArgs, ExtractArgs};
use crate::constants::{
    DEFAULT_IMAGE_EXTENSION, DEFAULT_PAYLOAD_EXTENSION, DOCTORED_PREFIX, RECOVERED_PREFIX,
};
use crate::image_io::{ensure_writable, load_carrier, output_format, publish_bytes, publish_carrier};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::progress::Progress;
use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// 后台任务运行时轮询进度的间隔。
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 在 `image` 旁边生成 `<prefix><文件名主干>.<extension>` 形式的路径。
fn sibling_path(image: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| "image".into());
    image.with_file_name(format!("{prefix}{stem}.{extension}"))
}

/// 在工作线程中执行 `task`，当前线程轮询进度并记录里程碑。
fn run_with_progress<T, F>(label: &str, task: F) -> crate::error::Result<T>
where
    T: Send,
    F: FnOnce(&Progress) -> crate::error::Result<T> + Send,
{
    let progress = Progress::new();
    thread::scope(|scope| {
        let worker = scope.spawn(|| task(&progress));
        let mut reported = 0;
        while !worker.is_finished() {
            thread::sleep(POLL_INTERVAL);
            let percent = progress.percent();
            if percent >= reported + 25 {
                debug!("{label}: {percent}%");
                reported = percent;
            }
        }
        worker
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    })
}

/// 处理 'Embed' 命令的执行逻辑。
///
/// 负责读取图像和数据文件、按选项压缩和加密、检查容量、嵌入数据，
/// 最后将结果原子地写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径和变换选项的 `EmbedArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`，或目标格式是有损格式。
/// * 无法读取输入的图像或数据文件。
/// * 图像没有足够的空间来隐藏变换后的数据。
/// * 压缩或加密失败。
/// * 无法写入到目标图像文件。
pub fn handle_embed(args: EmbedArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| sibling_path(&args.image, DOCTORED_PREFIX, DEFAULT_IMAGE_EXTENSION));
    ensure_writable(&dest, args.force)?;
    output_format(&dest)?;

    let carrier = load_carrier(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let payload = fs::read(&args.data).with_context(|| {
        format!(
            "Unable to read data file: {}",
            args.data.to_string_lossy().red().bold()
        )
    })?;

    let options = PipelineOptions {
        compress: args.compress,
        key: args.key,
    };
    let pipeline = Pipeline::default();
    let (output, report) = run_with_progress("Embedding", |progress| {
        pipeline.encode(&carrier, &payload, &options, progress)
    })?;

    publish_carrier(&output, &dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    if let Some(compression) = report.compression {
        println!(
            "Compressed {} bytes to {} bytes ({}% saved)",
            compression.original_size.to_string().green(),
            compression.compressed_size.to_string().green(),
            format!("{:.2}", compression.ratio()).green().bold()
        );
    }

    if let Some(index) = report.terminator_collision {
        println!(
            "{} the embedded data contains the end marker at bit {}; extraction will stop early.",
            "Warning:".yellow().bold(),
            index.to_string().yellow()
        );
    }

    println!(
        "Used {} of {} bits.",
        report.used_bits.to_string().green(),
        report.capacity_bits.to_string().green()
    );
    println!(
        "The data has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Extract' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、提取数据、按选项解密和解压，
/// 最后将恢复的数据写入目标文件并显示其 CRC-32。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径和变换选项的 `ExtractArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件。
/// * 图像中没有终止符，或数据长度不是整字节。
/// * 解密或解压失败 (通常是选项或密钥与嵌入时不一致)。
/// * 无法写入到目标文件。
pub fn handle_extract(args: ExtractArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| sibling_path(&args.image, RECOVERED_PREFIX, DEFAULT_PAYLOAD_EXTENSION));
    ensure_writable(&dest, args.force)?;

    let carrier = load_carrier(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let options = PipelineOptions {
        compress: args.decompress,
        key: args.key,
    };
    let pipeline = Pipeline::default();
    let data = run_with_progress("Extracting", |progress| {
        pipeline.decode(&carrier, &options, progress)
    })?;

    publish_bytes(&data, &dest).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "Recovered {} bytes (CRC-32 {}).",
        data.len().to_string().green(),
        format_crc(crc32_bytes(&data)).green()
    );
    println!(
        "The data has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
///
/// 显示载体的容量；如果给出了数据文件，还会按选项变换后检查能否放入。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let carrier = load_carrier(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let (width, height) = carrier.dimensions();
    let available = capacity_bits(width, height);

    println!(
        "{}x{} pixels: {} bits, up to {} bytes of data.",
        width,
        height,
        available.to_string().green().bold(),
        max_payload_bytes(width, height).to_string().green().bold()
    );

    let Some(data_path) = args.data else {
        return Ok(());
    };

    let payload = fs::read(&data_path).with_context(|| {
        format!(
            "Unable to read data file: {}",
            data_path.to_string_lossy().red().bold()
        )
    })?;
    let options = PipelineOptions {
        compress: args.compress,
        key: args.key,
    };
    let prepared = Pipeline::default().prepare(&payload, &options)?;
    let required = required_bits(prepared.len);

    if required <= available {
        println!(
            "{} fits: Required: {} bits, Available: {} bits",
            data_path.to_string_lossy().green().bold(),
            required.to_string().green(),
            available.to_string().green()
        );
    } else {
        println!(
            "{} does not fit: Required: {} bits, Available: {} bits",
            data_path.to_string_lossy().red().bold(),
            required.to_string().red().bold(),
            available.to_string().green()
        );
    }
    Ok(())
}

/// 处理 'Checksum' 命令的执行逻辑。
///
/// # Errors
///
/// 无法读取文件、期望值不是合法的十六进制数，或校验和不一致时返回错误。
pub fn handle_checksum(args: ChecksumArgs) -> Result<()> {
    let expected = args
        .expect
        .as_deref()
        .map(|text| {
            parse_crc(text).with_context(|| format!("Invalid checksum: {}", text.red().bold()))
        })
        .transpose()?;

    let (verification, subject) = match (&args.file, &args.text) {
        (Some(path), _) => {
            let verification = match expected {
                Some(expected) => verify_file(path, expected),
                None => crc32_file(path).map(|actual| Verification {
                    expected: actual,
                    actual,
                }),
            }
            .with_context(|| {
                format!(
                    "Unable to read file: {}",
                    path.to_string_lossy().red().bold()
                )
            })?;
            (verification, path.to_string_lossy().into_owned())
        }
        (None, Some(text)) => {
            let verification = match expected {
                Some(expected) => verify_bytes(text.as_bytes(), expected),
                None => {
                    let actual = crc32_text(text);
                    Verification {
                        expected: actual,
                        actual,
                    }
                }
            };
            (verification, "text".to_string())
        }
        (None, None) => anyhow::bail!("Either a file or a text must be given."),
    };

    println!(
        "CRC-32 of {}: {}",
        subject,
        format_crc(verification.actual).green().bold()
    );

    if expected.is_some() {
        anyhow::ensure!(
            verification.is_match(),
            "Checksum mismatch. \nExpected: {}, Actual: {}",
            format_crc(verification.expected).green().bold(),
            format_crc(verification.actual).red().bold()
        );
        println!("{}", "Checksum verified.".green().bold());
    }

    Ok(())
}
