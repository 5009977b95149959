//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// 一款基于红色通道 LSB (最低有效位) 隐写术的命令行工具，可在无损格式图像中隐藏或恢复任意文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于红色通道 LSB (最低有效位) 隐写术的命令行工具，可在无损格式图像 (如 PNG, BMP) 中隐藏或恢复任意文件，并可选地进行 gzip 压缩和 AES-256-GCM 加密。"
)]
pub struct Cli {
    /// 输出调试日志。
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 将文件内容嵌入图像的红色通道。
    Embed(EmbedArgs),

    /// 从经过隐写的图像中提取隐藏的数据。
    Extract(ExtractArgs),

    /// 显示图像的隐写容量，或检查某个文件能否放入。
    Capacity(CapacityArgs),

    /// 计算或校验文件、文本的 CRC-32。
    Checksum(ChecksumArgs),
}

/// 'embed' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EmbedArgs {
    /// 用于隐写的载体图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的数据文件路径。
    #[arg(short = 'D', long)]
    pub data: PathBuf,

    /// 结果图像的输出路径，必须是无损格式。默认为载体旁的 `doctored_<名称>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 允许覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// 嵌入前先进行 gzip 压缩。
    #[arg(short, long)]
    pub compress: bool,

    /// 加密密钥；提供时使用 AES-256-GCM 加密。
    #[arg(short, long)]
    pub key: Option<String>,
}

/// 'extract' 命令所需的参数。
///
/// 压缩和密钥选项必须与嵌入时一致。
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 提取数据的输出路径。默认为载体旁的 `recovered_<名称>.bin`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 允许覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// 提取后进行 gzip 解压 (嵌入时使用了 `--compress`)。
    #[arg(short = 'x', long)]
    pub decompress: bool,

    /// 解密密钥 (嵌入时使用了 `--key`)。
    #[arg(short, long)]
    pub key: Option<String>,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 载体图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 可选：检查该文件经过变换后能否放入。
    #[arg(short = 'D', long)]
    pub data: Option<PathBuf>,

    /// 计算时先进行 gzip 压缩。
    #[arg(short, long)]
    pub compress: bool,

    /// 计算时使用该密钥加密。
    #[arg(short, long)]
    pub key: Option<String>,
}

/// 'checksum' 命令所需的参数。
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "text"])))]
pub struct ChecksumArgs {
    /// 要计算校验和的文件。
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// 要计算校验和的文本。
    #[arg(short, long)]
    pub text: Option<String>,

    /// 期望的十六进制校验和；不一致时返回错误。
    #[arg(short, long)]
    pub expect: Option<String>,
}
