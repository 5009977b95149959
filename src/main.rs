use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use red_lsb::{
    cli::{Cli, Commands},
    handler::{handle_capacity, handle_checksum, handle_embed, handle_extract},
};

/// 程序的主入口点
///
/// 负责解析命令行参数、初始化日志，并根据指定的子命令
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    SimpleLogger::new().with_level(level).init()?;

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Embed(args) => handle_embed(args),
        Commands::Extract(args) => handle_extract(args),
        Commands::Capacity(args) => handle_capacity(args),
        Commands::Checksum(args) => handle_checksum(args),
    }
}
