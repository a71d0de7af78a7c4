//! CLI Module
//!
//! 抽出方式ごとのバイナリが共有するコマンドライン処理。
//! 標準出力には抽出テキストの文字数だけを1行で出力します。

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::api::ExtractionMethod;
use crate::builder::ExtractorBuilder;
use crate::error::ExtractError;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(version, about = "Extract plain text from a spreadsheet and print its length")]
pub struct Args {
    /// Path to the spreadsheet file
    #[arg(default_value = "./data.xlsx")]
    pub path: PathBuf,

    /// Do not print the memory profile report to stderr
    #[arg(long)]
    pub no_profile: bool,
}

/// 引数を解析して抽出を実行し、終了コードを返す
pub fn run(method: ExtractionMethod) -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match execute(method, &args) {
        Ok(length) => {
            println!("{}", length);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// 抽出を実行し、テキストの文字数（Unicodeスカラー値の数）を返す
pub fn execute(method: ExtractionMethod, args: &Args) -> Result<usize, ExtractError> {
    let extractor = ExtractorBuilder::new()
        .with_method(method)
        .with_profiling(!args.no_profile)
        .build()?;

    let text = extractor.extract(&args.path)?;
    log::info!("{} extraction finished: {}", method.as_str(), args.path.display());
    Ok(text.chars().count())
}
