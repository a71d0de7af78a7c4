//! ドキュメントローダー方式でテキストを抽出し、文字数を出力する。

use std::process::ExitCode;
use xlsxtext::ExtractionMethod;

fn main() -> ExitCode {
    xlsxtext::cli::run(ExtractionMethod::Loader)
}
