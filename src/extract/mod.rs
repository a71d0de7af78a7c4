//! Extract Module
//!
//! 2つの抽出方式と、その共通インターフェース。

mod loader;
mod workbook;

pub use loader::LoaderExtractor;
pub use workbook::WorkbookExtractor;

use std::path::Path;

use crate::error::ExtractError;
use crate::loader::SpreadsheetLoader;

/// テキスト抽出器
///
/// ファイルパスを受け取り、前後の空白を除去したテキストを返します。
/// 失敗は最初に発生したエラーをそのまま返し、部分的な結果は返しません。
pub trait Extractor {
    /// ログやプロファイルレポートで使用する名前
    fn name(&self) -> &str;

    /// ファイルからテキストを抽出
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;

    /// 処理の区切りごとに`checkpoint`を呼びながら抽出
    ///
    /// プロファイラーが途中段階のメモリ使用量を記録するために使用します。
    /// デフォルトは区切りを報告せず`extract()`を呼びます。
    fn extract_staged(
        &self,
        path: &Path,
        _checkpoint: &mut dyn FnMut(&str),
    ) -> Result<String, ExtractError> {
        self.extract(path)
    }
}

impl<E: Extractor + ?Sized> Extractor for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        (**self).extract(path)
    }

    fn extract_staged(
        &self,
        path: &Path,
        checkpoint: &mut dyn FnMut(&str),
    ) -> Result<String, ExtractError> {
        (**self).extract_staged(path, checkpoint)
    }
}

/// ドキュメントローダー方式でテキストを抽出
///
/// デフォルトの`SpreadsheetLoader`（`LoaderMode::Single`）を使用します。
///
/// # 使用例
///
/// ```rust,no_run
/// # fn main() -> Result<(), xlsxtext::ExtractError> {
/// let text = xlsxtext::extract_with_loader("./data.xlsx")?;
/// println!("{}", text.chars().count());
/// # Ok(())
/// # }
/// ```
pub fn extract_with_loader<P: AsRef<Path>>(path: P) -> Result<String, ExtractError> {
    LoaderExtractor::new(SpreadsheetLoader::new()).extract(path.as_ref())
}

/// ワークブック走査方式でテキストを抽出
///
/// # 使用例
///
/// ```rust,no_run
/// # fn main() -> Result<(), xlsxtext::ExtractError> {
/// let text = xlsxtext::extract_from_workbook("./data.xlsx")?;
/// println!("{}", text.chars().count());
/// # Ok(())
/// # }
/// ```
pub fn extract_from_workbook<P: AsRef<Path>>(path: P) -> Result<String, ExtractError> {
    WorkbookExtractor::new().extract(path.as_ref())
}
