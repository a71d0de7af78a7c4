//! Document Loader Module
//!
//! スプレッドシートをテキストチャンク（`Document`）の列に変換するローダー。
//! `DocumentLoader`トレイトを実装すれば、任意のローダーに差し替えられます。

mod spreadsheet;

pub use spreadsheet::SpreadsheetLoader;

use std::path::Path;

use crate::error::ExtractError;
use crate::types::Document;

/// ドキュメントローダー
///
/// ファイルを読み込み、0個以上のドキュメントを返します。
/// 返される順序と分割単位はローダーごとに定義されます。
///
/// # 使用例
///
/// ```rust
/// use std::path::Path;
/// use xlsxtext::{Document, DocumentLoader, ExtractError, LoaderExtractor, Extractor};
///
/// struct FixedLoader;
///
/// impl DocumentLoader for FixedLoader {
///     fn load(&self, _path: &Path) -> Result<Vec<Document>, ExtractError> {
///         Ok(vec![Document::new(" first "), Document::new("second\n")])
///     }
/// }
///
/// let extractor = LoaderExtractor::new(FixedLoader);
/// let text = extractor.extract(Path::new("ignored.xlsx")).unwrap();
/// assert_eq!(text, "first \nsecond");
/// ```
pub trait DocumentLoader {
    /// ファイルを読み込み、ドキュメントの列を返す
    fn load(&self, path: &Path) -> Result<Vec<Document>, ExtractError>;
}

impl<L: DocumentLoader + ?Sized> DocumentLoader for &L {
    fn load(&self, path: &Path) -> Result<Vec<Document>, ExtractError> {
        (**self).load(path)
    }
}

impl<L: DocumentLoader + ?Sized> DocumentLoader for Box<L> {
    fn load(&self, path: &Path) -> Result<Vec<Document>, ExtractError> {
        (**self).load(path)
    }
}
