//! Spreadsheet Loader
//!
//! xlsx / xlsmはOOXMLパッケージを直接解析し、それ以外の形式はcalamineで読み込む。
//! セルのテキストは空白を正規化せず、そのまま連結します。

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::api::LoaderMode;
use crate::error::ExtractError;
use crate::loader::DocumentLoader;
use crate::parser::{PackageRow, WorkbookReader, XlsxPackage};
use crate::security::SecurityConfig;
use crate::types::{CellValue, Document};

/// シート名とレンダリング済みテキスト
struct SheetText {
    name: String,
    /// ワークブック内の位置（1始まり）
    number: usize,
    text: String,
}

/// スプレッドシート用のデフォルトローダー
///
/// # チャンク分割
///
/// - `LoaderMode::Single`: ワークブック全体で1ドキュメント（シート間は`"\n\n"`）
/// - `LoaderMode::Elements`: 空でないシートごとに1ドキュメント
///
/// いずれのモードでも、内容のないシートはドキュメントを生成しません。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::path::Path;
/// use xlsxtext::{DocumentLoader, LoaderMode, SpreadsheetLoader};
///
/// # fn main() -> Result<(), xlsxtext::ExtractError> {
/// let loader = SpreadsheetLoader::new().with_mode(LoaderMode::Elements);
/// for doc in loader.load(Path::new("data.xlsx"))? {
///     println!("{}: {}", doc.metadata["page_name"], doc.page_content.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetLoader {
    mode: LoaderMode,
    security: SecurityConfig,
}

impl SpreadsheetLoader {
    /// デフォルト設定（`LoaderMode::Single`）のローダーを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// チャンク分割方式を指定
    pub fn with_mode(mut self, mode: LoaderMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    /// OOXMLパッケージから各シートのテキストを取得
    fn read_package(&self, path: &Path) -> Result<Vec<SheetText>, ExtractError> {
        let mut package = XlsxPackage::open(path, &self.security)?;
        let names: Vec<String> = package.sheets().iter().map(|s| s.name.clone()).collect();

        let mut sheets = Vec::with_capacity(names.len());
        for (index, name) in names.into_iter().enumerate() {
            let rows = package.read_sheet_rows(index)?;
            log::debug!("loader: sheet '{}' has {} rows", name, rows.len());
            sheets.push(SheetText {
                name,
                number: index + 1,
                text: render_package_rows(&rows),
            });
        }
        Ok(sheets)
    }

    /// calamineで各シートのテキストを取得（xls / xlsb / ods）
    fn read_workbook(&self, path: &Path) -> Result<Vec<SheetText>, ExtractError> {
        let mut reader = WorkbookReader::open(path)?;

        let mut sheets = Vec::new();
        for (index, name) in reader.sheet_names().into_iter().enumerate() {
            let sheet = reader.read_sheet(&name)?;
            let lines: Vec<String> = sheet
                .rows()
                .map(|row| {
                    row.iter()
                        .filter(|value| !value.is_absent())
                        .map(render_value)
                        .filter(|text| !text.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .filter(|line| !line.is_empty())
                .collect();
            sheets.push(SheetText {
                name: sheet.name,
                number: index + 1,
                text: lines.join("\n"),
            });
        }
        Ok(sheets)
    }

    fn into_documents(&self, path: &Path, sheets: Vec<SheetText>) -> Vec<Document> {
        let base = base_metadata(path);
        let sheets: Vec<SheetText> = sheets
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .collect();

        match self.mode {
            LoaderMode::Single => {
                if sheets.is_empty() {
                    return Vec::new();
                }
                let mut metadata = base;
                metadata.insert(
                    "page_names".to_string(),
                    Value::from(sheets.iter().map(|s| s.name.clone()).collect::<Vec<_>>()),
                );
                let content = sheets
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                vec![Document::new(content).with_metadata(metadata)]
            }
            LoaderMode::Elements => sheets
                .into_iter()
                .map(|s| {
                    let mut metadata = base.clone();
                    metadata.insert("page_name".to_string(), Value::from(s.name));
                    metadata.insert("page_number".to_string(), Value::from(s.number));
                    Document::new(s.text).with_metadata(metadata)
                })
                .collect(),
        }
    }
}

impl DocumentLoader for SpreadsheetLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>, ExtractError> {
        let extension = file_extension(path);
        let sheets = match extension.as_str() {
            "xlsx" | "xlsm" => self.read_package(path)?,
            "xls" | "xla" | "xlsb" | "ods" => self.read_workbook(path)?,
            other => {
                return Err(ExtractError::UnsupportedFormat(format!(
                    "'{}' (extension: '{}')",
                    path.display(),
                    other
                )))
            }
        };

        let documents = self.into_documents(path, sheets);
        log::debug!(
            "loader: {} documents from '{}'",
            documents.len(),
            path.display()
        );
        Ok(documents)
    }
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn base_metadata(path: &Path) -> HashMap<String, Value> {
    let mut metadata = HashMap::new();
    metadata.insert(
        "source".to_string(),
        Value::from(path.display().to_string()),
    );
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        metadata.insert("filename".to_string(), Value::from(name));
    }
    metadata.insert("file_type".to_string(), Value::from(file_extension(path)));
    metadata
}

/// パッケージから読んだ行をテキストに変換（行内はスペース、行間は改行）
fn render_package_rows(rows: &[PackageRow]) -> String {
    rows.iter()
        .map(|row| {
            row.cells
                .iter()
                .filter(|cell| !cell.text.is_empty())
                .map(|cell| cell.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// パッケージ経路と表記を揃える（論理値は`TRUE`/`FALSE`）
fn render_value(value: &CellValue) -> String {
    match value {
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        other => other.to_text(),
    }
}
