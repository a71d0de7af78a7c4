//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxtextクレート全体で使用するエラー型
///
/// どちらの抽出方式でも、読み込み・解析・走査中に最初に発生したエラーを
/// そのまま呼び出し元へ伝播します。リトライや部分結果の返却は行いません。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイルが存在しない、権限がないなど）
/// - `Parse`: ワークブックの解析中に発生したエラー（calamine由来）
/// - `Zip` / `Xml`: OOXMLパッケージの直接解析中に発生したエラー
/// - `Config`: ビルダー設定の検証に失敗したエラー
/// - `UnsupportedFormat`: 拡張子から読み込み方法を決定できないエラー
/// - `SecurityViolation`: アーカイブの安全制限に違反したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxtext::{extract_from_workbook, ExtractError};
///
/// fn run(path: &str) -> Result<usize, ExtractError> {
///     let text = extract_from_workbook(path)?;
///     Ok(text.chars().count())
/// }
/// ```
#[derive(Error, Debug)]
pub enum ExtractError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックの解析中に発生したエラー
    ///
    /// calamineがファイルを開く、またはシートを読み込む際に発生したエラーです。
    /// 存在しないファイル、破損したファイル、未対応の形式などが原因となります。
    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// 数値の解析エラー
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLの解析エラー
    #[error("XML parse error: {0}")]
    Xml(String),

    /// 設定の検証に失敗したエラー
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsxtext::{ExtractorBuilder, ExtractError};
    ///
    /// let result = ExtractorBuilder::new().with_max_input_size(0).build();
    ///
    /// match result {
    ///     Err(ExtractError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 読み込み方法を決定できない入力形式
    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormat(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、入力ファイルサイズ上限などの違反時に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<zip::result::ZipError> for ExtractError {
    fn from(err: zip::result::ZipError) -> Self {
        ExtractError::Zip(err.to_string())
    }
}

impl From<quick_xml::Error> for ExtractError {
    fn from(err: quick_xml::Error) -> Self {
        ExtractError::Xml(err.to_string())
    }
}
