//! Builder Module
//!
//! Fluent Builder APIを提供し、`TextExtractor`インスタンスを段階的に構築する。

use std::path::Path;

use crate::api::{ExtractionMethod, LoaderMode};
use crate::error::ExtractError;
use crate::extract::{Extractor, LoaderExtractor, WorkbookExtractor};
use crate::loader::SpreadsheetLoader;
use crate::profile::{ProfileReport, Profiled};
use crate::security::SecurityConfig;

/// 抽出処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractionConfig {
    /// 抽出方式
    pub method: ExtractionMethod,

    /// ローダー方式のチャンク分割
    pub loader_mode: LoaderMode,

    /// メモリプロファイルを出力するか
    pub profiling: bool,

    /// パッケージ読み込み時の安全制限
    pub security: SecurityConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            method: ExtractionMethod::Workbook,
            loader_mode: LoaderMode::Single,
            profiling: false,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxtext::{ExtractionMethod, ExtractorBuilder};
///
/// # fn main() -> Result<(), xlsxtext::ExtractError> {
/// let extractor = ExtractorBuilder::new()
///     .with_method(ExtractionMethod::Loader)
///     .with_profiling(true)
///     .build()?;
/// let text = extractor.extract("./data.xlsx")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ExtractorBuilder {
    config: ExtractionConfig,
}

impl ExtractorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 抽出方式: ワークブック走査
    /// - ローダーのチャンク分割: ワークブック全体で1ドキュメント
    /// - メモリプロファイル: 無効
    /// - 入力ファイルサイズ上限: 2GB
    pub fn new() -> Self {
        Self::default()
    }

    /// 抽出方式を指定する
    pub fn with_method(mut self, method: ExtractionMethod) -> Self {
        self.config.method = method;
        self
    }

    /// ローダー方式のチャンク分割を指定する
    ///
    /// ワークブック方式では使用されません。
    pub fn with_loader_mode(mut self, mode: LoaderMode) -> Self {
        self.config.loader_mode = mode;
        self
    }

    /// メモリプロファイルの出力を有効にするかを指定する
    ///
    /// 有効な場合、抽出のたびにレポートが標準エラーに出力されます。
    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.config.profiling = enabled;
        self
    }

    /// パッケージ読み込み時の入力ファイルサイズ上限（バイト）を指定する
    ///
    /// # 制約
    ///
    /// * 0は指定できない（`build()`時に`ExtractError::Config`を返す）
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`TextExtractor`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(TextExtractor)`: 設定が有効な場合
    /// * `Err(ExtractError::Config)`: 設定が無効な場合
    pub fn build(self) -> Result<TextExtractor, ExtractError> {
        if self.config.security.max_input_file_size == 0 {
            return Err(ExtractError::Config(
                "Invalid max input size: must be greater than 0".to_string(),
            ));
        }

        Ok(TextExtractor {
            config: self.config,
        })
    }
}

/// 抽出処理のファサード
///
/// `ExtractorBuilder`で構築された設定に従い、選択された方式で抽出します。
#[derive(Debug, Clone)]
pub struct TextExtractor {
    config: ExtractionConfig,
}

impl TextExtractor {
    /// 選択された方式の抽出器を生成
    fn inner(&self) -> Box<dyn Extractor> {
        match self.config.method {
            ExtractionMethod::Loader => Box::new(LoaderExtractor::new(
                SpreadsheetLoader::new()
                    .with_mode(self.config.loader_mode)
                    .with_security(self.config.security.clone()),
            )),
            ExtractionMethod::Workbook => Box::new(WorkbookExtractor::new()),
        }
    }

    /// 選択されている抽出方式
    pub fn method(&self) -> ExtractionMethod {
        self.config.method
    }

    /// ファイルからテキストを抽出
    ///
    /// プロファイルが有効な場合は、レポートを標準エラーに出力します。
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<String, ExtractError> {
        let inner = self.inner();
        if self.config.profiling {
            Profiled::new(inner).extract(path.as_ref())
        } else {
            inner.extract(path.as_ref())
        }
    }

    /// ファイルからテキストを抽出し、プロファイルが有効ならレポートも返す
    ///
    /// このメソッドはレポートを出力先に書き込みません。
    pub fn extract_with_report<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(String, Option<ProfileReport>), ExtractError> {
        let inner = self.inner();
        if self.config.profiling {
            let (text, report) = Profiled::new(inner).extract_with_report(path.as_ref())?;
            Ok((text, Some(report)))
        } else {
            Ok((inner.extract(path.as_ref())?, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ExtractorBuilder::new();
        assert_eq!(builder.config.method, ExtractionMethod::Workbook);
        assert_eq!(builder.config.loader_mode, LoaderMode::Single);
        assert!(!builder.config.profiling);
        assert_eq!(builder.config.security, SecurityConfig::default());
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = ExtractorBuilder::new()
            .with_method(ExtractionMethod::Loader)
            .with_loader_mode(LoaderMode::Elements)
            .with_profiling(true)
            .with_max_input_size(1024);

        assert_eq!(builder.config.method, ExtractionMethod::Loader);
        assert_eq!(builder.config.loader_mode, LoaderMode::Elements);
        assert!(builder.config.profiling);
        assert_eq!(builder.config.security.max_input_file_size, 1024);
    }

    #[test]
    fn test_build_rejects_zero_input_size() {
        match ExtractorBuilder::new().with_max_input_size(0).build() {
            Err(ExtractError::Config(msg)) => assert!(msg.contains("max input size")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_extract_nonexistent_file_fails_for_both_methods() {
        for method in [ExtractionMethod::Loader, ExtractionMethod::Workbook] {
            let extractor = ExtractorBuilder::new().with_method(method).build().unwrap();
            assert_eq!(extractor.method(), method);
            assert!(extractor.extract("no/such/file.xlsx").is_err());
        }
    }

    #[test]
    fn test_extract_with_report_without_profiling() {
        let extractor = ExtractorBuilder::new().build().unwrap();
        assert!(extractor.extract_with_report("no/such/file.xlsx").is_err());
    }
}
