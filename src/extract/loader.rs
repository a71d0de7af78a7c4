use std::path::Path;

use crate::error::ExtractError;
use crate::extract::Extractor;
use crate::loader::DocumentLoader;
use crate::normalize::finish_text;

/// ローダー方式の抽出器
///
/// ローダーが返した各ドキュメントの`page_content`に改行を付けて順に連結し、
/// 最後に前後の空白を除去します。ドキュメントが0件なら空文字列です。
#[derive(Debug, Clone)]
pub struct LoaderExtractor<L> {
    loader: L,
}

impl<L: DocumentLoader> LoaderExtractor<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }
}

impl<L: DocumentLoader> Extractor for LoaderExtractor<L> {
    fn name(&self) -> &str {
        "loader"
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        self.extract_staged(path, &mut |_: &str| {})
    }

    fn extract_staged(
        &self,
        path: &Path,
        checkpoint: &mut dyn FnMut(&str),
    ) -> Result<String, ExtractError> {
        log::info!("loader extraction: {}", path.display());
        let documents = self.loader.load(path)?;
        checkpoint("load documents");

        let mut content = String::new();
        for doc in &documents {
            content.push_str(&doc.page_content);
            content.push('\n');
        }

        Ok(finish_text(&content))
    }
}
