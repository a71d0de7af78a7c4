use std::path::Path;

use crate::error::ExtractError;
use crate::extract::Extractor;
use crate::normalize::{clean_cell_text, finish_text, join_row};
use crate::parser::WorkbookReader;
use crate::types::CellValue;

/// ワークブック方式の抽出器
///
/// シートはワークブックの定義順、行は上から下、セルは左から右に走査します。
///
/// 1. 値が存在しないセルはスキップ
/// 2. 値を文字列化し、前後の空白を除去して内部の連続空白を1つのスペースにまとめる
/// 3. 空でない値をスペースで結合して行テキストにする
/// 4. 行テキストが空でなければ改行を付けて追加（空の行は空行も出力しない）
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookExtractor;

impl WorkbookExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for WorkbookExtractor {
    fn name(&self) -> &str {
        "workbook"
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        self.extract_staged(path, &mut |_: &str| {})
    }

    fn extract_staged(
        &self,
        path: &Path,
        checkpoint: &mut dyn FnMut(&str),
    ) -> Result<String, ExtractError> {
        log::info!("workbook extraction: {}", path.display());
        let mut workbook = WorkbookReader::open(path)?;
        checkpoint("open workbook");

        let mut content = String::new();
        for sheet_name in workbook.sheet_names() {
            let sheet = workbook.read_sheet(&sheet_name)?;
            checkpoint(&format!("read '{}'", sheet_name));
            for row in sheet.rows() {
                let row_text = row_to_text(&row);
                if !row_text.is_empty() {
                    content.push_str(&row_text);
                    content.push('\n');
                }
            }
        }

        Ok(finish_text(&content))
    }
}

/// 1行分のセル値を正規化済みの行テキストに変換
pub(crate) fn row_to_text(row: &[CellValue]) -> String {
    join_row(
        row.iter()
            .filter(|value| !value.is_absent())
            .map(|value| clean_cell_text(&value.to_text())),
    )
}
