//! Workbook Reader Module
//!
//! calamineを使用した読み取り専用・値のみモードのワークブックリーダー。
//! 数式セルは再計算せず、ファイルに保存されたキャッシュ値を返します。

use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::ExtractError;
use crate::types::CellValue;

/// ワークブックリーダー
///
/// calamineのラッパーとして、シート単位の読み込みを提供します。
/// 形式（xlsx / xlsm / xlsb / xls / ods）はcalamineが自動判定します。
/// ファイルハンドルはこの構造体の破棄と同時に解放されます。
pub(crate) struct WorkbookReader {
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookReader {
    /// ワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookReader)` - 読み込みに成功した場合
    /// * `Err(ExtractError::Parse)` - ファイルが存在しない、または解析できない場合
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let workbook = open_workbook_auto(path.as_ref())?;
        Ok(Self { workbook })
    }

    /// ワークブックに定義された順序でシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シートを読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok(Sheet)` - シートのセル範囲
    /// * `Err(ExtractError::Parse)` - シートの解析に失敗した場合
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, ExtractError> {
        let range = self.workbook.worksheet_range(sheet_name)?;
        log::debug!(
            "read sheet '{}' ({} x {})",
            sheet_name,
            range.height(),
            range.width()
        );
        Ok(Sheet {
            name: sheet_name.to_string(),
            range,
        })
    }
}

/// 読み込み済みのシート
pub(crate) struct Sheet {
    pub name: String,
    range: Range<Data>,
}

impl Sheet {
    /// 上から順に行を返す（各行は左から右へのセル値）
    pub fn rows(&self) -> impl Iterator<Item = Vec<CellValue>> + '_ {
        self.range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
    }
}

/// calamineのセルデータを`CellValue`に変換
pub(crate) fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::DateTime(dt) => convert_excel_datetime(dt),
        Data::DateTimeIso(s) => parse_iso_datetime(s),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Excelの日付シリアル値を変換
///
/// 経過時間書式は`Duration`、1未満のシリアル値は`Time`、それ以外は`DateTime`。
/// chronoで表現できない値は数値のまま返します。
fn convert_excel_datetime(dt: &ExcelDateTime) -> CellValue {
    if dt.is_duration() {
        return dt
            .as_duration()
            .map(CellValue::Duration)
            .unwrap_or_else(|| CellValue::Float(dt.as_f64()));
    }

    let serial = dt.as_f64();
    match dt.as_datetime() {
        Some(value) if (0.0..1.0).contains(&serial) => CellValue::Time(value.time()),
        Some(value) => CellValue::DateTime(value),
        None => CellValue::Float(serial),
    }
}

/// ISO 8601形式の日時文字列（ODS）を変換
///
/// 解析できない場合は文字列のまま返します。
fn parse_iso_datetime(s: &str) -> CellValue {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return CellValue::DateTime(dt);
    }
    if let Some(dt) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return CellValue::DateTime(dt);
    }
    if let Ok(time) = NaiveTime::parse_from_str(s, "%H:%M:%S%.f") {
        return CellValue::Time(time);
    }
    CellValue::Text(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_convert_scalar_cells() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            convert_cell(&Data::String("x".to_string())),
            CellValue::Text("x".to_string())
        );
        assert_eq!(convert_cell(&Data::Float(1.5)), CellValue::Float(1.5));
        assert_eq!(convert_cell(&Data::Int(3)), CellValue::Int(3));
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_convert_error_cell() {
        let value = convert_cell(&Data::Error(CellErrorType::Div0));
        assert_eq!(value, CellValue::Error("#DIV/0!".to_string()));
    }

    #[test]
    fn test_parse_iso_datetime() {
        assert_eq!(
            parse_iso_datetime("2024-01-15T08:30:00").to_text(),
            "2024-01-15 08:30:00"
        );
        assert_eq!(
            parse_iso_datetime("2024-01-15").to_text(),
            "2024-01-15 00:00:00"
        );
        assert_eq!(parse_iso_datetime("12:30:00").to_text(), "12:30:00");
        assert_eq!(
            parse_iso_datetime("not a date"),
            CellValue::Text("not a date".to_string())
        );
    }

    #[test]
    fn test_open_nonexistent_file() {
        let result = WorkbookReader::open("definitely/not/here.xlsx");
        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }
}
