//! OOXML Package Reader Module
//!
//! XLSXファイル（ZIPアーカイブ）内のXMLを直接解析し、シートごとのセルテキストを取り出す。
//! ドキュメントローダーが使用する読み込み経路で、calamineを経由しません。

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use crate::error::ExtractError;
use crate::security::{validate_zip_path, SecurityConfig};

/// ワークブック内のシート定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetEntry {
    /// シート名（workbook.xmlの`name`属性）
    pub name: String,
    /// シートXMLのパッケージ内パス（例: `xl/worksheets/sheet1.xml`）
    pub part: String,
}

/// 値を持つセル
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PackageCell {
    /// 列インデックス（0始まり）
    pub col: u32,
    /// 表示用テキスト
    pub text: String,
}

/// 値を持つセルを1つ以上含む行
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PackageRow {
    /// 行インデックス（0始まり）
    pub row: u32,
    pub cells: Vec<PackageCell>,
}

/// XLSXパッケージリーダー
///
/// `new()`の時点でworkbook.xml、リレーションシップ、共有文字列、スタイルを解析し、
/// シートXMLは`read_sheet_rows()`の呼び出しごとに解析します。
pub(crate) struct XlsxPackage<R: Read + Seek> {
    archive: ZipArchive<R>,
    sheets: Vec<SheetEntry>,
    shared_strings: Vec<String>,
    /// cellXfsのインデックス -> numFmtId
    cell_xfs: Vec<u32>,
    /// numFmtId -> formatCode（カスタム書式のみ）
    num_formats: HashMap<u32, String>,
    is_1904: bool,
}

impl XlsxPackage<BufReader<File>> {
    /// ファイルパスからパッケージを開く
    pub fn open<P: AsRef<Path>>(path: P, security: &SecurityConfig) -> Result<Self, ExtractError> {
        let file = File::open(path.as_ref())?;
        security.check_input_size(file.metadata()?.len())?;
        Self::new(BufReader::new(file), security)
    }
}

impl<R: Read + Seek> XlsxPackage<R> {
    /// パッケージを解析
    ///
    /// # 戻り値
    ///
    /// * `Ok(XlsxPackage)` - 解析に成功した場合
    /// * `Err(ExtractError::SecurityViolation)` - アーカイブが安全制限に違反した場合
    /// * `Err(ExtractError::Zip | Xml)` - アーカイブまたはXMLが不正な場合
    pub fn new(reader: R, security: &SecurityConfig) -> Result<Self, ExtractError> {
        let mut archive = ZipArchive::new(reader)?;
        check_archive(&mut archive, security)?;

        let (mut sheets, is_1904) = parse_workbook(&mut archive)?;
        let relationships = parse_workbook_relationships(&mut archive)?;
        resolve_sheet_parts(&mut sheets, &relationships);

        let shared_strings = parse_shared_strings(&mut archive)?;
        let (cell_xfs, num_formats) = parse_styles(&mut archive)?;

        log::debug!(
            "package: {} sheets, {} shared strings, {} cell styles",
            sheets.len(),
            shared_strings.len(),
            cell_xfs.len()
        );

        Ok(Self {
            archive,
            sheets,
            shared_strings,
            cell_xfs,
            num_formats,
            is_1904,
        })
    }

    /// ワークブックに定義された順序でシートを取得
    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// シートXMLを解析し、値を持つ行を上から順に返す
    pub fn read_sheet_rows(&mut self, index: usize) -> Result<Vec<PackageRow>, ExtractError> {
        let part = match self.sheets.get(index) {
            Some(sheet) => sheet.part.clone(),
            None => {
                return Err(ExtractError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    self.sheets.len()
                )))
            }
        };

        let xml = read_part(&mut self.archive, &part)?
            .ok_or_else(|| ExtractError::Zip(format!("Missing worksheet part: {}", part)))?;
        let mut rows = self.parse_sheet_xml(&xml)?;

        // 出現順ではなく位置順（上から下、左から右）に揃える
        rows.sort_by_key(|row| row.row);
        for row in &mut rows {
            row.cells.sort_by_key(|cell| cell.col);
        }
        Ok(rows)
    }

    fn parse_sheet_xml(&self, xml: &[u8]) -> Result<Vec<PackageRow>, ExtractError> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();

        let mut rows = Vec::new();
        let mut current_row: Option<PackageRow> = None;
        let mut next_row = 0u32;
        let mut next_col = 0u32;

        let mut cell: Option<RawCell> = None;
        let mut in_value = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"row" => {
                        let row = row_index(&e)?.unwrap_or(next_row);
                        next_row = row + 1;
                        next_col = 0;
                        current_row = Some(PackageRow {
                            row,
                            cells: Vec::new(),
                        });
                    }
                    b"c" => {
                        let raw = RawCell::from_start(&e, next_col)?;
                        next_col = raw.col + 1;
                        cell = Some(raw);
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"rPh" => in_phonetic = true,
                    b"t" if cell.is_some() && !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Event::Empty(e) => {
                    // 値を持たないセル（書式のみ）は列位置だけ進める
                    if e.local_name().as_ref() == b"c" {
                        next_col = RawCell::from_start(&e, next_col)?.col + 1;
                    }
                }
                Event::Text(e) => {
                    if let Some(raw) = cell.as_mut() {
                        if in_value || in_inline_text {
                            let text = e.unescape()?;
                            raw.push_text(&text, in_inline_text);
                        }
                    }
                }
                Event::CData(e) => {
                    if let Some(raw) = cell.as_mut() {
                        if in_value || in_inline_text {
                            let bytes = e.into_inner();
                            raw.push_text(std::str::from_utf8(&bytes)?, in_inline_text);
                        }
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"v" => in_value = false,
                    b"t" => in_inline_text = false,
                    b"rPh" => in_phonetic = false,
                    b"c" => {
                        if let Some(raw) = cell.take() {
                            if let Some(text) = self.resolve_cell_text(&raw) {
                                if let Some(row) = current_row.as_mut() {
                                    row.cells.push(PackageCell { col: raw.col, text });
                                }
                            }
                        }
                    }
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            if !row.cells.is_empty() {
                                rows.push(row);
                            }
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rows)
    }

    /// セルの型属性に従って表示テキストを決定
    fn resolve_cell_text(&self, raw: &RawCell) -> Option<String> {
        match raw.cell_type.as_deref() {
            Some("s") => {
                let index: usize = raw.value.as_deref()?.trim().parse().ok()?;
                self.shared_strings.get(index).cloned()
            }
            Some("inlineStr") => raw.inline.clone(),
            Some("b") => match raw.value.as_deref()?.trim() {
                "1" | "true" => Some("TRUE".to_string()),
                _ => Some("FALSE".to_string()),
            },
            Some("str") | Some("e") | Some("d") => raw.value.clone(),
            _ => {
                let value = raw.value.clone()?;
                if self.is_date_style(raw.style) {
                    if let Some(dt) = value
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .and_then(|serial| serial_to_datetime(serial, self.is_1904))
                    {
                        return Some(dt.format("%Y-%m-%d %H:%M:%S").to_string());
                    }
                }
                Some(value)
            }
        }
    }

    /// スタイルIDの書式が日付・時刻書式かを判定
    fn is_date_style(&self, style: Option<usize>) -> bool {
        let Some(num_fmt_id) = style.and_then(|s| self.cell_xfs.get(s)).copied() else {
            return false;
        };
        let code = if num_fmt_id < 164 {
            builtin_format(num_fmt_id)
        } else {
            self.num_formats.get(&num_fmt_id).map(|s| s.as_str())
        };
        code.map(is_date_format_code).unwrap_or(false)
    }
}

/// 解析中のセル（`<c>`要素）
#[derive(Debug, Default)]
struct RawCell {
    col: u32,
    cell_type: Option<String>,
    style: Option<usize>,
    value: Option<String>,
    inline: Option<String>,
}

impl RawCell {
    fn from_start(e: &BytesStart<'_>, default_col: u32) -> Result<Self, ExtractError> {
        let mut cell = RawCell {
            col: default_col,
            ..RawCell::default()
        };
        for attr in e.attributes() {
            let attr = attr.map_err(|e| ExtractError::Xml(format!("attribute error: {}", e)))?;
            match attr.key.local_name().as_ref() {
                b"r" => {
                    if let Some((_, col)) = parse_cell_ref(&attr_value(&attr)?) {
                        cell.col = col;
                    }
                }
                b"t" => cell.cell_type = Some(attr_value(&attr)?),
                b"s" => cell.style = Some(attr_value(&attr)?.parse()?),
                _ => {}
            }
        }
        Ok(cell)
    }

    fn push_text(&mut self, text: &str, inline: bool) {
        let target = if inline {
            &mut self.inline
        } else {
            &mut self.value
        };
        target.get_or_insert_with(String::new).push_str(text);
    }
}

fn attr_value(attr: &Attribute<'_>) -> Result<String, ExtractError> {
    let raw = std::str::from_utf8(&attr.value)?;
    let value = quick_xml::escape::unescape(raw).map_err(quick_xml::Error::from)?;
    Ok(value.into_owned())
}

fn row_index(e: &BytesStart<'_>) -> Result<Option<u32>, ExtractError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ExtractError::Xml(format!("attribute error: {}", e)))?;
        if attr.key.local_name().as_ref() == b"r" {
            // Excelの行番号は1始まりなので、0始まりに変換
            let r: u32 = attr_value(&attr)?.parse()?;
            return Ok(Some(r.saturating_sub(1)));
        }
    }
    Ok(None)
}

/// アーカイブ全体の安全制限を検査
fn check_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    security: &SecurityConfig,
) -> Result<(), ExtractError> {
    if archive.len() > security.max_file_count {
        return Err(ExtractError::SecurityViolation(format!(
            "ZIP archive contains too many files: {} (max: {})",
            archive.len(),
            security.max_file_count
        )));
    }

    let mut total_decompressed_size = 0u64;
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;

        let file_name = file.name();
        validate_zip_path(file_name)
            .map_err(|e| ExtractError::SecurityViolation(format!("Invalid ZIP path: {}", e)))?;

        let file_size = file.size();
        if file_size > security.max_file_size {
            return Err(ExtractError::SecurityViolation(format!(
                "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                file_name, file_size, security.max_file_size
            )));
        }

        total_decompressed_size = total_decompressed_size
            .checked_add(file_size)
            .ok_or_else(|| {
                ExtractError::SecurityViolation(
                    "Total decompressed size calculation overflow".to_string(),
                )
            })?;

        if total_decompressed_size > security.max_decompressed_size {
            return Err(ExtractError::SecurityViolation(format!(
                "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                total_decompressed_size, security.max_decompressed_size
            )));
        }
    }

    Ok(())
}

/// パッケージ内のファイルを読み込む（存在しない場合は`None`）
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, ExtractError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(Some(content))
}

/// xl/workbook.xml の解析
///
/// `<sheet name="..." r:id="..."/>`の並び順と`<workbookPr date1904="1"/>`を取得します。
/// シートのパスはこの時点ではリレーションシップIDのまま保持します。
fn parse_workbook<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<(Vec<SheetEntry>, bool), ExtractError> {
    let xml = read_part(archive, "xl/workbook.xml")?
        .ok_or_else(|| ExtractError::Zip("Missing xl/workbook.xml".to_string()))?;

    let mut reader = Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    let mut is_1904 = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sheet" => {
                    let mut name = None;
                    let mut rel_id = String::new();
                    for attr in e.attributes() {
                        let attr = attr
                            .map_err(|e| ExtractError::Xml(format!("attribute error: {}", e)))?;
                        match attr.key.as_ref() {
                            b"name" => name = Some(attr_value(&attr)?),
                            b"r:id" => rel_id = attr_value(&attr)?,
                            _ => {}
                        }
                    }
                    if let Some(name) = name {
                        sheets.push(SheetEntry {
                            name,
                            part: rel_id,
                        });
                    }
                }
                b"workbookPr" => {
                    for attr in e.attributes() {
                        let attr = attr
                            .map_err(|e| ExtractError::Xml(format!("attribute error: {}", e)))?;
                        if attr.key.as_ref() == b"date1904" {
                            let value = attr_value(&attr)?;
                            is_1904 = value == "1" || value == "true";
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, is_1904))
}

/// xl/_rels/workbook.xml.rels の解析（Id -> Target）
fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<HashMap<String, String>, ExtractError> {
    let mut relationships = HashMap::new();
    let Some(xml) = read_part(archive, "xl/_rels/workbook.xml.rels")? else {
        return Ok(relationships);
    };

    let mut reader = Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = None;
                    let mut target = None;
                    for attr in e.attributes() {
                        let attr = attr
                            .map_err(|e| ExtractError::Xml(format!("attribute error: {}", e)))?;
                        match attr.key.as_ref() {
                            b"Id" => id = Some(attr_value(&attr)?),
                            b"Target" => target = Some(attr_value(&attr)?),
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target)) = (id, target) {
                        relationships.insert(id, target);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// リレーションシップIDをパッケージ内パスに置き換える
///
/// リレーションシップが見つからない場合は`xl/worksheets/sheet{n}.xml`と推測します。
fn resolve_sheet_parts(sheets: &mut [SheetEntry], relationships: &HashMap<String, String>) {
    for (position, sheet) in sheets.iter_mut().enumerate() {
        sheet.part = match relationships.get(&sheet.part) {
            Some(target) => match target.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None => format!("xl/{}", target),
            },
            None => format!("xl/worksheets/sheet{}.xml", position + 1),
        };
    }
}

/// xl/sharedStrings.xml の解析
///
/// `<si>`ごとに1要素。リッチテキストの`<r>`は連結し、ふりがな（`<rPh>`）は除外します。
fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<String>, ExtractError> {
    let mut shared_strings = Vec::new();
    let Some(xml) = read_part(archive, "xl/sharedStrings.xml")? else {
        return Ok(shared_strings);
    };

    let mut reader = Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => in_phonetic = true,
                b"t" if current.is_some() && !in_phonetic => in_t = true,
                _ => {}
            },
            Event::Empty(e) => {
                // <si/> は空文字列として数える
                if e.local_name().as_ref() == b"si" {
                    shared_strings.push(String::new());
                }
            }
            Event::Text(e) => {
                if in_t {
                    if let Some(s) = current.as_mut() {
                        s.push_str(&e.unescape()?);
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                b"si" => {
                    if let Some(s) = current.take() {
                        shared_strings.push(s);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(shared_strings)
}

/// xl/styles.xml の解析
///
/// `<cellXfs>`内の`<xf numFmtId>`と、`<numFmts>`内のカスタム書式（ID >= 164）を取得します。
fn parse_styles<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<(Vec<u32>, HashMap<u32, String>), ExtractError> {
    let mut cell_xfs = Vec::new();
    let mut num_formats = HashMap::new();
    let Some(xml) = read_part(archive, "xl/styles.xml")? else {
        return Ok((cell_xfs, num_formats));
    };

    let mut reader = Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    let mut num_fmt_id = 0u32;
                    for attr in e.attributes() {
                        let attr = attr
                            .map_err(|e| ExtractError::Xml(format!("attribute error: {}", e)))?;
                        if attr.key.as_ref() == b"numFmtId" {
                            num_fmt_id = attr_value(&attr)?.parse()?;
                        }
                    }
                    cell_xfs.push(num_fmt_id);
                }
                b"numFmt" => {
                    let mut id = None;
                    let mut code = None;
                    for attr in e.attributes() {
                        let attr = attr
                            .map_err(|e| ExtractError::Xml(format!("attribute error: {}", e)))?;
                        match attr.key.as_ref() {
                            b"numFmtId" => id = Some(attr_value(&attr)?.parse::<u32>()?),
                            b"formatCode" => code = Some(attr_value(&attr)?),
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        if id >= 164 {
                            num_formats.insert(id, code);
                        }
                    }
                }
                _ => {}
            },
            Event::End(e) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((cell_xfs, num_formats))
}

/// セル参照文字列を座標に変換（例: "A1" -> (0, 0)）
fn parse_cell_ref(ref_str: &str) -> Option<(u32, u32)> {
    let split = ref_str.find(|c: char| c.is_ascii_digit())?;
    let (col_str, row_str) = ref_str.split_at(split);
    if col_str.is_empty() || !col_str.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    // 列を数値に変換（A=0, B=1, ..., Z=25, AA=26, ...）
    let col = col_str
        .chars()
        .try_fold(0u32, |acc, ch| {
            let val = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            acc.checked_mul(26)?.checked_add(val)
        })?
        - 1;

    let row = row_str.parse::<u32>().ok()?.checked_sub(1)?;

    Some((row, col))
}

/// 書式文字列が日付・時刻書式かを判定
///
/// 引用符内、エスケープ文字、`_`/`*`の次の1文字、`[Red]`などの角括弧内は無視します。
/// 経過時間の`[h]`, `[mm]`, `[ss]`は時刻として扱います。
fn is_date_format_code(code: &str) -> bool {
    let mut chars = code.chars();
    let mut in_quote = false;

    while let Some(ch) = chars.next() {
        if in_quote {
            if ch == '"' {
                in_quote = false;
            }
            continue;
        }
        match ch {
            '"' => in_quote = true,
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let inner: String = chars.by_ref().take_while(|&c| c != ']').collect();
                if !inner.is_empty() && inner.chars().all(|c| matches!(c, 'h' | 'H' | 'm' | 'M' | 's' | 'S')) {
                    return true;
                }
            }
            'd' | 'D' | 'm' | 'M' | 'y' | 'Y' | 'h' | 'H' | 's' | 'S' => return true,
            _ => {}
        }
    }

    false
}

/// Excelの日付シリアル値を日時に変換
///
/// 1900年エポックでは、存在しない1900-02-29（シリアル値60）を考慮します。
fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..2_958_466.0).contains(&serial) {
        return None;
    }

    let base = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let millis = (serial * 86_400_000.0).round() as i64;
    base.and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::milliseconds(millis))
}

/// ビルトイン書式ID（0-163）のマッピング
///
/// 27-36, 50-58は地域依存の日付書式で、ここでは代表的な日付書式として扱います。
fn builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        27..=36 | 50..=58 => Some("yyyy-mm-dd"),
        37 => Some("#,##0_);(#,##0)"),
        38 => Some("#,##0_);[Red](#,##0)"),
        39 => Some("#,##0.00_);(#,##0.00)"),
        40 => Some("#,##0.00_);[Red](#,##0.00)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mm:ss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut data));
            let options = FileOptions::default();
            for (name, content) in parts {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        data
    }

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Data &amp; Notes" sheetId="1" r:id="rId2"/>
    <sheet name="Second" sheetId="2" r:id="rId1"/>
  </sheets>
</workbook>"#;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet2.xml"/>
  <Relationship Id="rId2" Type="worksheet" Target="/xl/worksheets/sheet1.xml"/>
</Relationships>"#;

    const SHARED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <si><t>Name</t></si>
  <si><r><t>Bold</t></r><r><t xml:space="preserve"> part</t></r></si>
  <si><t>漢字</t><rPh sb="0" eb="2"><t>カンジ</t></rPh></si>
  <si/>
</sst>"#;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy/mm/dd"/></numFmts>
  <cellStyleXfs count="1"><xf numFmtId="14"/></cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0"/>
    <xf numFmtId="14" fontId="0" applyNumberFormat="1"/>
    <xf numFmtId="164" fontId="0" applyNumberFormat="1"/>
  </cellXfs>
</styleSheet>"#;

    const SHEET1: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
    <row r="2"><c r="A2" s="0"/></row>
    <row r="3"><c r="A3"><v>30</v></c><c r="C3" s="1"><v>45306</v></c><c r="D3" t="b"><v>1</v></c></row>
    <row r="4"><c r="B4" t="inlineStr"><is><t>  inline  text </t></is></c><c r="C4" t="str"><f>A3*2</f><v>60</v></c></row>
    <row r="5"><c r="A5" t="s"><v>2</v></c><c r="B5" t="e"><v>#DIV/0!</v></c></row>
  </sheetData>
</worksheet>"#;

    const SHEET2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData/>
</worksheet>"#;

    fn sample_package() -> XlsxPackage<Cursor<Vec<u8>>> {
        let data = build_package(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/sharedStrings.xml", SHARED),
            ("xl/styles.xml", STYLES),
            ("xl/worksheets/sheet1.xml", SHEET1),
            ("xl/worksheets/sheet2.xml", SHEET2),
        ]);
        XlsxPackage::new(Cursor::new(data), &SecurityConfig::default()).unwrap()
    }

    #[test]
    fn test_sheets_in_workbook_order() {
        let package = sample_package();
        let sheets = package.sheets();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Data & Notes");
        assert_eq!(sheets[0].part, "xl/worksheets/sheet1.xml");
        assert_eq!(sheets[1].name, "Second");
        assert_eq!(sheets[1].part, "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_shared_strings() {
        let package = sample_package();
        assert_eq!(
            package.shared_strings,
            vec!["Name", "Bold part", "漢字", ""]
        );
    }

    #[test]
    fn test_read_sheet_rows() {
        let mut package = sample_package();
        let rows = package.read_sheet_rows(0).unwrap();

        // 行2は値を持たないため除外される
        let indices: Vec<u32> = rows.iter().map(|r| r.row).collect();
        assert_eq!(indices, vec![0, 2, 3, 4]);

        let texts: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.text.as_str()).collect())
            .collect();
        assert_eq!(texts[0], vec!["Name", "Bold part"]);
        assert_eq!(texts[1], vec!["30", "2024-01-15 00:00:00", "TRUE"]);
        assert_eq!(texts[2], vec!["  inline  text ", "60"]);
        assert_eq!(texts[3], vec!["漢字", "#DIV/0!"]);

        assert_eq!(rows[1].cells[1].col, 2);
    }

    #[test]
    fn test_rows_and_cells_in_position_order() {
        const UNORDERED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="3"><c r="B3" t="inlineStr"><is><t>last</t></is></c></row>
    <row r="1"><c r="C1" t="inlineStr"><is><t>right</t></is></c><c r="A1" t="inlineStr"><is><t>left</t></is></c></row>
  </sheetData>
</worksheet>"#;
        let data = build_package(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/worksheets/sheet1.xml", UNORDERED),
        ]);
        let mut package = XlsxPackage::new(Cursor::new(data), &SecurityConfig::default()).unwrap();
        let rows = package.read_sheet_rows(0).unwrap();

        assert_eq!(rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![0, 2]);
        let first: Vec<&str> = rows[0].cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(first, vec!["left", "right"]);
        assert_eq!(rows[0].cells[1].col, 2);
    }

    #[test]
    fn test_attr_value_unescapes_entities() {
        let start = BytesStart::from_content(r#"sheet name="Q&amp;A &lt;1&gt;""#, 5);
        let attr = start.attributes().next().unwrap().unwrap();
        assert_eq!(attr_value(&attr).unwrap(), "Q&A <1>");
    }

    #[test]
    fn test_empty_sheet() {
        let mut package = sample_package();
        assert!(package.read_sheet_rows(1).unwrap().is_empty());
    }

    #[test]
    fn test_sheet_index_out_of_range() {
        let mut package = sample_package();
        assert!(matches!(
            package.read_sheet_rows(5),
            Err(ExtractError::Config(_))
        ));
    }

    #[test]
    fn test_missing_relationships_falls_back_to_sheet_number() {
        let data = build_package(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/worksheets/sheet1.xml", SHEET1),
        ]);
        let package = XlsxPackage::new(Cursor::new(data), &SecurityConfig::default()).unwrap();
        assert_eq!(package.sheets()[0].part, "xl/worksheets/sheet1.xml");
        assert_eq!(package.sheets()[1].part, "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_missing_workbook_part() {
        let data = build_package(&[("xl/worksheets/sheet1.xml", SHEET1)]);
        let result = XlsxPackage::new(Cursor::new(data), &SecurityConfig::default());
        assert!(matches!(result, Err(ExtractError::Zip(_))));
    }

    #[test]
    fn test_not_a_zip() {
        let result = XlsxPackage::new(
            Cursor::new(b"plain text".to_vec()),
            &SecurityConfig::default(),
        );
        assert!(matches!(result, Err(ExtractError::Zip(_))));
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("C3"), Some((2, 2)));
        assert_eq!(parse_cell_ref("AA10"), Some((9, 26)));
        assert_eq!(parse_cell_ref("XFD1048576"), Some((1_048_575, 16_383)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("A"), None);
    }

    #[test]
    fn test_is_date_format_code() {
        assert!(is_date_format_code("mm-dd-yy"));
        assert!(is_date_format_code("yyyy/mm/dd"));
        assert!(is_date_format_code("[h]:mm:ss"));
        assert!(is_date_format_code("[$-409]d-mmm-yy"));
        assert!(!is_date_format_code("General"));
        assert!(!is_date_format_code("0.00"));
        assert!(!is_date_format_code("#,##0.00_);[Red](#,##0.00)"));
        assert!(!is_date_format_code("\"days\" 0"));
        assert!(!is_date_format_code("@"));
    }

    #[test]
    fn test_builtin_format() {
        assert_eq!(builtin_format(0), Some("General"));
        assert_eq!(builtin_format(14), Some("mm-dd-yy"));
        assert_eq!(builtin_format(164), None);
    }

    #[test]
    fn test_serial_to_datetime() {
        let dt = serial_to_datetime(45306.0, false).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");

        let dt = serial_to_datetime(1.0, false).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "1900-01-01");

        let dt = serial_to_datetime(61.0, false).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "1900-03-01");

        let dt = serial_to_datetime(0.0, true).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "1904-01-01");

        let dt = serial_to_datetime(45306.5, false).unwrap();
        assert_eq!(dt.format("%H:%M:%S").to_string(), "12:00:00");

        assert!(serial_to_datetime(-1.0, false).is_none());
        assert!(serial_to_datetime(f64::NAN, false).is_none());
    }
}
