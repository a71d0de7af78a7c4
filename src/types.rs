//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// セルの値を表す列挙型
///
/// 値のみモードで読み込んだセルのスカラー値です。数式セルはキャッシュされた
/// 計算結果として現れます。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 値が存在しないセル
    Empty,

    /// 文字列
    Text(String),

    /// 整数
    Int(i64),

    /// 浮動小数点数
    Float(f64),

    /// 論理値
    Bool(bool),

    /// 日時
    DateTime(NaiveDateTime),

    /// 時刻（日付シリアル値が1未満の日時セル）
    Time(NaiveTime),

    /// 経過時間（`[h]:mm:ss`などの書式を持つセル）
    Duration(TimeDelta),

    /// エラー値（例: #DIV/0!）
    Error(String),
}

impl CellValue {
    /// 値が存在しないかを判定
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 値を文字列表現に変換（正規化前）
    ///
    /// `Empty`は空文字列になります。呼び出し側で`is_absent()`を先に確認してください。
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::DateTime(dt) => format_datetime(dt),
            CellValue::Time(t) => format_time(t),
            CellValue::Duration(d) => format_duration(d),
            CellValue::Error(e) => e.clone(),
        }
    }
}

/// 浮動小数点数の文字列化
///
/// 整数値（絶対値が1e16未満）は整数として、それ以外は最短表現で出力します。
/// `[1e-4, 1e16)`の範囲外は指数表記（`1e+20`, `1.5e-07`）になります。
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = f.abs();
    if f.fract() == 0.0 && abs < 1e16 {
        return format!("{}", f as i64);
    }

    if abs >= 1e16 || abs < 1e-4 {
        let repr = format!("{:e}", f);
        if let Some((mantissa, exp)) = repr.split_once('e') {
            if let Ok(exp) = exp.parse::<i32>() {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exp.abs());
            }
        }
        return repr;
    }

    format!("{}", f)
}

fn micros_suffix(nanos: u32) -> String {
    let micros = nanos / 1_000;
    if micros == 0 {
        String::new()
    } else {
        format!(".{:06}", micros)
    }
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    format!(
        "{}{}",
        dt.format("%Y-%m-%d %H:%M:%S"),
        micros_suffix(dt.nanosecond() % 1_000_000_000)
    )
}

fn format_time(t: &NaiveTime) -> String {
    format!(
        "{}{}",
        t.format("%H:%M:%S"),
        micros_suffix(t.nanosecond() % 1_000_000_000)
    )
}

/// 経過時間を`[N day[s], ]H:MM:SS[.ffffff]`形式に変換
fn format_duration(d: &TimeDelta) -> String {
    const MICROS_PER_DAY: i64 = 86_400_000_000;

    let total = d
        .num_microseconds()
        .unwrap_or_else(|| d.num_milliseconds().saturating_mul(1_000));
    let days = total.div_euclid(MICROS_PER_DAY);
    let rem = total.rem_euclid(MICROS_PER_DAY);

    let micros = rem % 1_000_000;
    let secs = rem / 1_000_000;
    let (hours, minutes, seconds) = (secs / 3_600, (secs % 3_600) / 60, secs % 60);

    let mut out = String::new();
    if days != 0 {
        let unit = if days.abs() == 1 { "day" } else { "days" };
        out.push_str(&format!("{} {}, ", days, unit));
    }
    out.push_str(&format!("{}:{:02}:{:02}", hours, minutes, seconds));
    if micros != 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

/// ローダーが返すテキストチャンク
///
/// 分割の単位（ワークブック全体、シートごとなど）はローダー側で決まります。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// チャンクのテキスト
    pub page_content: String,
    /// 付随するメタデータ（`source`, `page_name`など）
    pub metadata: HashMap<String, Value>,
}

impl Document {
    /// テキストのみを持つドキュメントを生成
    pub fn new<S: Into<String>>(page_content: S) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: HashMap::new(),
        }
    }

    /// メタデータを設定
    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}
