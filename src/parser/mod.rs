//! Parser Module
//!
//! スプレッドシートの読み込み経路。
//! `workbook`はcalamineによる値のみの読み込み、`package`はOOXMLパッケージの直接解析です。

mod package;
mod workbook;

pub(crate) use package::{PackageRow, XlsxPackage};
pub(crate) use workbook::WorkbookReader;
