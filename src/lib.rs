//! xlsxtext - Plain-text extraction from spreadsheets with memory profiling
//!
//! This crate extracts the text content of a spreadsheet workbook in two ways
//! and reports how much memory each extraction uses:
//!
//! - **Loader**: a document loader splits the workbook into chunks and the
//!   chunks are concatenated, one per line.
//! - **Workbook**: the workbook is opened read-only, cells are visited sheet by
//!   sheet and row by row, and each cell value is normalized before joining.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let text = xlsxtext::extract_from_workbook("data.xlsx")?;
//!     println!("{}", text.chars().count());
//!
//!     let text = xlsxtext::extract_with_loader("data.xlsx")?;
//!     println!("{}", text.chars().count());
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use xlsxtext::{ExtractionMethod, ExtractorBuilder, LoaderMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = ExtractorBuilder::new()
//!         .with_method(ExtractionMethod::Loader)
//!         .with_loader_mode(LoaderMode::Elements)
//!         .with_profiling(true)
//!         .build()?;
//!
//!     let (text, report) = extractor.extract_with_report("data.xlsx")?;
//!     println!("{}", text);
//!     if let Some(report) = report {
//!         eprintln!("{}", report);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Custom Loaders
//!
//! Any type implementing [`DocumentLoader`] can feed a [`LoaderExtractor`]:
//!
//! ```rust
//! use std::path::Path;
//! use xlsxtext::{Document, DocumentLoader, ExtractError, Extractor, LoaderExtractor};
//!
//! struct OneChunk;
//!
//! impl DocumentLoader for OneChunk {
//!     fn load(&self, _path: &Path) -> Result<Vec<Document>, ExtractError> {
//!         Ok(vec![Document::new("  hello  ")])
//!     }
//! }
//!
//! let text = LoaderExtractor::new(OneChunk).extract(Path::new("any.xlsx")).unwrap();
//! assert_eq!(text, "hello");
//! ```

mod api;
mod builder;
pub mod cli;
mod error;
mod extract;
mod loader;
mod normalize;
mod parser;
mod profile;
mod security;
mod types;

// 公開API
pub use api::{ExtractionMethod, LoaderMode};
pub use builder::{ExtractorBuilder, TextExtractor};
pub use error::ExtractError;
pub use extract::{
    extract_from_workbook, extract_with_loader, Extractor, LoaderExtractor, WorkbookExtractor,
};
pub use loader::{DocumentLoader, SpreadsheetLoader};
pub use normalize::{clean_cell_text, finish_text, join_row};
pub use profile::{MemorySampler, ProcessSampler, ProfileEntry, ProfileReport, Profiled};
pub use types::{CellValue, Document};
