//! xlmerge - merged-cell regions for XLSX worksheets
//!
//! Loads an XLSX workbook, then merges, unmerges and lists merged ranges:
//! - Corner cells may be given in any order and are normalized
//! - Overlapping merges are consolidated into their bounding-box union
//! - Listing reports each range with the value of its top-left cell
//! - Saving rewrites only the `<mergeCells>` block of edited sheets
//!
//! # Usage
//!
//! ```no_run
//! use xlmerge::MergeEditor;
//!
//! # fn main() -> xlmerge::Result<()> {
//! let data = std::fs::read("book.xlsx")?;
//! let mut editor = MergeEditor::new();
//! editor.load(&data)?;
//! editor.merge_cell("Sheet1", "D3", "E9")?;
//! for merged in editor.get_merge_cells("Sheet1")? {
//!     println!("{} = {}", merged.reference(), merged.cell_value());
//! }
//! std::fs::write("book.xlsx", editor.save()?)?;
//! # Ok(())
//! # }
//! ```

pub mod cell_ref;
pub mod editor;
pub mod error;
mod export;
pub mod merge;
pub mod parser;
pub mod types;

pub use editor::MergeEditor;
pub use error::{Result, XlmergeError};
pub use merge::{MergeCell, MergeRegion, MergeRegistry, RegionId};
pub use parser::ParseOptions;
pub use types::*;
