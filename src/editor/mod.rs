//! Merge editing session around a loaded XLSX file.
//!
//! `MergeEditor` owns the original file bytes and the parsed workbook, adding:
//! - Merge/unmerge/list operations on named sheets
//! - Dirty tracking for sheets whose merged regions changed
//! - XLSX save (roundtrip via the export pipeline)

pub(crate) mod mutation;

use std::collections::HashSet;

use log::debug;

use crate::error::{Result, XlmergeError};
use crate::merge::MergeCell;
use crate::parser::{self, ParseOptions};
use crate::types::Workbook;

/// An editing session over one XLSX file.
#[derive(Debug, Default)]
pub struct MergeEditor {
    original_bytes: Option<Vec<u8>>,
    workbook: Option<Workbook>,
    /// Indices of sheets whose merged regions differ from the loaded file.
    dirty_sheets: HashSet<usize>,
}

impl MergeEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an XLSX file from bytes.
    ///
    /// Stores the original bytes for later save (ZIP roundtrip).
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        self.load_with_options(data, ParseOptions::default())
    }

    /// Load an XLSX file from bytes with explicit parse options.
    pub fn load_with_options(&mut self, data: &[u8], options: ParseOptions) -> Result<()> {
        let workbook = parser::parse_with_options(data, options)?;
        self.original_bytes = Some(data.to_vec());
        self.workbook = Some(workbook);
        self.dirty_sheets.clear();
        Ok(())
    }

    #[must_use]
    pub fn workbook(&self) -> Option<&Workbook> {
        self.workbook.as_ref()
    }

    /// Merge the area between two corner cells of `sheet`.
    pub fn merge_cell(&mut self, sheet: &str, h_cell: &str, v_cell: &str) -> Result<()> {
        self.edit(sheet, |wb| wb.merge_cell(sheet, h_cell, v_cell))
    }

    /// Unmerge every region of `sheet` intersecting the given area.
    pub fn unmerge_cell(&mut self, sheet: &str, h_cell: &str, v_cell: &str) -> Result<()> {
        self.edit(sheet, |wb| wb.unmerge_cell(sheet, h_cell, v_cell))
    }

    /// List the merged regions of `sheet`.
    ///
    /// Listing consolidates overlapping regions, so a sheet loaded with
    /// overlaps becomes dirty here.
    pub fn get_merge_cells(&mut self, sheet: &str) -> Result<Vec<MergeCell>> {
        self.edit(sheet, |wb| wb.get_merge_cells(sheet))
    }

    /// Check if any sheet's merges changed since load.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty_sheets.is_empty()
    }

    /// Save the workbook to XLSX bytes.
    ///
    /// If nothing changed, returns the original bytes.
    pub fn save(&self) -> Result<Vec<u8>> {
        let original = self
            .original_bytes
            .as_ref()
            .ok_or_else(|| XlmergeError::Other("no file loaded".into()))?;
        let workbook = self
            .workbook
            .as_ref()
            .ok_or_else(|| XlmergeError::Other("no workbook loaded".into()))?;

        crate::export::save_xlsx(original, workbook, &self.dirty_sheets)
    }

    /// Run `op` against the workbook and mark `sheet` dirty if its merged
    /// regions changed. Failed operations never mark anything.
    fn edit<T>(&mut self, sheet: &str, op: impl FnOnce(&mut Workbook) -> Result<T>) -> Result<T> {
        let workbook = self
            .workbook
            .as_mut()
            .ok_or_else(|| XlmergeError::Other("no workbook loaded".into()))?;

        // Lookup errors are left to `op`, which decides what it checks first.
        let idx = workbook.sheet_index(sheet).ok();
        let before = idx.map(|idx| merge_refs(workbook, idx));
        let out = op(workbook)?;
        if let Some(idx) = idx {
            if before != Some(merge_refs(workbook, idx)) && self.dirty_sheets.insert(idx) {
                debug!("sheet {sheet} marked dirty");
            }
        }
        Ok(out)
    }
}

fn merge_refs(workbook: &Workbook, idx: usize) -> Option<Vec<String>> {
    let registry = workbook.sheets.get(idx)?.merge_cells.as_ref()?;
    Some(
        registry
            .iter()
            .map(|region| region.reference().to_string())
            .collect(),
    )
}
