use serde::Serialize;

use super::*;
use crate::cell_ref::cell_name_to_coordinates;
use crate::editor::mutation::apply_cell_edit;
use crate::error::{Result, XlmergeError};
use crate::merge::MergeRegistry;

/// A complete Excel workbook
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    /// ZIP path of each sheet's XML part, parallel to `sheets` (not serialized).
    #[serde(skip)]
    pub(crate) sheet_paths: Vec<String>,
}

impl Workbook {
    /// An empty in-memory workbook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty worksheet named `name`.
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        if self.sheet_index(name).is_ok() {
            return Err(XlmergeError::Other(format!("sheet {name} already exists")));
        }
        let path = format!("xl/worksheets/sheet{}.xml", self.sheets.len() + 1);
        self.sheet_paths.push(path);
        self.sheets.push(Sheet::new(name));
        let idx = self.sheets.len() - 1;
        self.sheets
            .get_mut(idx)
            .ok_or_else(|| XlmergeError::SheetNotFound(name.to_string()))
    }

    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Sheet names are matched case-insensitively, as Excel does.
    pub(crate) fn sheet_index(&self, name: &str) -> Result<usize> {
        let wanted = name.to_lowercase();
        self.sheets
            .iter()
            .position(|s| s.name.to_lowercase() == wanted)
            .ok_or_else(|| XlmergeError::SheetNotFound(name.to_string()))
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        let idx = self.sheet_index(name)?;
        self.sheets
            .get(idx)
            .ok_or_else(|| XlmergeError::SheetNotFound(name.to_string()))
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        let idx = self.sheet_index(name)?;
        self.sheets
            .get_mut(idx)
            .ok_or_else(|| XlmergeError::SheetNotFound(name.to_string()))
    }

    /// Display value of `cell_ref` (e.g. `"D3"`) on `sheet`, or an empty
    /// string for a cell with no value.
    pub fn cell_value(&self, sheet: &str, cell_ref: &str) -> Result<String> {
        let (col, row) = cell_name_to_coordinates(cell_ref)?;
        let ws = self.sheet(sheet)?;
        Ok(ws
            .cell(row, col)
            .and_then(|cell| cell.v.clone())
            .unwrap_or_default())
    }

    /// Set the value of `cell_ref` on `sheet`. An empty value clears the cell.
    pub fn set_cell_value(&mut self, sheet: &str, cell_ref: &str, value: &str) -> Result<()> {
        let (col, row) = cell_name_to_coordinates(cell_ref)?;
        let ws = self.sheet_mut(sheet)?;
        apply_cell_edit(ws, row, col, value);
        Ok(())
    }
}

/// A single worksheet
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    /// Sparse representation: Vec of (row, col, cell)
    pub cells: Vec<CellData>,
    /// Row index for fast cell lookup (not serialized).
    #[serde(skip)]
    pub(crate) cells_by_row: Vec<Vec<usize>>,
    /// Merged-cell regions; `None` when the sheet has no merges at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_cells: Option<MergeRegistry>,
    pub max_row: u32,
    pub max_col: u32,
}

impl Sheet {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: Vec::new(),
            cells_by_row: Vec::new(),
            merge_cells: None,
            max_row: 0,
            max_col: 0,
        }
    }

    /// The cell at 1-based `(row, col)`, if it holds anything.
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        let idx = self.cell_index_at(row, col)?;
        self.cells.get(idx).map(|cd| &cd.cell)
    }

    pub(crate) fn rebuild_cell_index(&mut self) {
        if self.cells.is_empty() {
            self.cells_by_row = Vec::new();
            return;
        }

        let max_row = self.cells.iter().map(|c| c.r).max().unwrap_or(0) as usize;
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); max_row + 1];

        for (idx, cell) in self.cells.iter().enumerate() {
            let row = cell.r as usize;
            if let Some(row_cells) = rows.get_mut(row) {
                row_cells.push(idx);
            }
        }

        for row_cells in &mut rows {
            row_cells.sort_by_key(|&i| self.cells.get(i).map(|cell| cell.c).unwrap_or(u32::MAX));
        }

        self.cells_by_row = rows;
    }

    pub(crate) fn cell_index_at(&self, row: u32, col: u32) -> Option<usize> {
        if self.cells_by_row.is_empty() {
            return self.cells.iter().position(|c| c.r == row && c.c == col);
        }
        let row_cells = self.cells_by_row.get(row as usize)?;
        let pos = row_cells
            .partition_point(|&i| self.cells.get(i).map(|cell| cell.c < col).unwrap_or(false));
        let idx = row_cells.get(pos).copied()?;
        self.cells
            .get(idx)
            .is_some_and(|cell| cell.c == col)
            .then_some(idx)
    }
}
