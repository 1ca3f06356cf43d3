//! Cell value mutations.
//!
//! Applies value edits to the in-memory sheet model.

use crate::types::{Cell, CellData, CellType, Sheet};

/// Apply a value edit to the cell at 1-based `(row, col)`.
///
/// Detects the value type automatically:
/// - Empty string → clears the cell
/// - "true"/"false" (case-insensitive) → Boolean
/// - Parseable as f64 → Number
/// - Otherwise → String
pub(crate) fn apply_cell_edit(sheet: &mut Sheet, row: u32, col: u32, value: &str) {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        // Clear cell: remove it from the cells vec
        if let Some(idx) = sheet.cell_index_at(row, col) {
            sheet.cells.remove(idx);
            sheet.rebuild_cell_index();
        }
        return;
    }

    let (cell_type, display) = detect_cell_type(trimmed);

    if let Some(idx) = sheet.cell_index_at(row, col) {
        if let Some(cd) = sheet.cells.get_mut(idx) {
            cd.cell.t = cell_type;
            cd.cell.v = Some(display);
            cd.cell.formula = None; // Editing clears the formula
        }
        return;
    }

    sheet.cells.push(CellData {
        r: row,
        c: col,
        cell: Cell {
            v: Some(display),
            t: cell_type,
            formula: None,
        },
    });
    sheet.max_row = sheet.max_row.max(row);
    sheet.max_col = sheet.max_col.max(col);
    sheet.rebuild_cell_index();
}

/// Detect the appropriate cell type and its display text.
fn detect_cell_type(value: &str) -> (CellType, String) {
    if value.eq_ignore_ascii_case("true") {
        return (CellType::Boolean, "TRUE".into());
    }
    if value.eq_ignore_ascii_case("false") {
        return (CellType::Boolean, "FALSE".into());
    }
    if value.parse::<f64>().is_ok() {
        return (CellType::Number, value.into());
    }
    (CellType::String, value.into())
}
