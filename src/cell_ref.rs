//! Utilities for converting Excel-style cell references and ranges to
//! 1-based column/row coordinates and back.
//!
//! Column `A` is 1 and row `1` is 1. Absolute markers (`$`) are accepted and
//! dropped; column letters are case-insensitive.

use serde::{Deserialize, Serialize};

use crate::error::{Result, XlmergeError};

/// Largest column number a worksheet can address (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// Largest row number a worksheet can address.
pub const MAX_ROWS: u32 = 1_048_576;

/// An axis-aligned cell rectangle in 1-based column/row space.
///
/// `x` is the column axis and `y` the row axis. Rectangles produced by this
/// module are normalized so that `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Rect {
    /// Build a rectangle from two opposite corners given in any order.
    #[must_use]
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        let [x1, y1, x2, y2] = sort_coordinates([a.0, a.1, b.0, b.1]);
        Self { x1, y1, x2, y2 }
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Whether the two rectangles share at least one cell.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    /// Number of cells covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        let cols = u64::from(self.x2 - self.x1) + 1;
        let rows = u64::from(self.y2 - self.y1) + 1;
        cols * rows
    }
}

/// Convert column letters like `"AB"` to a 1-based column number.
pub fn column_name_to_number(name: &str) -> Result<u32> {
    let name = name.trim_start_matches('$');
    if name.is_empty() || name.len() > 3 || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(XlmergeError::CellRef(format!("invalid column name \"{name}\"")));
    }
    let col = name.bytes().fold(0u32, |acc, b| {
        acc * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1
    });
    if col > MAX_COLUMNS {
        return Err(XlmergeError::CellRef(format!(
            "column number exceeds maximum limit in \"{name}\""
        )));
    }
    Ok(col)
}

/// Convert a 1-based column number to letters, e.g. `28` to `"AB"`.
pub fn column_number_to_name(col: u32) -> Result<String> {
    if col == 0 || col > MAX_COLUMNS {
        return Err(XlmergeError::CellRef(format!(
            "column number {col} is out of range 1..={MAX_COLUMNS}"
        )));
    }
    let mut letters = Vec::with_capacity(3);
    let mut n = col;
    while n > 0 {
        let rem = u8::try_from((n - 1) % 26).unwrap_or(0);
        letters.push(char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    Ok(letters.iter().rev().collect())
}

/// Parse a cell reference like `"B3"` or `"$B$3"` into 1-based `(col, row)`.
pub fn cell_name_to_coordinates(cell: &str) -> Result<(u32, u32)> {
    let invalid = || {
        XlmergeError::CellRef(format!(
            "cannot convert cell \"{cell}\" to coordinates: invalid cell name \"{cell}\""
        ))
    };

    let trimmed = cell.trim();
    let body = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let split = body
        .find(|ch: char| !ch.is_ascii_alphabetic())
        .ok_or_else(invalid)?;
    let (letters, rest) = body.split_at(split);
    let digits = rest.strip_prefix('$').unwrap_or(rest);

    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let col = column_name_to_number(letters)?;
    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 || row > MAX_ROWS {
        return Err(XlmergeError::CellRef(format!(
            "row number {row} in \"{cell}\" is out of range 1..={MAX_ROWS}"
        )));
    }
    Ok((col, row))
}

/// Format 1-based `(col, row)` as a cell name, e.g. `(2, 3)` to `"B3"`.
pub fn coordinates_to_cell_name(col: u32, row: u32) -> Result<String> {
    if row == 0 || row > MAX_ROWS {
        return Err(XlmergeError::CellRef(format!(
            "row number {row} is out of range 1..={MAX_ROWS}"
        )));
    }
    Ok(format!("{}{row}", column_number_to_name(col)?))
}

/// Order `[x1, y1, x2, y2]` so the first corner is the top-left one.
#[must_use]
pub fn sort_coordinates([x1, y1, x2, y2]: [u32; 4]) -> [u32; 4] {
    [x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)]
}

/// Parse a range reference like `"C1:B3"` into a normalized [`Rect`].
///
/// A single cell such as `"A1"` is treated as the one-cell range `"A1:A1"`.
pub fn area_ref_to_coordinates(reference: &str) -> Result<Rect> {
    let (start, end) = reference.split_once(':').unwrap_or((reference, reference));
    if end.contains(':') {
        return Err(XlmergeError::CellRef(format!(
            "invalid range reference \"{reference}\""
        )));
    }
    let a = cell_name_to_coordinates(start)?;
    let b = cell_name_to_coordinates(end)?;
    Ok(Rect::from_corners(a, b))
}

/// Format a rectangle as its canonical `"TopLeft:BottomRight"` reference.
pub fn format_range(rect: &Rect) -> Result<String> {
    Ok(format!(
        "{}:{}",
        coordinates_to_cell_name(rect.x1, rect.y1)?,
        coordinates_to_cell_name(rect.x2, rect.y2)?
    ))
}

/// Parse a cell reference from raw bytes (ASCII) into 1-based `(col, row)`.
///
/// This is the lenient bytes equivalent of [`cell_name_to_coordinates`] for use
/// on raw XML attribute values (e.g., `attr.value` from quick-xml).
pub fn cell_ref_bytes_to_coordinates(ref_bytes: &[u8]) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in ref_bytes {
        if b == b'$' {
            continue;
        }
        if b.is_ascii_alphabetic() {
            let upper = b.to_ascii_uppercase();
            col = col.saturating_mul(26).saturating_add(u32::from(upper - b'A') + 1);
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row.saturating_mul(10).saturating_add(u32::from(b - b'0'));
            saw_row = true;
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some((col, row))
}
