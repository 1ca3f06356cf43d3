use serde::Serialize;

/// Cell with position
#[derive(Debug, Serialize)]
pub struct CellData {
    pub r: u32, // row (1-based)
    pub c: u32, // col (1-based)
    pub cell: Cell,
}

/// A single cell's value
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// The display value (shared strings and inline strings already resolved)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,
    /// Cell type: s=string, n=number, b=boolean, e=error
    pub t: CellType,
    /// Formula text, kept so the value can be reported alongside it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    #[serde(rename = "s")]
    String,
    #[serde(rename = "n")]
    Number,
    #[serde(rename = "b")]
    Boolean,
    #[serde(rename = "e")]
    Error,
}
