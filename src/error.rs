//! Structured error types for xlmerge.

/// All errors that can occur while loading, editing or saving merged cells.
#[derive(Debug, thiserror::Error)]
pub enum XlmergeError {
    /// XML parsing or writing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Invalid cell reference or cell range reference.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// No worksheet with the given name exists in the workbook.
    #[error("Sheet {0} does not exist")]
    SheetNotFound(String),

    /// Malformed workbook package structure.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlmergeError>;

impl From<String> for XlmergeError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for XlmergeError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}
