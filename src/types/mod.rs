//! Data types for the workbook model.

mod cell;
mod workbook;

pub use cell::*;
pub use workbook::*;
