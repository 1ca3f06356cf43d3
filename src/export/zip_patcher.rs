//! Patch an XLSX ZIP archive with modified sheet XML.
//!
//! Unmodified entries are copied via `raw_copy_file` (zero recompression cost).
//! Only dirty sheets get their merged ranges rewritten.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use log::debug;

use crate::error::Result;
use crate::types::Workbook;

use super::sheet_writer::patch_merge_cells;

/// Patch the original XLSX bytes, replacing only sheets in `dirty_sheets`.
///
/// Returns the new XLSX file as `Vec<u8>`.
pub(crate) fn patch_zip(
    original_data: &[u8],
    workbook: &Workbook,
    dirty_sheets: &HashSet<usize>,
) -> Result<Vec<u8>> {
    let cursor = Cursor::new(original_data);
    let mut archive = ZipArchive::new(cursor)?;

    // Patched XML for every dirty sheet, keyed by ZIP path
    let mut patched: HashMap<&str, String> = HashMap::new();
    for &idx in dirty_sheets {
        let (Some(path), Some(sheet)) = (workbook.sheet_paths.get(idx), workbook.sheets.get(idx))
        else {
            continue;
        };
        let mut xml = String::new();
        archive.by_name(path)?.read_to_string(&mut xml)?;
        let xml = patch_merge_cells(&xml, sheet.merge_cells.as_ref())?;
        debug!("rewrote merged ranges of {path}");
        patched.insert(path.as_str(), xml);
    }

    let buf: Vec<u8> = Vec::with_capacity(original_data.len());
    let mut writer = ZipWriter::new(Cursor::new(buf));

    // Copy all entries, replacing dirty ones
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        let name = entry.name().to_string();

        if let Some(xml) = patched.get(name.as_str()) {
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            writer.start_file(name.as_str(), options)?;
            writer.write_all(xml.as_bytes())?;
            continue;
        }

        // Pass through unmodified entry (raw copy, no re-compression)
        writer.raw_copy_file(entry)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
