//! Main XLSX parser
//!
//! Orchestrates the parsing of all components from the ZIP archive: workbook
//! relationships, the sheet list, shared strings, and each worksheet's cells
//! and merged ranges.

mod relationships;
mod worksheet;

use log::{debug, info};
use std::io::Cursor;
use zip::ZipArchive;

use crate::error::Result;
use crate::types::Workbook;

use relationships::{get_sheet_info, parse_shared_strings, parse_workbook_relationships};
use worksheet::parse_sheet;

/// Knobs for [`parse_with_options`].
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Load cell values. When off only sheet names and merged ranges are
    /// read, and listed merges report empty values.
    pub cell_values: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { cell_values: true }
    }
}

impl ParseOptions {
    /// Skip cell values, keeping only the sheet list and merged ranges.
    #[must_use]
    pub fn merges_only() -> Self {
        Self { cell_values: false }
    }
}

/// Parse an XLSX file from bytes.
pub fn parse(data: &[u8]) -> Result<Workbook> {
    parse_with_options(data, ParseOptions::default())
}

/// Parse an XLSX file from bytes with explicit options.
pub fn parse_with_options(data: &[u8], options: ParseOptions) -> Result<Workbook> {
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)?;

    // Parse workbook relationships first to get actual file paths
    let relationships = parse_workbook_relationships(&mut archive);

    let shared_strings = if options.cell_values {
        parse_shared_strings(&mut archive, relationships.shared_strings.as_deref())
    } else {
        Vec::new()
    };
    debug!("loaded {} shared strings", shared_strings.len());

    let sheet_info = get_sheet_info(&mut archive, &relationships.worksheets)?;

    let mut workbook = Workbook::new();
    for info in &sheet_info {
        let sheet = parse_sheet(&mut archive, info, &shared_strings, options)?;
        debug!(
            "sheet {} ({}): {} cells, {} merged ranges",
            info.name,
            info.path,
            sheet.cells.len(),
            sheet.merge_cells.as_ref().map_or(0, |m| m.count())
        );
        workbook.sheets.push(sheet);
        workbook.sheet_paths.push(info.path.clone());
    }

    info!("parsed workbook with {} sheets", workbook.sheets.len());
    Ok(workbook)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Data &amp; More" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/data.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

    const SST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2">
<si><t>title</t></si><si><r><t>rich </t></r><r><t>text</t></r></si></sst>"#;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" s="2"/><c r="C1" t="inlineStr"><is><t>a &lt; b</t></is></c></row>
<row r="2"><c r="A2"><f>1+1</f><v>2</v></c><c r="B2" t="b"><v>1</v></c><c r="C2" t="s"><v>1</v></c></row>
</sheetData>
<mergeCells count="3"><mergeCell ref="A1:C1"/><mergeCell ref="bogus"/><mergeCell ref="B2:C3"/></mergeCells>
</worksheet>"#;

    fn sample() -> Vec<u8> {
        build(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/sharedStrings.xml", SST),
            ("xl/worksheets/data.xml", SHEET),
        ])
    }

    #[test]
    fn test_parse_cells_and_merges() {
        let wb = parse(&sample()).unwrap();
        assert_eq!(wb.sheet_names(), ["Data & More"]);
        assert_eq!(wb.sheet_paths, ["xl/worksheets/data.xml"]);

        let sheet = "Data & More";
        assert_eq!(wb.cell_value(sheet, "A1").unwrap(), "title");
        assert_eq!(wb.cell_value(sheet, "B1").unwrap(), "");
        assert_eq!(wb.cell_value(sheet, "C1").unwrap(), "a < b");
        assert_eq!(wb.cell_value(sheet, "A2").unwrap(), "2");
        assert_eq!(wb.cell_value(sheet, "B2").unwrap(), "TRUE");
        assert_eq!(wb.cell_value(sheet, "C2").unwrap(), "rich text");

        let ws = wb.sheet(sheet).unwrap();
        assert_eq!(ws.cell(2, 1).unwrap().formula.as_deref(), Some("1+1"));
        assert_eq!((ws.max_row, ws.max_col), (2, 3));

        // The malformed range is dropped, the rest kept in file order.
        let refs: Vec<&str> = ws
            .merge_cells
            .as_ref()
            .unwrap()
            .iter()
            .map(|m| m.reference())
            .collect();
        assert_eq!(refs, ["A1:C1", "B2:C3"]);
    }

    #[test]
    fn test_merges_only_skips_values() {
        let wb = parse_with_options(&sample(), ParseOptions::merges_only()).unwrap();
        let ws = wb.sheet("data & more").unwrap();
        assert!(ws.cells.is_empty());
        assert_eq!(ws.merge_cells.as_ref().unwrap().count(), 2);
    }

    #[test]
    fn test_sheet_without_merges() {
        let sheet = r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData></worksheet>"#;
        let data = build(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/worksheets/data.xml", sheet),
        ]);
        let wb = parse(&data).unwrap();
        assert!(wb.sheets[0].merge_cells.is_none());
    }

    #[test]
    fn test_missing_workbook_part_is_an_error() {
        let data = build(&[("xl/worksheets/sheet1.xml", SHEET)]);
        assert!(parse(&data).is_err());
        assert!(parse(b"not a zip").is_err());
    }
}
