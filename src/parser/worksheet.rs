//! Worksheet parsing - parses individual sheet XML into Sheet structs.

use log::warn;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::{area_ref_to_coordinates, cell_ref_bytes_to_coordinates};
use crate::error::Result;
use crate::merge::MergeRegistry;
use crate::types::{Cell, CellData, CellType, Sheet};

use super::ParseOptions;

/// Sheet metadata from workbook.xml
pub(super) struct SheetInfo {
    pub name: String,
    pub path: String,
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Default,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        _ => CellTypeTag::Default,
    }
}

/// Which child of a `<c>` element is being read.
#[derive(Copy, Clone)]
enum TextTarget {
    /// `<v>` or inline `<is><t>`
    Value,
    Formula,
}

/// Resolve a raw `<v>`/`<t>` payload into the cell's type and display text.
fn resolve_cell_value(
    tag: CellTypeTag,
    raw: String,
    shared_strings: &[String],
) -> Option<(CellType, String)> {
    match tag {
        CellTypeTag::Shared => {
            let idx: usize = raw.trim().parse().ok()?;
            shared_strings
                .get(idx)
                .map(|s| (CellType::String, s.clone()))
        }
        CellTypeTag::Inline | CellTypeTag::Str => Some((CellType::String, raw)),
        CellTypeTag::Bool => {
            let display = if raw.trim() == "1" { "TRUE" } else { "FALSE" };
            Some((CellType::Boolean, display.to_string()))
        }
        CellTypeTag::Error => Some((CellType::Error, raw)),
        CellTypeTag::Default => Some((CellType::Number, raw)),
    }
}

/// Parse one worksheet part: its cell values (unless disabled by `options`)
/// and its `<mergeCells>` block.
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    info: &SheetInfo,
    shared_strings: &[String],
    options: ParseOptions,
) -> Result<Sheet> {
    let file = archive.by_name(&info.path)?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut sheet = Sheet::new(&info.name);
    let mut merges = MergeRegistry::new();

    let mut buf = Vec::new();
    let mut cell_buf = Vec::new();

    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            ref event @ (Event::Start(_) | Event::Empty(_)) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                let is_start_event = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"c" if options.cell_values => {
                        let mut pos: Option<(u32, u32)> = None;
                        let mut tag = CellTypeTag::Default;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => pos = cell_ref_bytes_to_coordinates(&attr.value),
                                b"t" => tag = parse_cell_type_tag(&attr.value),
                                _ => {}
                            }
                        }

                        // Self-closing cells like <c r="A1" s="3"/> carry only a style.
                        if !is_start_event {
                            continue;
                        }

                        let mut raw: Option<String> = None;
                        let mut formula: Option<String> = None;
                        let mut target: Option<TextTarget> = None;

                        loop {
                            cell_buf.clear();
                            match xml.read_event_into(&mut cell_buf)? {
                                Event::Start(ref inner) => match inner.local_name().as_ref() {
                                    b"v" | b"t" => target = Some(TextTarget::Value),
                                    b"f" => target = Some(TextTarget::Formula),
                                    _ => {}
                                },
                                Event::Text(ref text) => {
                                    let Some(which) = target else {
                                        continue;
                                    };
                                    let text = text.unescape()?;
                                    let slot = match which {
                                        TextTarget::Value => &mut raw,
                                        TextTarget::Formula => &mut formula,
                                    };
                                    slot.get_or_insert_with(String::new).push_str(&text);
                                }
                                Event::End(ref inner) => match inner.local_name().as_ref() {
                                    b"c" => break,
                                    b"v" | b"t" | b"f" => target = None,
                                    _ => {}
                                },
                                Event::Eof => break,
                                _ => {}
                            }
                        }

                        let Some((col, row)) = pos else {
                            warn!(
                                "sheet {}: skipping cell without a valid reference",
                                info.name
                            );
                            continue;
                        };
                        let resolved =
                            raw.and_then(|raw| resolve_cell_value(tag, raw, shared_strings));
                        if resolved.is_none() && formula.is_none() {
                            continue;
                        }
                        let (t, v) = match resolved {
                            Some((t, v)) => (t, Some(v)),
                            None => (CellType::Number, None),
                        };

                        sheet.cells.push(CellData {
                            r: row,
                            c: col,
                            cell: Cell { v, t, formula },
                        });
                        sheet.max_row = sheet.max_row.max(row);
                        sheet.max_col = sheet.max_col.max(col);
                    }

                    b"mergeCell" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() != b"ref" {
                                continue;
                            }
                            let reference = std::str::from_utf8(&attr.value).unwrap_or("");
                            match area_ref_to_coordinates(reference) {
                                Ok(rect) => {
                                    merges.push_rect(rect)?;
                                }
                                Err(err) => {
                                    warn!(
                                        "sheet {}: skipping merged range {reference:?}: {err}",
                                        info.name
                                    );
                                }
                            }
                        }
                    }

                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !merges.is_empty() {
        sheet.merge_cells = Some(merges);
    }
    sheet.rebuild_cell_index();

    Ok(sheet)
}
