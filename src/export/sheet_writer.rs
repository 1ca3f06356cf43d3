//! Rewrites the `<mergeCells>` block of a worksheet XML part.
//!
//! The part is streamed event by event, so everything other than the merged
//! ranges (cells, styles, extensions) is written back untouched.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, XlmergeError};
use crate::merge::MergeRegistry;

/// Worksheet children that must follow `<mergeCells>`, in schema order.
const FOLLOWS_MERGE_CELLS: &[&[u8]] = &[
    b"phoneticPr",
    b"conditionalFormatting",
    b"dataValidations",
    b"hyperlinks",
    b"printOptions",
    b"pageMargins",
    b"pageSetup",
    b"headerFooter",
    b"rowBreaks",
    b"colBreaks",
    b"customProperties",
    b"cellWatches",
    b"ignoredErrors",
    b"smartTags",
    b"drawing",
    b"legacyDrawing",
    b"legacyDrawingHF",
    b"picture",
    b"oleObjects",
    b"controls",
    b"webPublishItems",
    b"tableParts",
    b"extLst",
];

/// Replace the merged ranges stored in `xml` with those of `registry`.
///
/// Any existing `<mergeCells>` element is dropped. A new one is written in
/// schema position unless `registry` is `None` or empty. Elements keep the
/// namespace prefix of the root `<worksheet>`.
pub(crate) fn patch_merge_cells(xml: &str, registry: Option<&MergeRegistry>) -> Result<String> {
    let registry = registry.filter(|r| !r.is_empty());

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(xml.len())));

    let mut depth = 0usize;
    let mut prefix: Option<String> = None;
    // Nesting level inside the old <mergeCells> while it is being dropped.
    let mut skipping = 0usize;
    let mut inserted = registry.is_none();

    loop {
        let event = reader.read_event()?;

        if skipping > 0 {
            match event {
                Event::Start(_) => skipping += 1,
                Event::End(_) => skipping -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e) if depth == 1 => {
                let local = e.local_name();
                if local.as_ref() == b"mergeCells" {
                    if matches!(event, Event::Start(_)) {
                        skipping = 1;
                    }
                    continue;
                }
                if !inserted && FOLLOWS_MERGE_CELLS.contains(&local.as_ref()) {
                    if let Some(registry) = registry {
                        write_merge_cells(&mut writer, prefix.as_deref(), registry)?;
                    }
                    inserted = true;
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
                writer.write_event(&event)?;
            }
            // A self-closing root is expanded so the block has a parent.
            Event::Empty(ref e) if depth == 0 && !inserted => {
                prefix = e
                    .name()
                    .prefix()
                    .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
                writer.write_event(Event::Start(e.borrow()))?;
                if let Some(registry) = registry {
                    write_merge_cells(&mut writer, prefix.as_deref(), registry)?;
                }
                writer.write_event(Event::End(e.to_end()))?;
                inserted = true;
            }
            Event::Start(ref e) => {
                if depth == 0 {
                    prefix = e
                        .name()
                        .prefix()
                        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
                }
                depth += 1;
                writer.write_event(&event)?;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && !inserted {
                    if let Some(registry) = registry {
                        write_merge_cells(&mut writer, prefix.as_deref(), registry)?;
                    }
                    inserted = true;
                }
                writer.write_event(&event)?;
            }
            _ => writer.write_event(&event)?,
        }
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| XlmergeError::Parse(format!("patched sheet is not UTF-8: {e}")))
}

fn qualified(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{p}:{local}"),
        None => local.to_string(),
    }
}

fn write_merge_cells(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    prefix: Option<&str>,
    registry: &MergeRegistry,
) -> Result<()> {
    let tag = qualified(prefix, "mergeCells");
    let cell_tag = qualified(prefix, "mergeCell");
    let count = registry.count().to_string();

    let mut start = BytesStart::new(tag.as_str());
    start.push_attribute(("count", count.as_str()));
    writer.write_event(Event::Start(start))?;
    for region in registry {
        let mut cell = BytesStart::new(cell_tag.as_str());
        cell.push_attribute(("ref", region.reference()));
        writer.write_event(Event::Empty(cell))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
    Ok(())
}
