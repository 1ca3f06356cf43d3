//! Merged-cell regions.
//!
//! Merging keeps only the upper-left cell value. Regions may be added freely,
//! including on top of existing ones; overlaps are consolidated into their
//! bounding-box union when regions are listed or removed. For example, after
//! merging `B1:D5` and then `A4:C8`, listing the sheet's merges reports the
//! single region `A1:D8`:
//!
//! ```text
//!              B1(x1,y1)      D1(x2,y1)
//!            +------------------------+
//!            |                        |
//!  A4(x3,y3) |    C4(x4,y3)           |
//! +------------------------+          |
//! |          |             |          |
//! |          |B5(x1,y2)    | D5(x2,y2)|
//! |          +------------------------+
//! |                        |
//! |A8(x3,y4)      C8(x4,y4)|
//! +------------------------+
//! ```

mod region;
mod registry;
mod resolver;

pub use region::{MergeCell, MergeRegion, RegionId};
pub use registry::MergeRegistry;

use log::debug;

use crate::cell_ref::{area_ref_to_coordinates, cell_name_to_coordinates, Rect};
use crate::error::Result;
use crate::types::Workbook;

impl Workbook {
    /// Merge the area between two corner cells of `sheet`, e.g. `D3` and `E9`.
    ///
    /// The corners may be given in any order; `C1`/`B3` is stored as `B1:C3`.
    /// No overlap check is made here.
    pub fn merge_cell(&mut self, sheet: &str, h_cell: &str, v_cell: &str) -> Result<()> {
        let rect = Rect::from_corners(
            cell_name_to_coordinates(h_cell)?,
            cell_name_to_coordinates(v_cell)?,
        );

        let ws = self.sheet_mut(sheet)?;
        let registry = ws.merge_cells.get_or_insert_with(MergeRegistry::new);
        registry.push_rect(rect)?;
        debug!(
            "sheet {}: merged {h_cell}:{v_cell}, {} regions",
            ws.name,
            registry.count()
        );
        Ok(())
    }

    /// Unmerge every merged region of `sheet` that intersects the area between
    /// two corner cells. Overlapping merges are consolidated first, and a
    /// partial overlap removes the whole region.
    ///
    /// A sheet without merges is left as is.
    pub fn unmerge_cell(&mut self, sheet: &str, h_cell: &str, v_cell: &str) -> Result<()> {
        let ws = self.sheet_mut(sheet)?;
        let query = area_ref_to_coordinates(&format!("{h_cell}:{v_cell}"))?;

        let Some(registry) = ws.merge_cells.as_mut() else {
            return Ok(());
        };
        registry.consolidate()?;
        let removed = registry.remove_intersecting(&query)?;
        debug!(
            "sheet {}: unmerged {h_cell}:{v_cell}, removed {removed} regions",
            ws.name
        );
        if registry.is_empty() {
            ws.merge_cells = None;
        }
        Ok(())
    }

    /// All merged regions of `sheet` after consolidating overlaps, each with
    /// the value of its top-left cell.
    pub fn get_merge_cells(&mut self, sheet: &str) -> Result<Vec<MergeCell>> {
        let ws = self.sheet_mut(sheet)?;
        let Some(registry) = ws.merge_cells.as_mut() else {
            return Ok(Vec::new());
        };
        registry.consolidate()?;
        let references: Vec<String> = registry
            .iter()
            .map(|region| region.reference().to_string())
            .collect();

        references
            .into_iter()
            .map(|reference| {
                let value = self.cell_value(sheet, region::start_axis(&reference))?;
                Ok(MergeCell::new(reference, value))
            })
            .collect()
    }
}
