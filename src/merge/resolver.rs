//! Overlap resolution: rebuilds a registry whose regions may overlap into the
//! maximal set of mutually disjoint regions.
//!
//! Every region is stamped into a marker grid spanning the bounding box of
//! all regions, so its size follows the merge extent rather than the distance
//! from `A1`. A region that
//! lands on cells already carrying another region's marker is folded with
//! those partners into their bounding-box union, and the union's area is
//! re-stamped with the new region's id. The fold keeps growing while the
//! union uncovers markers of regions not yet absorbed, so a union never ends
//! up partially covering a region it did not swallow.
//!
//! Survivors are the regions whose own top-left cell still carries their id.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::region::{MergeRegion, RegionId};
use super::registry::MergeRegistry;
use crate::cell_ref::Rect;
use crate::error::{Result, XlmergeError};

/// Transient per-pass grid of region markers, column-major, covering
/// `extent` only.
struct MarkerGrid {
    extent: Rect,
    rows: usize,
    cells: Vec<Option<RegionId>>,
}

impl MarkerGrid {
    fn new(extent: Rect) -> Result<Self> {
        let rows = (extent.y2 - extent.y1) as usize + 1;
        let cols = (extent.x2 - extent.x1) as usize + 1;
        let too_large =
            || XlmergeError::Other(format!("merge extent {cols}x{rows} is too large"));

        let len = usize::try_from(extent.area()).map_err(|_| too_large())?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| too_large())?;
        cells.resize(len, None);
        debug!("marker grid {cols}x{rows} from column {} row {}", extent.x1, extent.y1);

        Ok(Self {
            extent,
            rows,
            cells,
        })
    }

    /// Position of the 1-based cell `(x, y)`. Cells outside the extent map
    /// past the end of the grid.
    fn index(&self, x: u32, y: u32) -> usize {
        match (x.checked_sub(self.extent.x1), y.checked_sub(self.extent.y1)) {
            (Some(dx), Some(dy)) if x <= self.extent.x2 && y <= self.extent.y2 => {
                (dx as usize) * self.rows + dy as usize
            }
            _ => usize::MAX,
        }
    }

    fn get(&self, x: u32, y: u32) -> Option<RegionId> {
        self.cells.get(self.index(x, y)).copied().flatten()
    }

    fn set(&mut self, x: u32, y: u32, marker: Option<RegionId>) {
        let idx = self.index(x, y);
        if let Some(slot) = self.cells.get_mut(idx) {
            *slot = marker;
        }
    }

    fn stamp(&mut self, rect: Rect, marker: Option<RegionId>) {
        for (x, y) in covered_cells(rect) {
            self.set(x, y, marker);
        }
    }
}

/// `(column, row)` pairs covered by a rectangle, column-major.
fn covered_cells(rect: Rect) -> impl Iterator<Item = (u32, u32)> {
    let rows = rect.y1..=rect.y2;
    (rect.x1..=rect.x2).flat_map(move |x| rows.clone().map(move |y| (x, y)))
}

/// Consolidate overlapping regions in place.
///
/// Returns `true` when at least one fold happened. On error the registry is
/// left as it was.
pub(crate) fn merge_overlaps(registry: &mut MergeRegistry) -> Result<bool> {
    let mut rects: HashMap<RegionId, Rect> = HashMap::with_capacity(registry.count());
    let mut extent: Option<Rect> = None;
    for region in registry.iter() {
        let rect = region.rect()?;
        extent = Some(extent.map_or(rect, |e| e.union(&rect)));
        rects.insert(region.id(), rect);
    }
    let Some(extent) = extent else {
        return Ok(false);
    };

    let mut grid = MarkerGrid::new(extent)?;
    let mut slots: Vec<MergeRegion> = registry.regions().to_vec();
    let mut folds = 0usize;

    for slot in &mut slots {
        let id = slot.id();
        let Some(&rect) = rects.get(&id) else {
            continue;
        };

        let mut seen = HashSet::new();
        let mut partners = Vec::new();
        for (x, y) in covered_cells(rect) {
            if let Some(marker) = grid.get(x, y) {
                if marker != id && seen.insert(marker) {
                    partners.push(marker);
                }
            }
            grid.set(x, y, Some(id));
        }
        if partners.is_empty() {
            continue;
        }

        seen.insert(id);
        let mut union = rect;
        let mut pending = partners;
        while !pending.is_empty() {
            for partner in pending.drain(..) {
                if let Some(partner_rect) = rects.get(&partner) {
                    union = union.union(partner_rect);
                }
            }
            for (x, y) in covered_cells(union) {
                if let Some(marker) = grid.get(x, y) {
                    if seen.insert(marker) {
                        pending.push(marker);
                    }
                }
            }
        }

        let unified = MergeRegion::from_rect(registry.next_id()?, union)?;
        grid.stamp(union, Some(unified.id()));
        rects.insert(unified.id(), union);
        debug!(
            "folded {} into {} ({} regions absorbed)",
            slot.reference(),
            unified.reference(),
            seen.len() - 1
        );
        *slot = unified;
        folds += 1;
    }

    let before = slots.len();
    let mut survivors = Vec::with_capacity(before);
    for region in slots {
        let Some(&rect) = rects.get(&region.id()) else {
            continue;
        };
        let top_left = grid.get(rect.x1, rect.y1);
        if top_left == Some(region.id()) {
            grid.stamp(rect, None);
            survivors.push(region);
        }
    }

    if folds > 0 {
        debug!(
            "consolidated {before} merge regions into {} ({folds} folds)",
            survivors.len()
        );
    }
    registry.replace_regions(survivors);
    Ok(folds > 0)
}

impl MergeRegistry {
    /// Replace overlapping regions with their bounding-box unions so that the
    /// remaining regions are pairwise disjoint.
    ///
    /// Returns `true` if anything changed.
    pub fn consolidate(&mut self) -> Result<bool> {
        merge_overlaps(self)
    }
}
