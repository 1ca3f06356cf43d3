//! A single merged-cell region and the `(reference, value)` pairs handed back
//! to callers when listing merges.

use std::cell::OnceCell;
use std::num::NonZeroU32;

use serde::{Serialize, Serializer};

use crate::cell_ref::{area_ref_to_coordinates, format_range, Rect};
use crate::error::Result;

/// Registry-local identity of a merge region.
///
/// Ids are handed out by [`super::MergeRegistry`] and never reused within one
/// registry, so two regions compare equal by id only if they are the same
/// region. The non-zero niche keeps `Option<RegionId>` at four bytes, which
/// is what the resolver's marker grid stores per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(NonZeroU32);

impl RegionId {
    pub(crate) fn new(raw: NonZeroU32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// A merged-cell region: a canonical `"TopLeft:BottomRight"` reference plus
/// its rectangle, derived on first access and cached.
///
/// Regions are immutable. Consolidation replaces a region with a new one.
#[derive(Debug, Clone)]
pub struct MergeRegion {
    id: RegionId,
    reference: String,
    rect: OnceCell<Rect>,
}

impl MergeRegion {
    /// A region whose rectangle is parsed lazily from `reference`.
    pub(crate) fn from_reference(id: RegionId, reference: String) -> Self {
        Self {
            id,
            reference,
            rect: OnceCell::new(),
        }
    }

    /// A region built from an already-normalized rectangle.
    pub(crate) fn from_rect(id: RegionId, rect: Rect) -> Result<Self> {
        let reference = format_range(&rect)?;
        Ok(Self {
            id,
            reference,
            rect: OnceCell::from(rect),
        })
    }

    #[must_use]
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// The canonical range reference, e.g. `"D3:E9"`.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The region's rectangle, computed once from the reference.
    ///
    /// Fails only for regions loaded from a worksheet with a malformed `ref`.
    pub fn rect(&self) -> Result<Rect> {
        if let Some(rect) = self.rect.get() {
            return Ok(*rect);
        }
        let rect = area_ref_to_coordinates(&self.reference)?;
        Ok(*self.rect.get_or_init(|| rect))
    }

    /// Top-left cell name of the region.
    #[must_use]
    pub fn start_axis(&self) -> &str {
        start_axis(&self.reference)
    }
}

impl Serialize for MergeRegion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.reference)
    }
}

pub(crate) fn start_axis(reference: &str) -> &str {
    reference.split(':').next().unwrap_or(reference)
}

fn end_axis(reference: &str) -> &str {
    reference
        .split_once(':')
        .map_or(reference, |(_, end)| end)
}

/// A merged range as reported to callers: its reference and the value of its
/// top-left cell, e.g. `("D4:E10", "cell value")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCell {
    reference: String,
    value: String,
}

impl MergeCell {
    #[must_use]
    pub fn new(reference: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Value of the merged range's top-left cell.
    #[must_use]
    pub fn cell_value(&self) -> &str {
        &self.value
    }

    /// Top-left cell of the merged range, for example `"C2"`.
    #[must_use]
    pub fn start_axis(&self) -> &str {
        start_axis(&self.reference)
    }

    /// Bottom-right cell of the merged range, for example `"D4"`.
    #[must_use]
    pub fn end_axis(&self) -> &str {
        end_axis(&self.reference)
    }
}
