//! The ordered collection of merge regions owned by one worksheet.

use std::num::NonZeroU32;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::region::{MergeRegion, RegionId};
use crate::cell_ref::Rect;
use crate::error::{Result, XlmergeError};

/// Ordered merge regions of a worksheet.
///
/// Insertion order is kept except where the overlap resolver collapses
/// entries. The region count is always the length of the sequence.
#[derive(Debug, Clone, Default)]
pub struct MergeRegistry {
    regions: Vec<MergeRegion>,
    last_id: u32,
}

impl MergeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_id(&mut self) -> Result<RegionId> {
        self.last_id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| XlmergeError::Other("merge region ids exhausted".into()))?;
        NonZeroU32::new(self.last_id)
            .map(RegionId::new)
            .ok_or_else(|| XlmergeError::Other("merge region ids exhausted".into()))
    }

    /// Append a region from a reference string as found in a worksheet part.
    ///
    /// The reference is not parsed until the region's rectangle is needed.
    pub fn push_reference(&mut self, reference: impl Into<String>) -> Result<RegionId> {
        let id = self.next_id()?;
        self.regions.push(MergeRegion::from_reference(id, reference.into()));
        Ok(id)
    }

    /// Append a region covering `rect`. No overlap check is made.
    pub fn push_rect(&mut self, rect: Rect) -> Result<RegionId> {
        let id = self.next_id()?;
        self.regions.push(MergeRegion::from_rect(id, rect)?);
        Ok(id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[must_use]
    pub fn regions(&self) -> &[MergeRegion] {
        &self.regions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MergeRegion> {
        self.regions.iter()
    }

    pub(crate) fn replace_regions(&mut self, regions: Vec<MergeRegion>) {
        self.regions = regions;
    }

    /// Drop every region intersecting `query`, returning how many were removed.
    ///
    /// Rectangles are computed before anything is removed, so a malformed
    /// region leaves the registry untouched.
    pub(crate) fn remove_intersecting(&mut self, query: &Rect) -> Result<usize> {
        let hits = self
            .regions
            .iter()
            .map(|region| region.rect().map(|rect| rect.intersects(query)))
            .collect::<Result<Vec<bool>>>()?;

        let before = self.regions.len();
        let mut hits = hits.into_iter();
        self.regions.retain(|_| !hits.next().unwrap_or(false));
        Ok(before - self.regions.len())
    }
}

impl<'a> IntoIterator for &'a MergeRegistry {
    type Item = &'a MergeRegion;
    type IntoIter = std::slice::Iter<'a, MergeRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl Serialize for MergeRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MergeRegistry", 2)?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("cells", &self.regions)?;
        state.end()
    }
}
