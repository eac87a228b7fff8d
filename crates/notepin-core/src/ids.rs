#![forbid(unsafe_code)]

//! Session-scoped id allocation.

use crate::document::Document;
use crate::item::ItemId;

/// Hands out item ids for one session.
///
/// The next id is `max(document max, highest id issued) + 1`, so deleting the
/// newest item and adding another never brings its id back within a session.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    high_water: Option<ItemId>,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the ids already present in `document`.
    #[must_use]
    pub fn seeded_from(document: &Document) -> Self {
        let mut allocator = Self::new();
        allocator.observe(document);
        allocator
    }

    /// Raise the high-water mark to cover every id in `document`.
    pub fn observe(&mut self, document: &Document) {
        if let Some(max) = document.max_id() {
            self.bump(max);
        }
    }

    /// Reserve the next id for `document`.
    ///
    /// Returns `None` once the id space is used up; nothing is reserved then.
    pub fn allocate(&mut self, document: &Document) -> Option<ItemId> {
        let from_document = document.next_id()?;
        let candidate = match self.high_water {
            Some(high) => from_document.max(high.next()?),
            None => from_document,
        };
        self.bump(candidate);
        Some(candidate)
    }

    #[must_use]
    pub fn high_water(&self) -> Option<ItemId> {
        self.high_water
    }

    fn bump(&mut self, id: ItemId) {
        self.high_water = Some(self.high_water.map_or(id, |high| high.max(id)));
    }
}
