#![forbid(unsafe_code)]

//! The persisted document: ordered items plus settings and window geometry.
//!
//! # Invariants
//!
//! 1. Item ids are pairwise distinct.
//! 2. `items` order is the display and persistence order; there is no sort key.
//!
//! Every mutator here is pure in-memory bookkeeping. A mutator that cannot
//! apply (unknown id, out-of-range swap) declines and reports it through its
//! return value instead of failing.
//!
//! `Clone` is a full structural copy, which is what history snapshots rely on:
//! a cloned document shares no mutable state with its source.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::item::{Item, ItemId};
use crate::settings::{Settings, WindowGeometry};

/// Vertical move direction for swaps and focus moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Signed index offset (`-1` for up, `+1` for down).
    #[must_use]
    pub const fn offset(self) -> isize {
        match self {
            Self::Up => -1,
            Self::Down => 1,
        }
    }

    /// Parse a signed offset; only `-1` and `+1` are directions.
    #[must_use]
    pub const fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -1 => Some(Self::Up),
            1 => Some(Self::Down),
            _ => None,
        }
    }

    fn step(self, index: usize, len: usize) -> Option<usize> {
        let target = index.checked_add_signed(self.offset())?;
        (target < len).then_some(target)
    }
}

/// Items, window geometry, and settings; the unit of persistence and undo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub items: Vec<Item>,
    pub window: WindowGeometry,
    pub settings: Settings,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from items, with default settings and geometry.
    #[must_use]
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Largest id currently present.
    #[must_use]
    pub fn max_id(&self) -> Option<ItemId> {
        self.items.iter().map(|item| item.id).max()
    }

    /// `max id + 1`, or [`ItemId::FIRST`] when empty. `None` once the
    /// largest id is `u64::MAX`.
    #[must_use]
    pub fn next_id(&self) -> Option<ItemId> {
        match self.max_id() {
            Some(max) => max.next(),
            None => Some(ItemId::FIRST),
        }
    }

    #[must_use]
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Insert `item` right after `after`, or append when `after` is `None`
    /// or not present. Returns the index the item landed at.
    pub fn insert_item(&mut self, item: Item, after: Option<ItemId>) -> usize {
        let index = after
            .and_then(|anchor| self.position(anchor))
            .map_or(self.items.len(), |pos| pos + 1);
        self.items.insert(index, item);
        index
    }

    /// Remove by id, returning the former index and the item.
    pub fn remove(&mut self, id: ItemId) -> Option<(usize, Item)> {
        let index = self.position(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Exchange `id` with its neighbour in `direction`. Declines at the edges.
    pub fn swap(&mut self, id: ItemId, direction: Direction) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let Some(target) = direction.step(index, self.items.len()) else {
            return false;
        };
        self.items.swap(index, target);
        true
    }

    /// Flip completion of `id`, returning the new flag.
    pub fn toggle(&mut self, id: ItemId) -> Option<bool> {
        self.get_mut(id).map(Item::toggle)
    }

    /// Replace the text of `id`. Returns `true` only when the text changed.
    pub fn set_text(&mut self, id: ItemId, text: &str) -> bool {
        match self.get_mut(id) {
            Some(item) if item.text != text => {
                item.text = text.to_owned();
                true
            }
            _ => false,
        }
    }

    /// Drop every completed item, returning the removed ids in order.
    pub fn clear_completed(&mut self) -> Vec<ItemId> {
        let removed = self
            .items
            .iter()
            .filter(|item| item.completed)
            .map(|item| item.id)
            .collect();
        self.items.retain(|item| !item.completed);
        removed
    }

    /// Rearrange items to follow `order`.
    ///
    /// Unknown ids in `order` are skipped. Items that `order` does not name
    /// keep their relative order and go after the named ones, so no item is
    /// ever lost. Returns `true` if the order changed.
    pub fn reorder(&mut self, order: &[ItemId]) -> bool {
        let before = self.ids();
        let mut remaining = std::mem::take(&mut self.items);
        let mut arranged = Vec::with_capacity(remaining.len());
        for id in order {
            if let Some(pos) = remaining.iter().position(|item| item.id == *id) {
                arranged.push(remaining.remove(pos));
            }
        }
        arranged.append(&mut remaining);
        self.items = arranged;
        self.ids() != before
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    /// Completed fraction in `[0, 1]`; `0.0` for an empty list.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.items.is_empty() {
            0.0
        } else {
            self.completed_count() as f64 / self.items.len() as f64
        }
    }

    /// Ids that occur more than once, each reported once, in first-repeat order.
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<ItemId> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for item in &self.items {
            if !seen.insert(item.id) && reported.insert(item.id) {
                duplicates.push(item.id);
            }
        }
        duplicates
    }

    /// Keep the first item for each id and drop later repeats.
    ///
    /// Returns the ids of the dropped repeats (one entry per dropped item).
    pub fn dedupe_ids(&mut self) -> Vec<ItemId> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        self.items.retain(|item| {
            if seen.insert(item.id) {
                true
            } else {
                dropped.push(item.id);
                false
            }
        });
        dropped
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> Result<(), DocumentError> {
        match self.duplicate_ids().first() {
            Some(id) => Err(DocumentError::DuplicateId(*id)),
            None => Ok(()),
        }
    }
}
