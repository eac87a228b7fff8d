#![forbid(unsafe_code)]

//! Headless [`ViewHost`] that keeps a vertical stack of rows in memory.
//!
//! `StackView` is what the CLI and the tests run against. It mirrors a
//! toolkit's pack-style layout closely enough to check ordering, in-place
//! updates, and drag geometry without any window system.
//!
//! Row heights derive from the line count and font size, so multi-line
//! items are taller and drag midpoints move accordingly.

use ahash::AHashMap;
use notepin_core::ItemId;

use crate::view::{Anchor, RenderedItem, RowSpan, ViewHost, ViewOp};

/// Vertical padding added to every row.
pub const ROW_PADDING: i32 = 6;
/// Gap between consecutive rows.
pub const ROW_GAP: i32 = 2;

/// Line height for a font size in points.
#[must_use]
pub const fn line_height(font_size: u32) -> i32 {
    let size = if font_size > 512 { 512 } else { font_size as i32 };
    size + size / 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Row(ItemId),
    Trailer,
}

/// Op counters, useful for asserting minimal churn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    pub created: u64,
    pub updated: u64,
    pub destroyed: u64,
    pub attaches: u64,
    pub detaches: u64,
    pub trailer_pins: u64,
    /// Ops that referenced a row the view does not hold.
    pub ignored: u64,
}

/// In-memory stack of rows followed by the trailing placeholder.
#[derive(Debug, Clone)]
pub struct StackView {
    rows: AHashMap<ItemId, RenderedItem>,
    layout: Vec<Slot>,
    indicator: Option<i32>,
    origin: i32,
    stats: HostStats,
}

impl Default for StackView {
    fn default() -> Self {
        Self::new()
    }
}

impl StackView {
    #[must_use]
    pub fn new() -> Self {
        Self::with_origin(0)
    }

    /// Stack whose first row starts at absolute `origin`.
    #[must_use]
    pub fn with_origin(origin: i32) -> Self {
        Self {
            rows: AHashMap::new(),
            layout: vec![Slot::Trailer],
            indicator: None,
            origin,
            stats: HostStats::default(),
        }
    }

    /// Attached row ids, top to bottom.
    #[must_use]
    pub fn packed_order(&self) -> Vec<ItemId> {
        self.layout
            .iter()
            .filter_map(|slot| match slot {
                Slot::Row(id) => Some(*id),
                Slot::Trailer => None,
            })
            .collect()
    }

    /// Attached rows, top to bottom.
    pub fn packed_rows(&self) -> impl Iterator<Item = &RenderedItem> + '_ {
        self.layout.iter().filter_map(|slot| match slot {
            Slot::Row(id) => self.rows.get(id),
            Slot::Trailer => None,
        })
    }

    #[must_use]
    pub fn trailer_is_last(&self) -> bool {
        self.layout.last() == Some(&Slot::Trailer)
    }

    #[must_use]
    pub fn row(&self, id: ItemId) -> Option<&RenderedItem> {
        self.rows.get(&id)
    }

    /// Rows alive in the view, attached or not.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_attached(&self, id: ItemId) -> bool {
        self.layout.contains(&Slot::Row(id))
    }

    /// Y of the drag insertion line, if shown.
    #[must_use]
    pub fn indicator(&self) -> Option<i32> {
        self.indicator
    }

    #[must_use]
    pub fn stats(&self) -> HostStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = HostStats::default();
    }

    fn row_height(row: &RenderedItem) -> i32 {
        let lines = i32::try_from(row.line_count()).unwrap_or(i32::MAX);
        lines
            .saturating_mul(line_height(row.font_size))
            .saturating_add(ROW_PADDING)
    }

    fn slot_of(&self, id: ItemId) -> Option<usize> {
        self.layout.iter().position(|slot| *slot == Slot::Row(id))
    }

    fn trailer_slot(&self) -> usize {
        self.layout
            .iter()
            .position(|slot| *slot == Slot::Trailer)
            .unwrap_or(self.layout.len())
    }

    fn attach(&mut self, id: ItemId, anchor: Anchor) {
        if !self.rows.contains_key(&id) {
            self.stats.ignored += 1;
            return;
        }
        if let Some(slot) = self.slot_of(id) {
            self.layout.remove(slot);
        }
        let index = match anchor {
            Anchor::Before(next) => self.slot_of(next).unwrap_or_else(|| self.trailer_slot()),
            Anchor::Trailer => self.trailer_slot(),
        };
        self.layout.insert(index, Slot::Row(id));
        self.stats.attaches += 1;
    }
}

impl ViewHost for StackView {
    fn apply(&mut self, op: &ViewOp) {
        match op {
            ViewOp::Create(row) => {
                self.rows.insert(row.id, row.clone());
                self.stats.created += 1;
            }
            ViewOp::Update { item, .. } => match self.rows.get_mut(&item.id) {
                Some(row) => {
                    row.clone_from(item);
                    self.stats.updated += 1;
                }
                None => self.stats.ignored += 1,
            },
            ViewOp::Destroy(id) => {
                if self.rows.remove(id).is_some() {
                    self.layout.retain(|slot| *slot != Slot::Row(*id));
                    self.stats.destroyed += 1;
                } else {
                    self.stats.ignored += 1;
                }
            }
            ViewOp::Detach(id) => {
                if let Some(slot) = self.slot_of(*id) {
                    self.layout.remove(slot);
                    self.stats.detaches += 1;
                }
            }
            ViewOp::Attach { id, anchor } => self.attach(*id, *anchor),
            ViewOp::PinTrailer => {
                self.layout.retain(|slot| *slot != Slot::Trailer);
                self.layout.push(Slot::Trailer);
                self.stats.trailer_pins += 1;
            }
            ViewOp::ShowIndicator { y } => self.indicator = Some(*y),
            ViewOp::HideIndicator => self.indicator = None,
        }
    }

    fn row_span(&self, id: ItemId) -> Option<RowSpan> {
        let mut top = self.origin;
        for slot in &self.layout {
            let Slot::Row(current) = slot else {
                continue;
            };
            let row = self.rows.get(current)?;
            let height = Self::row_height(row);
            if *current == id {
                return Some(RowSpan::new(top, height));
            }
            top = top.saturating_add(height).saturating_add(ROW_GAP);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, text: &str) -> RenderedItem {
        RenderedItem {
            id: ItemId::new(id),
            text: text.into(),
            completed: false,
            font_size: 12,
        }
    }

    fn id(raw: u64) -> ItemId {
        ItemId::new(raw)
    }

    fn filled(raw: &[u64]) -> StackView {
        let mut view = StackView::new();
        for n in raw {
            view.apply(&ViewOp::Create(row(*n, "x")));
            view.apply(&ViewOp::Attach {
                id: id(*n),
                anchor: Anchor::Trailer,
            });
        }
        view.apply(&ViewOp::PinTrailer);
        view
    }

    #[test]
    fn created_rows_are_not_attached_until_asked() {
        let mut view = StackView::new();
        view.apply(&ViewOp::Create(row(1, "a")));
        assert!(view.packed_order().is_empty());
        assert_eq!(view.row_count(), 1);
        assert!(view.row_span(id(1)).is_none());
    }

    #[test]
    fn attach_before_anchor_and_at_trailer() {
        let mut view = filled(&[1, 2]);
        view.apply(&ViewOp::Create(row(3, "")));
        view.apply(&ViewOp::Attach {
            id: id(3),
            anchor: Anchor::Before(id(2)),
        });
        assert_eq!(view.packed_order(), vec![id(1), id(3), id(2)]);
        assert!(view.trailer_is_last());
    }

    #[test]
    fn destroy_removes_from_layout() {
        let mut view = filled(&[1, 2, 3]);
        view.apply(&ViewOp::Destroy(id(2)));
        assert_eq!(view.packed_order(), vec![id(1), id(3)]);
        view.apply(&ViewOp::Destroy(id(2)));
        assert_eq!(view.stats().ignored, 1);
    }

    #[test]
    fn update_replaces_fields_in_place() {
        let mut view = filled(&[1]);
        let mut changed = row(1, "two\nlines");
        changed.completed = true;
        view.apply(&ViewOp::Update {
            item: changed.clone(),
            changes: crate::view::ChangeMask::TEXT | crate::view::ChangeMask::COMPLETED,
        });
        assert_eq!(view.row(id(1)), Some(&changed));
        assert_eq!(view.stats().created, 1);
    }

    #[test]
    fn spans_stack_with_gap() {
        let mut view = filled(&[1, 2]);
        // 12pt → 18px lines; one line + padding = 24.
        assert_eq!(view.row_span(id(1)), Some(RowSpan::new(0, 24)));
        assert_eq!(view.row_span(id(2)), Some(RowSpan::new(26, 24)));

        view.apply(&ViewOp::Update {
            item: row(1, "a\nb"),
            changes: crate::view::ChangeMask::TEXT,
        });
        assert_eq!(view.row_span(id(1)), Some(RowSpan::new(0, 42)));
        assert_eq!(view.row_span(id(2)), Some(RowSpan::new(44, 24)));
    }

    #[test]
    fn origin_offsets_every_row() {
        let mut view = StackView::with_origin(40);
        view.apply(&ViewOp::Create(row(1, "a")));
        view.apply(&ViewOp::Attach {
            id: id(1),
            anchor: Anchor::Trailer,
        });
        assert_eq!(view.row_span(id(1)).map(|s| s.top), Some(40));
    }

    #[test]
    fn indicator_show_hide() {
        let mut view = StackView::new();
        view.apply(&ViewOp::ShowIndicator { y: 12 });
        assert_eq!(view.indicator(), Some(12));
        view.apply(&ViewOp::HideIndicator);
        assert_eq!(view.indicator(), None);
    }

    #[test]
    fn attach_of_unknown_row_is_ignored() {
        let mut view = StackView::new();
        view.apply(&ViewOp::Attach {
            id: id(7),
            anchor: Anchor::Trailer,
        });
        assert!(view.packed_order().is_empty());
        assert_eq!(view.stats().ignored, 1);
    }
}
