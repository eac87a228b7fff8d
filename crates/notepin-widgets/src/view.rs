#![forbid(unsafe_code)]

//! View-side protocol shared by the reconciler and the drag controller.
//!
//! The reconciler never touches toolkit widgets directly. It emits
//! [`ViewOp`]s that a [`ViewHost`] applies to whatever actually draws rows,
//! and it queries the host for row geometry while a drag is running.

use bitflags::bitflags;
use notepin_core::{Item, ItemId};

bitflags! {
    /// Which view-relevant fields an update carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeMask: u8 {
        const TEXT      = 0b001;
        const COMPLETED = 0b010;
        const FONT      = 0b100;
    }
}

/// The view-side record paired 1:1 with an [`Item`] by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    pub id: ItemId,
    pub text: String,
    pub completed: bool,
    pub font_size: u32,
}

impl RenderedItem {
    #[must_use]
    pub fn from_item(item: &Item, font_size: u32) -> Self {
        Self {
            id: item.id,
            text: item.text.clone(),
            completed: item.completed,
            font_size,
        }
    }

    /// Fields that differ between this record and `item` at `font_size`.
    #[must_use]
    pub fn changes_from(&self, item: &Item, font_size: u32) -> ChangeMask {
        let mut mask = ChangeMask::empty();
        if self.text != item.text {
            mask |= ChangeMask::TEXT;
        }
        if self.completed != item.completed {
            mask |= ChangeMask::COMPLETED;
        }
        if self.font_size != font_size {
            mask |= ChangeMask::FONT;
        }
        mask
    }

    /// Bring this record in line with `item`, keeping its identity.
    pub fn refresh(&mut self, item: &Item, font_size: u32) {
        if self.text != item.text {
            self.text.clone_from(&item.text);
        }
        self.completed = item.completed;
        self.font_size = font_size;
    }

    /// Display lines (at least one).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count().max(1)
    }
}

/// Where an attached row goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Immediately before an already attached row.
    Before(ItemId),
    /// At the end of the rows, still ahead of the trailing placeholder.
    Trailer,
}

/// One instruction for the view host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOp {
    /// Build a row; it is not attached yet.
    Create(RenderedItem),
    /// Apply new field values to an existing row in place.
    Update {
        item: RenderedItem,
        changes: ChangeMask,
    },
    /// Tear a row down and drop it from the view.
    Destroy(ItemId),
    /// Take a row out of the layout without destroying it.
    Detach(ItemId),
    /// Put a detached or fresh row into the layout.
    Attach { id: ItemId, anchor: Anchor },
    /// Move the trailing placeholder back to the very end.
    PinTrailer,
    /// Draw the drag insertion line at absolute `y`.
    ShowIndicator { y: i32 },
    /// Remove the drag insertion line.
    HideIndicator,
}

/// Vertical extent of a laid-out row, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowSpan {
    pub top: i32,
    pub height: i32,
}

impl RowSpan {
    #[must_use]
    pub const fn new(top: i32, height: i32) -> Self {
        Self { top, height }
    }

    /// Integer midpoint, `top + height / 2`.
    #[must_use]
    pub const fn midpoint(&self) -> i32 {
        self.top + self.height / 2
    }

    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }
}

/// Receiver of view ops; stands in for the toolkit layer.
pub trait ViewHost {
    /// Apply one op. Ops arrive in the order they must take effect.
    fn apply(&mut self, op: &ViewOp);

    /// Absolute vertical extent of an attached row.
    fn row_span(&self, id: ItemId) -> Option<RowSpan>;

    /// Apply a batch in order.
    fn apply_all(&mut self, ops: &[ViewOp]) {
        for op in ops {
            self.apply(op);
        }
    }
}

impl<H: ViewHost + ?Sized> ViewHost for &mut H {
    fn apply(&mut self, op: &ViewOp) {
        (**self).apply(op);
    }

    fn row_span(&self, id: ItemId) -> Option<RowSpan> {
        (**self).row_span(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(text: &str, completed: bool) -> Item {
        let stamp = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Item::new(ItemId::new(1), stamp)
            .with_text(text)
            .with_completed(completed)
    }

    #[test]
    fn change_mask_names_each_field() {
        let rendered = RenderedItem::from_item(&item("a", false), 13);
        assert!(rendered.changes_from(&item("a", false), 13).is_empty());
        assert_eq!(rendered.changes_from(&item("b", false), 13), ChangeMask::TEXT);
        assert_eq!(
            rendered.changes_from(&item("a", true), 15),
            ChangeMask::COMPLETED | ChangeMask::FONT
        );
    }

    #[test]
    fn refresh_applies_all_fields() {
        let mut rendered = RenderedItem::from_item(&item("a", false), 13);
        rendered.refresh(&item("a\nb", true), 17);
        assert_eq!(rendered.text, "a\nb");
        assert!(rendered.completed);
        assert_eq!(rendered.font_size, 17);
        assert_eq!(rendered.line_count(), 2);
    }

    #[test]
    fn row_span_midpoint_truncates() {
        let span = RowSpan::new(10, 31);
        assert_eq!(span.midpoint(), 25);
        assert_eq!(span.bottom(), 41);
    }
}
