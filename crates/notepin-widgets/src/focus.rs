#![forbid(unsafe_code)]

//! Keyboard focus movement between rows.

use notepin_core::{Direction, ItemId};

/// Where the caret lands in the newly focused row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caret {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusTarget {
    pub id: ItemId,
    pub caret: Caret,
}

impl FocusTarget {
    #[must_use]
    pub const fn new(id: ItemId, caret: Caret) -> Self {
        Self { id, caret }
    }
}

/// The row next to `id` in `direction`.
///
/// Moving up puts the caret at the end of the previous row and moving down
/// at the start of the next one, so arrow keys read as continuous text.
/// `None` at either edge or for an unknown id.
#[must_use]
pub fn neighbor(order: &[ItemId], id: ItemId, direction: Direction) -> Option<FocusTarget> {
    let index = order.iter().position(|candidate| *candidate == id)?;
    let target = index.checked_add_signed(direction.offset())?;
    let caret = match direction {
        Direction::Up => Caret::End,
        Direction::Down => Caret::Start,
    };
    order.get(target).map(|next| FocusTarget::new(*next, caret))
}

/// Row to focus after the row at `deleted_index` was removed.
///
/// `order` is the order after removal. Prefers the row that preceded the
/// deleted one, then the first row.
#[must_use]
pub fn after_delete(order: &[ItemId], deleted_index: usize) -> Option<FocusTarget> {
    let previous = deleted_index
        .checked_sub(1)
        .and_then(|index| order.get(index.min(order.len().saturating_sub(1))));
    previous
        .or_else(|| order.first())
        .map(|id| FocusTarget::new(*id, Caret::End))
}
