#![forbid(unsafe_code)]

//! Live drag reordering of rendered rows.
//!
//! # State Machine
//!
//! ```text
//! Idle ──begin──▶ Dragging ──end──▶ Idle
//!                   │   ▲
//!                   └───┘ update (relocate rows, move indicator)
//! ```
//!
//! While dragging, only the view moves: rows are relocated through
//! [`Reconciler::relocate`] and the document is left alone. On `end` the
//! controller reports the final view order and the caller decides whether
//! the document changed.
//!
//! # Invariants
//!
//! 1. At most one drag is active.
//! 2. The insertion scan covers every row in view order, the dragged row
//!    included; the first row whose midpoint lies below the pointer wins.
//! 3. Slots `current` and `current + 1` never move the row.
//! 4. Every `end` hides the indicator.

use notepin_core::ItemId;

use crate::reconcile::Reconciler;
use crate::view::{ViewHost, ViewOp};

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDrag {
    pub id: ItemId,
    pub origin_index: usize,
    pub relocations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

/// What a finished drag did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOutcome {
    pub id: ItemId,
    pub origin_index: usize,
    pub final_index: usize,
    /// View order after the drop.
    pub order: Vec<ItemId>,
    pub relocations: usize,
}

impl DragOutcome {
    /// Whether the dragged row ended somewhere else.
    #[must_use]
    pub fn moved(&self) -> bool {
        self.origin_index != self.final_index
    }
}

/// Slot the pointer at `pointer_y` would drop into.
///
/// Returns the first index whose row midpoint is below `pointer_y`, or
/// `order.len()` when the pointer is past every midpoint. Rows without a
/// span are skipped.
#[must_use]
pub fn insert_index<H: ViewHost + ?Sized>(order: &[ItemId], pointer_y: i32, host: &H) -> usize {
    order
        .iter()
        .position(|id| {
            host.row_span(*id)
                .is_some_and(|span| pointer_y < span.midpoint())
        })
        .unwrap_or(order.len())
}

/// Where the insertion line goes for `slot`: top of that row, or the bottom
/// of the last row when dropping at the end. `None` when the slot is the
/// dragged row itself; the line then stays where it was.
fn indicator_y<H: ViewHost + ?Sized>(
    order: &[ItemId],
    slot: usize,
    dragged: ItemId,
    host: &H,
) -> Option<i32> {
    match order.get(slot) {
        Some(id) if *id == dragged => None,
        Some(id) => host.row_span(*id).map(|span| span.top),
        None => order
            .last()
            .and_then(|id| host.row_span(*id))
            .map(|span| span.bottom()),
    }
}

/// Drag state machine over a [`Reconciler`]'s rendered order.
#[derive(Debug, Clone, Default)]
pub struct DragReorderController {
    phase: DragPhase,
}

impl DragReorderController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    #[must_use]
    pub fn active_id(&self) -> Option<ItemId> {
        match self.phase {
            DragPhase::Dragging(active) => Some(active.id),
            DragPhase::Idle => None,
        }
    }

    /// Start dragging `id`. Declines while another drag is active or when
    /// `id` is not rendered.
    pub fn begin(&mut self, id: ItemId, reconciler: &Reconciler) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(origin_index) = reconciler.index_of(id) else {
            return false;
        };
        self.phase = DragPhase::Dragging(ActiveDrag {
            id,
            origin_index,
            relocations: 0,
        });
        true
    }

    /// Track the pointer. Returns the computed insertion slot, or `None`
    /// when `id` is not the row being dragged.
    pub fn update<H: ViewHost + ?Sized>(
        &mut self,
        id: ItemId,
        pointer_y: i32,
        reconciler: &mut Reconciler,
        host: &mut H,
    ) -> Option<usize> {
        let DragPhase::Dragging(active) = &mut self.phase else {
            return None;
        };
        if active.id != id {
            return None;
        }

        let slot = insert_index(reconciler.order(), pointer_y, host);
        if let Some(y) = indicator_y(reconciler.order(), slot, id, host) {
            host.apply(&ViewOp::ShowIndicator { y });
        }
        if reconciler.relocate(id, slot, host) {
            active.relocations += 1;
            // Geometry moved with the row; redraw the line where it now belongs.
            let settled = insert_index(reconciler.order(), pointer_y, host);
            if let Some(y) = indicator_y(reconciler.order(), settled, id, host) {
                host.apply(&ViewOp::ShowIndicator { y });
            }
        }
        Some(slot)
    }

    /// Finish the active drag, whatever `id` says.
    ///
    /// A mismatched `id` still ends the active drag so the controller can
    /// never get stuck in `Dragging`. Returns `None` when idle.
    pub fn end<H: ViewHost + ?Sized>(
        &mut self,
        id: ItemId,
        reconciler: &Reconciler,
        host: &mut H,
    ) -> Option<DragOutcome> {
        let DragPhase::Dragging(active) = std::mem::take(&mut self.phase) else {
            return None;
        };
        host.apply(&ViewOp::HideIndicator);
        #[cfg(feature = "tracing")]
        if active.id != id {
            tracing::debug!(
                target: "notepin.reconcile",
                active = active.id.get(),
                requested = id.get(),
                "drag ended with a different row id"
            );
        }
        #[cfg(not(feature = "tracing"))]
        let _ = id;

        let order = reconciler.order().to_vec();
        let final_index = reconciler.index_of(active.id).unwrap_or(active.origin_index);
        Some(DragOutcome {
            id: active.id,
            origin_index: active.origin_index,
            final_index,
            order,
            relocations: active.relocations,
        })
    }
}
