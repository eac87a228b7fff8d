#![forbid(unsafe_code)]

//! Minimal-churn reconciliation of rendered rows against document items.
//!
//! [`Reconciler`] owns the view-side map (`id → RenderedItem`) and the
//! current view order. Given the new item list it works out which rows to
//! create, update in place, and destroy, and how to attach them so the
//! layout ends up in document order while moving as few rows as possible.
//!
//! # Attach strategy
//!
//! Chosen in priority order:
//!
//! ```text
//! order_changed || force   → FullRepack   detach every kept row, attach all in order
//! every row is new         → InitialFill  attach all in order
//! some rows are new        → Interleave   attach each new row before the next kept row
//! otherwise                → Untouched    destroys already fixed adjacency
//! ```
//!
//! `order_changed` compares only the ids present both before and after, so
//! inserting or deleting rows never forces a full repack by itself.
//!
//! # Invariants
//!
//! 1. A row whose id survives is never destroyed and recreated; field changes
//!    are delivered as [`ViewOp::Update`] with a [`ChangeMask`].
//! 2. After the ops are applied, the host's row order equals the item order.
//! 3. [`ViewOp::PinTrailer`] is always the last op of a pass.
//!
//! Input ids must be unique. That is a document invariant and is not checked
//! here.

use ahash::{AHashMap, AHashSet};
use notepin_core::{Item, ItemId};

use crate::view::{Anchor, ChangeMask, RenderedItem, ViewHost, ViewOp};

/// How rows were (re)attached in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachStrategy {
    FullRepack,
    InitialFill,
    Interleave,
    Untouched,
}

impl AttachStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullRepack => "full_repack",
            Self::InitialFill => "initial_fill",
            Self::Interleave => "interleave",
            Self::Untouched => "untouched",
        }
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Row order after the pass; equals the input item order.
    pub order: Vec<ItemId>,
    pub created: Vec<ItemId>,
    /// Kept rows whose fields changed.
    pub updated: Vec<ItemId>,
    /// Removed rows, in their old view order.
    pub destroyed: Vec<ItemId>,
    pub order_changed: bool,
    pub strategy: AttachStrategy,
    /// Ops for the host, in application order.
    pub ops: Vec<ViewOp>,
}

impl Reconciliation {
    /// True when nothing but the trailer pin was emitted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.destroyed.is_empty()
            && self.strategy == AttachStrategy::Untouched
    }

    /// Number of attach ops in the pass.
    #[must_use]
    pub fn attach_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, ViewOp::Attach { .. }))
            .count()
    }
}

/// Running totals across passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub passes: u64,
    pub full_repacks: u64,
    pub created: u64,
    pub updated: u64,
    pub destroyed: u64,
    pub relocations: u64,
}

/// Owner of the rendered rows and their view order.
#[derive(Debug, Default)]
pub struct Reconciler {
    rendered: AHashMap<ItemId, RenderedItem>,
    order: Vec<ItemId>,
    stats: ReconcileStats,
}

impl Reconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current view order.
    #[must_use]
    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    #[must_use]
    pub fn rendered(&self, id: ItemId) -> Option<&RenderedItem> {
        self.rendered.get(&id)
    }

    #[must_use]
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    /// Compute a pass and apply it to `host`.
    pub fn reconcile<H: ViewHost + ?Sized>(
        &mut self,
        items: &[Item],
        font_size: u32,
        force_full_repack: bool,
        host: &mut H,
    ) -> Reconciliation {
        let pass = self.plan(items, font_size, force_full_repack);
        host.apply_all(&pass.ops);
        pass
    }

    /// Compute a pass and update the rendered model, without a host.
    ///
    /// The caller is responsible for delivering `ops` to the view.
    pub fn plan(&mut self, items: &[Item], font_size: u32, force_full_repack: bool) -> Reconciliation {
        let old_order = std::mem::take(&mut self.order);
        let mut previous = std::mem::take(&mut self.rendered);

        let mut order = Vec::with_capacity(items.len());
        let mut rendered = AHashMap::with_capacity(items.len());
        let mut created = Vec::new();
        let mut updated = Vec::new();
        let mut update_ops = Vec::new();
        let mut create_ops = Vec::new();

        for item in items {
            match previous.remove(&item.id) {
                Some(mut row) => {
                    let changes = row.changes_from(item, font_size);
                    if !changes.is_empty() {
                        row.refresh(item, font_size);
                        updated.push(item.id);
                        update_ops.push(ViewOp::Update {
                            item: row.clone(),
                            changes,
                        });
                    }
                    rendered.insert(item.id, row);
                }
                None => {
                    let row = RenderedItem::from_item(item, font_size);
                    create_ops.push(ViewOp::Create(row.clone()));
                    created.push(item.id);
                    rendered.insert(item.id, row);
                }
            }
            order.push(item.id);
        }

        // Whatever is left in `previous` has no item any more.
        let destroyed: Vec<ItemId> = old_order
            .iter()
            .copied()
            .filter(|id| previous.contains_key(id))
            .collect();

        let fresh: AHashSet<ItemId> = created.iter().copied().collect();
        let order_changed = !old_order
            .iter()
            .filter(|id| !previous.contains_key(*id))
            .eq(order.iter().filter(|id| !fresh.contains(*id)));

        let strategy = if order_changed || force_full_repack {
            AttachStrategy::FullRepack
        } else if !created.is_empty() && created.len() == order.len() {
            AttachStrategy::InitialFill
        } else if !created.is_empty() {
            AttachStrategy::Interleave
        } else {
            AttachStrategy::Untouched
        };

        let mut ops =
            Vec::with_capacity(destroyed.len() + update_ops.len() + create_ops.len() * 2 + 1);
        ops.extend(destroyed.iter().map(|id| ViewOp::Destroy(*id)));
        ops.extend(update_ops);
        ops.extend(create_ops);
        match strategy {
            AttachStrategy::FullRepack => {
                ops.extend(
                    order
                        .iter()
                        .filter(|id| !fresh.contains(*id))
                        .map(|id| ViewOp::Detach(*id)),
                );
                ops.extend(order.iter().map(|id| ViewOp::Attach {
                    id: *id,
                    anchor: Anchor::Trailer,
                }));
            }
            AttachStrategy::InitialFill => {
                ops.extend(order.iter().map(|id| ViewOp::Attach {
                    id: *id,
                    anchor: Anchor::Trailer,
                }));
            }
            AttachStrategy::Interleave => ops.extend(interleave_attaches(&order, &fresh)),
            AttachStrategy::Untouched => {}
        }
        ops.push(ViewOp::PinTrailer);

        self.stats.passes += 1;
        self.stats.created += created.len() as u64;
        self.stats.updated += updated.len() as u64;
        self.stats.destroyed += destroyed.len() as u64;
        if strategy == AttachStrategy::FullRepack {
            self.stats.full_repacks += 1;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "notepin.reconcile",
            strategy = strategy.as_str(),
            rows = order.len(),
            created = created.len(),
            updated = updated.len(),
            destroyed = destroyed.len(),
            order_changed,
            "reconcile pass"
        );

        self.order.clone_from(&order);
        self.rendered = rendered;

        Reconciliation {
            order,
            created,
            updated,
            destroyed,
            order_changed,
            strategy,
            ops,
        }
    }

    /// Move a rendered row for a live drag.
    ///
    /// `insert_index` is a slot in the current order, counting the dragged
    /// row itself. Slots `current` and `current + 1` leave the row where it
    /// is and are declined. Otherwise the row is re-attached before the row
    /// now at `insert_index` (or at the trailer) and lands at
    /// `insert_index`, or `insert_index - 1` when moving down.
    pub fn relocate<H: ViewHost + ?Sized>(
        &mut self,
        id: ItemId,
        insert_index: usize,
        host: &mut H,
    ) -> bool {
        let Some(current) = self.index_of(id) else {
            return false;
        };
        let insert_index = insert_index.min(self.order.len());
        if insert_index == current || insert_index == current + 1 {
            return false;
        }

        let anchor = self
            .order
            .get(insert_index)
            .map_or(Anchor::Trailer, |next| Anchor::Before(*next));
        host.apply(&ViewOp::Detach(id));
        host.apply(&ViewOp::Attach { id, anchor });

        self.order.remove(current);
        let target = if insert_index <= current {
            insert_index
        } else {
            insert_index - 1
        };
        self.order.insert(target, id);
        self.stats.relocations += 1;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "notepin.reconcile",
            id = id.get(),
            from = current,
            to = target,
            "row relocated"
        );
        true
    }
}

/// Attach ops for new rows slotted between kept rows.
///
/// Each new row goes before the nearest following kept row, or at the
/// trailer when no kept row follows. Ops come out in order so runs of new
/// rows keep their relative order.
fn interleave_attaches(order: &[ItemId], fresh: &AHashSet<ItemId>) -> Vec<ViewOp> {
    let mut anchors = Vec::with_capacity(fresh.len());
    let mut next_kept = Anchor::Trailer;
    for id in order.iter().rev() {
        if fresh.contains(id) {
            anchors.push(ViewOp::Attach {
                id: *id,
                anchor: next_kept,
            });
        } else {
            next_kept = Anchor::Before(*id);
        }
    }
    anchors.reverse();
    anchors
}
