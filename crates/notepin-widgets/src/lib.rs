#![forbid(unsafe_code)]

//! View-side machinery for notepin.
//!
//! The document never talks to rows directly. [`Reconciler`] diffs the item
//! list against what is rendered and emits [`ViewOp`]s for a [`ViewHost`];
//! [`DragReorderController`] moves rows live during a drag; [`focus`] picks
//! the row that receives keyboard focus. [`StackView`] is an in-memory host
//! for headless use and tests.

pub mod drag;
pub mod focus;
pub mod headless;
pub mod reconcile;
pub mod view;

pub use drag::{DragOutcome, DragPhase, DragReorderController, insert_index};
pub use focus::{Caret, FocusTarget};
pub use headless::{HostStats, StackView};
pub use reconcile::{AttachStrategy, ReconcileStats, Reconciler, Reconciliation};
pub use view::{Anchor, ChangeMask, RenderedItem, RowSpan, ViewHost, ViewOp};
