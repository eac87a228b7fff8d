#![forbid(unsafe_code)]

//! notepin core model.
//!
//! Plain data shared by every other notepin crate: the to-do [`Item`], the
//! persisted [`Document`], pass-through [`Settings`], session-scoped id
//! allocation, and the key chord table.
//!
//! # Role in notepin
//! Nothing here performs I/O or touches a view. The widgets crate
//! reconciles views against a `Document`, and the runtime crate snapshots
//! and persists it.

pub mod document;
pub mod error;
pub mod ids;
pub mod item;
pub mod keymap;
pub mod settings;

pub use document::{Direction, Document};
pub use error::DocumentError;
pub use ids::IdAllocator;
pub use item::{Item, ItemId};
pub use keymap::{Command, EditContext, Key, KeyChord, Modifiers};
pub use settings::{
    DEFAULT_FONT_SIZE, FONT_SIZES, Mode, Settings, VisibilityMode, WindowGeometry,
};
