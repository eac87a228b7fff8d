#![forbid(unsafe_code)]

//! Undo/redo over whole-document snapshots.
//!
//! - [`history_store`]: bounded snapshot list with a cursor

pub mod history_store;

pub use history_store::{HistoryConfig, HistoryStore, MAX_HISTORY_SIZE};
