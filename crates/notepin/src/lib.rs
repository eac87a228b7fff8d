#![forbid(unsafe_code)]

//! notepin public facade.
//!
//! Re-exports the model, view, and runtime crates and provides [`Board`], the
//! single object that ties a document to its history, view, scheduler, and
//! storage. The `notepin` binary drives a board headlessly from the command
//! line.

pub mod board;
pub mod cli;

use std::fmt;

pub use board::{Board, BoardOptions, BoardTask, HandleRelease};

// --- Core re-exports -------------------------------------------------------

pub use notepin_core::{
    Command, Direction, Document, EditContext, Item, ItemId, Key, KeyChord, Mode,
    Modifiers, Settings, VisibilityMode, WindowGeometry,
};

// --- Widget re-exports -----------------------------------------------------

pub use notepin_widgets::{
    AttachStrategy, Caret, DragOutcome, FocusTarget, Reconciler, RenderedItem, StackView,
    ViewHost, ViewOp,
};

// --- Runtime re-exports ----------------------------------------------------

pub use notepin_runtime::{
    ConfigError, FileStorage, HistoryStore, LoadSource, ManualClock, MemoryStorage,
    MonotonicClock, RuntimeConfig, StorageBackend, StorageError,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for notepin.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no item with id {0}")]
    UnknownItem(ItemId),
    #[error("{0}")]
    Rejected(Rejection),
}

/// Why a well-formed request could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MoveAtEdge { id: ItemId, direction: Direction },
    UnsupportedFontSize(u32),
    IdsExhausted,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveAtEdge { id, direction } => {
                let edge = match direction {
                    Direction::Up => "top",
                    Direction::Down => "bottom",
                };
                write!(f, "item {id} is already at the {edge}")
            }
            Self::UnsupportedFontSize(size) => write!(
                f,
                "font size {size} is not offered (choose one of {:?})",
                notepin_core::FONT_SIZES
            ),
            Self::IdsExhausted => f.write_str("no item ids left"),
        }
    }
}

impl Error {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,
            Self::Storage(_) | Self::Io(_) => 74,
            Self::UnknownItem(_) | Self::Rejected(_) => 2,
        }
    }
}

/// Standard result type for notepin APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Board, BoardOptions, BoardTask, Command, Direction, Document, Error, Item, ItemId,
        Result, StackView, ViewHost,
    };
    pub use crate::{core, runtime, widgets};
}

pub use notepin_core as core;
pub use notepin_runtime as runtime;
pub use notepin_widgets as widgets;
