#![forbid(unsafe_code)]

//! The to-do record and its identifier.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifier of an [`Item`], unique within a document.
///
/// Serialized as a bare integer so stored files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// The id handed out for the first item of an empty document.
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id immediately after this one, or `None` at `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// One to-do entry.
///
/// `created_at` is fixed at construction and only readable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "first_seen")]
    created_at: NaiveDateTime,
}

/// Stamp for stored items that never recorded one: the moment they are read.
fn first_seen() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

impl Item {
    /// Create an empty, unchecked item stamped with `created_at`.
    #[must_use]
    pub fn new(id: ItemId, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            text: String::new(),
            completed: false,
            created_at,
        }
    }

    /// Set the initial text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the initial completion flag.
    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    #[must_use]
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Flip the completion flag, returning the new value.
    pub fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }

    /// True when the text holds nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Number of display lines (at least one).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count().max(1)
    }
}
