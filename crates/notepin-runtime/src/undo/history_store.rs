#![forbid(unsafe_code)]

//! Bounded, branch-discarding snapshot history.
//!
//! [`HistoryStore`] keeps full-state snapshots in one list and moves a cursor
//! over them. Undo and redo only move the cursor; a push after an undo cuts
//! the redo branch off before appending.
//!
//! # Architecture
//!
//! ```text
//! push(s3)
//! ┌─────────────────────────────────────┐
//! │ entries: [s0, s1, s2, s3]           │
//! │ cursor:                   ^         │
//! └─────────────────────────────────────┘
//!
//! undo() x2
//! ┌─────────────────────────────────────┐
//! │ entries: [s0, s1, s2, s3]           │
//! │ cursor:       ^                     │
//! └─────────────────────────────────────┘
//!
//! push(s4), redo branch [s2, s3] discarded
//! ┌─────────────────────────────────────┐
//! │ entries: [s0, s1, s4]               │
//! │ cursor:           ^                 │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Memory Model
//!
//! Entries are owned values. `undo`/`redo` hand out clones, so callers can
//! mutate what they get back without touching the stored entry. At capacity
//! the oldest entry is evicted and the cursor shifts down with it.

use std::collections::VecDeque;
use std::fmt;

/// Number of snapshots kept by default.
pub const MAX_HISTORY_SIZE: usize = 20;

/// Configuration for the history store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of entries; the oldest is evicted beyond this.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_HISTORY_SIZE,
        }
    }
}

impl HistoryConfig {
    /// A configuration with the given depth. Zero is raised to one so the
    /// current state is always retained.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// No eviction (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// Snapshot list plus cursor.
///
/// # Invariants
///
/// 1. `cursor` is `None` iff `entries` is empty, else `cursor < entries.len()`.
/// 2. `entries.len() <= config.max_depth` after every operation.
/// 3. After `push`, the cursor sits on the last entry.
/// 4. `undo`/`redo` never change `entries`.
pub struct HistoryStore<T> {
    entries: VecDeque<T>,
    cursor: Option<usize>,
    config: HistoryConfig,
}

impl<T> fmt::Debug for HistoryStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStore")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Default for HistoryStore<T> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<T> HistoryStore<T> {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            config: HistoryConfig::new(config.max_depth),
        }
    }

    /// Append `snapshot` as the newest entry, discarding any redo branch.
    pub fn push(&mut self, snapshot: T) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        let discarded = self.entries.len().saturating_sub(keep);
        self.entries.truncate(keep);

        let mut evicted = 0usize;
        while self.entries.len() >= self.config.max_depth {
            self.entries.pop_front();
            evicted += 1;
        }
        self.entries.push_back(snapshot);
        self.cursor = Some(self.entries.len() - 1);

        tracing::trace!(
            target: "notepin.history",
            len = self.entries.len(),
            discarded,
            evicted,
            "history push"
        );
    }

    /// The entry under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    /// Cursor position; `None` when empty.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    /// Steps available to undo.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    /// Steps available to redo.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.cursor
            .map_or(0, |cursor| self.entries.len() - cursor - 1)
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Drop everything and start over from `baseline`.
    pub fn reset(&mut self, baseline: T) {
        self.clear();
        self.push(baseline);
    }
}

impl<T: Clone> HistoryStore<T> {
    /// Step back one entry and return a copy of it.
    pub fn undo(&mut self) -> Option<T> {
        let cursor = self.cursor.filter(|cursor| *cursor > 0)? - 1;
        self.cursor = Some(cursor);
        tracing::debug!(target: "notepin.history", cursor, len = self.entries.len(), "undo");
        self.entries.get(cursor).cloned()
    }

    /// Step forward one entry and return a copy of it.
    pub fn redo(&mut self) -> Option<T> {
        let cursor = self.cursor? + 1;
        if cursor >= self.entries.len() {
            return None;
        }
        self.cursor = Some(cursor);
        tracing::debug!(target: "notepin.history", cursor, len = self.entries.len(), "redo");
        self.entries.get(cursor).cloned()
    }
}
