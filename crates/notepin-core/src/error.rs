#![forbid(unsafe_code)]

use std::fmt;

use crate::item::ItemId;

/// A document that breaks a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Two or more items share this id.
    DuplicateId(ItemId),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate item id {id}"),
        }
    }
}

impl std::error::Error for DocumentError {}
