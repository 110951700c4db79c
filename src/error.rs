//! Error types for the containers, the catalog and the flat-file store.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{book::BookId, events::Action};

/// Failures raised by the hand-built containers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    /// `pop`, `dequeue` or `peek` on a container with no elements
    #[error("{structure} is empty")]
    Empty {
        /// Human-readable name of the container
        structure: &'static str,
    },
    /// Indexed access outside `[0, len)`
    #[error("index {index} out of range for length {len}")]
    OutOfRange {
        /// The requested index
        index: usize,
        /// Number of elements at the time of the call
        len: usize,
    },
}

/// Failures reported by [`crate::Catalog`] operations.
///
/// None of these leave the catalog partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No record carries the given id
    #[error("book with id {id} not found")]
    NotFound {
        /// The id that missed
        id: BookId,
    },
    /// A restored record reuses an id already in the catalog
    #[error("book id {id} is already in use")]
    DuplicateId {
        /// The clashing id
        id: BookId,
    },
    /// `id` is the last representable id, so no id can follow it
    #[error("book id {id} leaves no room for another id")]
    IdsExhausted {
        /// The id without a successor
        id: BookId,
    },
    /// Borrow attempted on a record that is already out
    #[error("book {id} is currently borrowed")]
    AlreadyBorrowed {
        /// The record's id
        id: BookId,
    },
    /// Return attempted on a record that is on the shelf
    #[error("book {id} is not currently borrowed")]
    NotBorrowed {
        /// The record's id
        id: BookId,
    },
    /// The record an undone action referred to was removed; the action is gone
    #[error("book {} no longer exists, cannot undo {action}", .action.book_id)]
    UndoTargetMissing {
        /// The discarded action
        action: Action,
    },
    /// An empty queue or stack
    #[error(transparent)]
    Structure(#[from] StructureError),
}

/// Failures while reading or writing the persisted catalog
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file could not be opened, read or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
    /// A line does not match `<id>,<title>,<author>,<true|false>`
    #[error("malformed record on line {line}: {reason}")]
    Malformed {
        /// One-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },
    /// The JSON snapshot could not be produced
    #[error("failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistenceError {
    /// Wrap an I/O error with the path it happened on
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
