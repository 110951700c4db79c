//! Library catalog for tracking books, borrow requests and lending history.
//!
//! This crate provides the catalog service together with the containers it is
//! built from: a growable [`Sequence`], a title-keyed [`OrderedIndex`], a FIFO
//! [`Queue`] and a LIFO [`Stack`].

pub mod book;
pub mod catalog;
pub mod console;
pub mod error;
pub mod events;
pub mod observers;
pub mod ordered_index;
pub mod persistence;
pub mod queue;
pub mod sequence;
pub mod stack;

pub use book::{Availability, Book, BookId, BookRef};
pub use catalog::{Catalog, RequestOutcome, UndoOutcome};
pub use error::{CatalogError, PersistenceError, StructureError};
pub use events::{Action, ActionKind, BorrowRequest};
pub use ordered_index::OrderedIndex;
pub use persistence::LoadPolicy;
pub use queue::Queue;
pub use sequence::Sequence;
pub use stack::Stack;
