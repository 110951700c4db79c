use std::{cell::Cell, fmt, rc::Rc};

use serde::Serialize;

use crate::ordered_index::IndexKey;

/// Catalog-assigned record identifier
pub type BookId = u32;

/// Shared handle to a record; the sequence and the title index hold clones of
/// the same handle
pub type BookRef = Rc<Book>;

/// Lending status of a book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Availability {
    /// On the shelf
    #[default]
    Available,
    /// Lent out
    Borrowed,
}

impl Availability {
    /// Get a human-readable description of the status
    #[must_use]
    pub fn get_description(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Borrowed => "Borrowed",
        }
    }

    /// The `true`/`false` flag used by the catalog file
    #[must_use]
    pub fn is_available(self) -> bool {
        self == Self::Available
    }

    /// Status matching a persisted availability flag
    #[must_use]
    pub fn from_flag(available: bool) -> Self {
        if available { Self::Available } else { Self::Borrowed }
    }
}

/// A book record.
///
/// Only the availability is mutable. It lives in a [`Cell`] so that a toggle
/// made through one handle is seen through every other clone of the
/// [`BookRef`].
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Unique id, assigned sequentially starting at 1
    id: BookId,
    /// Title, the ordered index key
    title: String,
    /// Author
    author: String,
    /// Current lending status
    availability: Cell<Availability>,
}

impl Book {
    /// Create a book with the given status
    #[must_use]
    pub fn new(id: BookId, title: &str, author: &str, availability: Availability) -> Self {
        Self {
            id,
            title: title.to_string(),
            author: author.to_string(),
            availability: Cell::new(availability),
        }
    }

    /// The record's id
    #[must_use]
    pub fn id(&self) -> BookId {
        self.id
    }

    /// The record's title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The record's author
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Current lending status
    #[must_use]
    pub fn availability(&self) -> Availability {
        self.availability.get()
    }

    /// Whether the book can be borrowed right now
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability().is_available()
    }

    /// Toggle the lending status. Only the catalog calls this.
    pub(crate) fn set_availability(&self, availability: Availability) {
        self.availability.set(availability);
    }
}

impl IndexKey for Book {
    fn index_key(&self) -> &str {
        &self.title
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | Title: {} | Author: {} | Status: {}",
            self.id,
            self.title,
            self.author,
            self.availability().get_description()
        )
    }
}
