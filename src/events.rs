use std::fmt;

use serde::Serialize;

use crate::book::{Availability, BookId};

/// Kinds of reversible lending actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionKind {
    /// A book was lent out
    Borrow,
    /// A book came back
    Return,
}

impl ActionKind {
    /// Availability of the book once the action has been applied
    #[must_use]
    pub fn resulting_state(self) -> Availability {
        match self {
            Self::Borrow => Availability::Borrowed,
            Self::Return => Availability::Available,
        }
    }

    /// Availability restored by undoing the action
    #[must_use]
    pub fn undone_state(self) -> Availability {
        match self {
            Self::Borrow => Availability::Available,
            Self::Return => Availability::Borrowed,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Borrow => "BORROW",
            Self::Return => "RETURN",
        })
    }
}

/// A completed borrow or return, kept on the undo stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// What happened
    pub kind: ActionKind,
    /// The book it happened to
    pub book_id: BookId,
    /// Who did it
    pub requester: String,
}

impl Action {
    /// Create an action record
    #[must_use]
    pub fn new(kind: ActionKind, book_id: BookId, requester: &str) -> Self {
        Self { kind, book_id, requester: requester.to_string() }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - Book ID: {} by {}", self.kind, self.book_id, self.requester)
    }
}

/// A queued intent to borrow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowRequest {
    /// Who is waiting
    pub requester: String,
    /// The book they want
    pub book_id: BookId,
}

impl BorrowRequest {
    /// Create a request
    #[must_use]
    pub fn new(requester: &str, book_id: BookId) -> Self {
        Self { requester: requester.to_string(), book_id }
    }
}

impl fmt::Display for BorrowRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User: {} | Book ID: {}", self.requester, self.book_id)
    }
}
