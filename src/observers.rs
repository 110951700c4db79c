use std::{cell::RefCell, rc::Rc};

use tracing::info;

use crate::{
    book::{Availability, Book, BookId},
    events::Action,
};

/// Trait for lending change observation
pub trait LendingObserver {
    /// Called after a book's availability changed because of `action`.
    ///
    /// `undone` is true when the change reverted `action` rather than
    /// applying it.
    fn on_lending_change(&self, book: &Book, action: &Action, undone: bool);
}

/// Logs all lending changes through `tracing`
#[derive(Debug)]
pub struct TransitionLogger;

impl LendingObserver for TransitionLogger {
    fn on_lending_change(&self, book: &Book, action: &Action, undone: bool) {
        let verb = if undone { "undone" } else { "applied" };
        info!(
            book_id = book.id(),
            title = book.title(),
            requester = %action.requester,
            "{} {verb}, book is now {}",
            action.kind,
            book.availability().get_description()
        );
    }
}

/// One notification captured by [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingNotice {
    /// The book that changed
    pub book_id: BookId,
    /// Its availability after the change
    pub availability: Availability,
    /// The action applied or reverted
    pub action: Action,
    /// Whether the action was reverted
    pub undone: bool,
}

/// Keeps every notification it receives; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Shared notification log
    log: Rc<RefCell<Vec<LendingNotice>>>,
}

impl RecordingObserver {
    /// Create an observer with an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, oldest first
    #[must_use]
    pub fn notices(&self) -> Vec<LendingNotice> {
        self.log.borrow().clone()
    }
}

impl LendingObserver for RecordingObserver {
    fn on_lending_change(&self, book: &Book, action: &Action, undone: bool) {
        self.log.borrow_mut().push(LendingNotice {
            book_id: book.id(),
            availability: book.availability(),
            action: action.clone(),
            undone,
        });
    }
}
