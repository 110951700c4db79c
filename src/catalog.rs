use std::{collections::HashSet, fmt, rc::Rc};

use tracing::{debug, info, warn};

use crate::{
    book::{Availability, Book, BookId, BookRef},
    error::CatalogError,
    events::{Action, ActionKind, BorrowRequest},
    observers::LendingObserver,
    ordered_index::OrderedIndex,
    queue::{self, Queue},
    sequence::Sequence,
    stack::Stack,
};

/// What [`Catalog::process_next_request`] did with the front request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The book was available and is now lent to the requester
    Fulfilled {
        /// The consumed request
        request: BorrowRequest,
        /// The book, now borrowed
        book: BookRef,
    },
    /// The book is out; the same request went back to the rear of the queue
    Requeued {
        /// The re-enqueued request
        request: BorrowRequest,
        /// The book that is still borrowed
        book: BookRef,
    },
    /// The book was removed after the request was made; the request is dropped
    Discarded {
        /// The dropped request
        request: BorrowRequest,
    },
}

/// Result of a successful [`Catalog::undo_last`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    /// The action that was reverted
    pub action: Action,
    /// The book, with its availability restored
    pub book: BookRef,
}

/// The library catalog.
///
/// Records live in two indices at once: a [`Sequence`] in insertion order and
/// an [`OrderedIndex`] by title. Both hold clones of the same [`BookRef`]s,
/// and every public method leaves them describing the same set of records.
/// Pending borrow requests wait in a [`Queue`]; completed borrows and returns
/// are kept on a [`Stack`] for undo.
pub struct Catalog {
    /// Records in insertion order
    books: Sequence<BookRef>,
    /// The same records ordered by title
    by_title: OrderedIndex<Book>,
    /// Borrow requests waiting to be processed
    requests: Queue<BorrowRequest>,
    /// Completed actions, most recent on top
    actions: Stack<Action>,
    /// Ids of every stored record
    ids: HashSet<BookId>,
    /// Id given to the next added record
    next_id: BookId,
    /// Registered lending observers
    observers: Vec<Box<dyn LendingObserver>>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("books", &self.books)
            .field("requests", &self.requests)
            .field("actions", &self.actions)
            .field("next_id", &self.next_id)
            .field("observers_count", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create an empty catalog; the first added book gets id 1
    #[must_use]
    pub fn new() -> Self {
        Self {
            books: Sequence::new(),
            by_title: OrderedIndex::new(),
            requests: Queue::new(),
            actions: Stack::new(),
            ids: HashSet::new(),
            next_id: 1,
            observers: Vec::new(),
        }
    }

    /// Register an observer to be notified of lending changes
    pub fn register_observer(&mut self, observer: Box<dyn LendingObserver>) {
        self.observers.push(observer);
    }

    /// Put a record into both indices
    fn index(&mut self, book: &BookRef) {
        self.ids.insert(book.id());
        self.books.push(Rc::clone(book));
        self.by_title.insert(Rc::clone(book));
    }

    /// Add a new, available book and return it
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::IdsExhausted` if the next id would be the last
    /// representable one; nothing is changed in that case
    pub fn add_book(&mut self, title: &str, author: &str) -> Result<BookRef, CatalogError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(CatalogError::IdsExhausted { id })?;
        let book = Rc::new(Book::new(id, title, author, Availability::Available));
        self.index(&book);
        info!(book_id = id, title, author, "book added");
        Ok(book)
    }

    /// Insert a record that already has an id, such as one read back from
    /// disk. The next id is advanced past it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if a record with the same id
    /// exists, or `CatalogError::IdsExhausted` if the id has no successor
    pub fn restore_book(&mut self, book: Book) -> Result<BookRef, CatalogError> {
        let id = book.id();
        let after = id.checked_add(1).ok_or(CatalogError::IdsExhausted { id })?;
        if self.ids.contains(&id) {
            return Err(CatalogError::DuplicateId { id });
        }
        let book = Rc::new(book);
        self.next_id = self.next_id.max(after);
        self.index(&book);
        debug!(book_id = id, next_id = self.next_id, "book restored");
        Ok(book)
    }

    /// Remove a book from both indices and return it.
    ///
    /// The title index entry is removed by identity, so another book with the
    /// same title stays indexed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no book has this id; nothing is
    /// changed in that case
    pub fn remove_book(&mut self, id: BookId) -> Result<BookRef, CatalogError> {
        let position =
            self.books.position(|book| book.id() == id).ok_or(CatalogError::NotFound { id })?;
        let book = self.books.remove(position)?;
        self.ids.remove(&id);
        let indexed = self.by_title.delete_entry(&book);
        debug_assert!(indexed, "book {id} was missing from the title index");
        info!(book_id = id, title = book.title(), "book removed");
        Ok(book)
    }

    /// Look a book up by id, scanning in insertion order
    #[must_use]
    pub fn find_by_id(&self, id: BookId) -> Option<&BookRef> {
        if !self.ids.contains(&id) {
            return None;
        }
        self.books.iter().find(|book| book.id() == id)
    }

    /// Look a book up by title, ignoring case.
    ///
    /// When several books share the title, one of them is returned.
    #[must_use]
    pub fn find_by_title(&self, title: &str) -> Option<&BookRef> {
        self.by_title.search(title)
    }

    /// All books in the order they were added
    pub fn list_by_insertion(&self) -> impl Iterator<Item = &BookRef> {
        self.books.iter()
    }

    /// All books ordered by title, ignoring case
    #[must_use]
    pub fn list_by_title(&self) -> Sequence<BookRef> {
        self.by_title.in_order()
    }

    /// Queue a borrow request for an existing book.
    ///
    /// Availability is not checked here; that happens when the request is
    /// processed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no book has this id
    pub fn request_borrow(
        &mut self,
        requester: &str,
        id: BookId,
    ) -> Result<BorrowRequest, CatalogError> {
        if self.find_by_id(id).is_none() {
            return Err(CatalogError::NotFound { id });
        }
        let request = BorrowRequest::new(requester, id);
        self.requests.enqueue(request.clone());
        debug!(book_id = id, requester, pending = self.requests.len(), "borrow request queued");
        Ok(request)
    }

    /// Take the request at the front of the queue and try to fulfil it.
    ///
    /// A request for a book that is out goes back to the rear of the queue,
    /// so a single call never handles more than one request. A request for
    /// a book that no longer exists is dropped.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Structure` if no request is pending
    pub fn process_next_request(&mut self) -> Result<RequestOutcome, CatalogError> {
        let request = self.requests.dequeue()?;
        let Some(book) = self.find_by_id(request.book_id).cloned() else {
            warn!(
                book_id = request.book_id,
                requester = %request.requester,
                "requested book no longer exists, dropping request"
            );
            return Ok(RequestOutcome::Discarded { request });
        };
        if !book.is_available() {
            debug!(
                book_id = book.id(),
                requester = %request.requester,
                "book is out, request requeued"
            );
            self.requests.enqueue(request.clone());
            return Ok(RequestOutcome::Requeued { request, book });
        }
        self.apply(&book, ActionKind::Borrow, &request.requester);
        Ok(RequestOutcome::Fulfilled { request, book })
    }

    /// Lend a book immediately, bypassing the queue
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no book has this id, or
    /// `CatalogError::AlreadyBorrowed` if it is already out
    pub fn borrow_now(&mut self, requester: &str, id: BookId) -> Result<BookRef, CatalogError> {
        let book = self.find_by_id(id).cloned().ok_or(CatalogError::NotFound { id })?;
        if !book.is_available() {
            return Err(CatalogError::AlreadyBorrowed { id });
        }
        self.apply(&book, ActionKind::Borrow, requester);
        Ok(book)
    }

    /// Take a book back
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no book has this id, or
    /// `CatalogError::NotBorrowed` if it is on the shelf
    pub fn return_now(&mut self, requester: &str, id: BookId) -> Result<BookRef, CatalogError> {
        let book = self.find_by_id(id).cloned().ok_or(CatalogError::NotFound { id })?;
        if book.is_available() {
            return Err(CatalogError::NotBorrowed { id });
        }
        self.apply(&book, ActionKind::Return, requester);
        Ok(book)
    }

    /// Revert the most recent borrow or return.
    ///
    /// The popped action is consumed either way: undo is not itself undoable,
    /// and an action whose book has been removed is discarded.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Structure` if there is nothing to undo, or
    /// `CatalogError::UndoTargetMissing` if the action's book was removed
    pub fn undo_last(&mut self) -> Result<UndoOutcome, CatalogError> {
        let action = self.actions.pop()?;
        let Some(book) = self.find_by_id(action.book_id).cloned() else {
            warn!(%action, "book no longer exists, action discarded");
            return Err(CatalogError::UndoTargetMissing { action });
        };
        book.set_availability(action.kind.undone_state());
        self.notify(&book, &action, true);
        Ok(UndoOutcome { action, book })
    }

    /// Toggle `book` and record the action for undo
    fn apply(&mut self, book: &BookRef, kind: ActionKind, requester: &str) {
        book.set_availability(kind.resulting_state());
        let action = Action::new(kind, book.id(), requester);
        self.notify(book, &action, false);
        self.actions.push(action);
    }

    /// Tell every observer about a lending change
    fn notify(&self, book: &Book, action: &Action, undone: bool) {
        for observer in &self.observers {
            observer.on_lending_change(book, action, undone);
        }
    }

    /// Number of books
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Returns true if the catalog holds no books
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Id the next added book will receive
    #[must_use]
    pub fn next_id(&self) -> BookId {
        self.next_id
    }

    /// Pending borrow requests, front of the queue first
    #[must_use]
    pub fn pending_requests(&self) -> queue::Iter<'_, BorrowRequest> {
        self.requests.iter()
    }

    /// Number of pending borrow requests
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.requests.len()
    }

    /// Undoable actions, most recent first
    pub fn history(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Number of undoable actions
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if the insertion-order sequence and the title index hold
    /// exactly the same records
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.books.len() != self.by_title.len() || self.books.len() != self.ids.len() {
            return false;
        }
        let indexed: HashSet<*const Book> = self.by_title.iter().map(Rc::as_ptr).collect();
        indexed.len() == self.books.len()
            && self
                .books
                .iter()
                .all(|book| indexed.contains(&Rc::as_ptr(book)) && self.ids.contains(&book.id()))
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} books, {} pending requests, {} undoable actions",
            self.len(),
            self.pending_len(),
            self.history_len()
        )
    }
}
