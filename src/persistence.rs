//! Flat-file storage for the catalog and a JSON snapshot export.
//!
//! The catalog file holds one record per line:
//!
//! ```text
//! <id>,<title>,<author>,<true|false>
//! ```
//!
//! Saving rewrites the whole file in insertion order. There is no atomic
//! replace, so a crash mid-write can leave a truncated file.

use std::{fs, io, path::Path};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    book::{Availability, Book, BookId},
    catalog::Catalog,
    error::PersistenceError,
    events::{Action, BorrowRequest},
};

/// File the binary reads and writes when no path is given
pub const DEFAULT_CATALOG_FILE: &str = "books.txt";

/// What to do with a line that cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Stop at the first bad line and fail the whole load
    #[default]
    Abort,
    /// Record the bad line in the [`LoadReport`] and keep going
    Skip,
}

/// Summary of a load
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Records restored into the catalog
    pub loaded: usize,
    /// Lines rejected under [`LoadPolicy::Skip`]
    pub skipped: Vec<PersistenceError>,
}

/// Render one record as a catalog line (without the newline)
#[must_use]
pub fn format_line(book: &Book) -> String {
    format!("{},{},{},{}", book.id(), book.title(), book.author(), book.is_available())
}

/// Parse one catalog line. `line_number` is only used for error reporting.
///
/// # Errors
///
/// Returns `PersistenceError::Malformed` if the line does not have exactly
/// four fields, the id is not an unsigned integer, or the availability is
/// not `true` or `false`
pub fn parse_line(line: &str, line_number: usize) -> Result<Book, PersistenceError> {
    let malformed = |reason: String| PersistenceError::Malformed { line: line_number, reason };

    let fields: Vec<&str> = line.split(',').collect();
    let [id, title, author, available] = fields.as_slice() else {
        return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
    };
    let id: BookId = id.trim().parse().map_err(|e| malformed(format!("invalid id {id:?}: {e}")))?;
    let availability = match available.trim() {
        "true" => Availability::Available,
        "false" => Availability::Borrowed,
        other => return Err(malformed(format!("invalid availability {other:?}"))),
    };
    Ok(Book::new(id, title, author, availability))
}

/// Build a catalog from the contents of a catalog file.
///
/// Blank lines are ignored. Every good line is restored into the catalog,
/// advancing its next id past the highest id seen.
///
/// # Errors
///
/// Under [`LoadPolicy::Abort`], returns the first `PersistenceError::Malformed`
/// encountered, including a line that repeats an earlier id
pub fn parse_catalog(
    contents: &str,
    policy: LoadPolicy,
) -> Result<(Catalog, LoadReport), PersistenceError> {
    let mut catalog = Catalog::new();
    let mut report = LoadReport::default();

    for (line_number, line) in (1..).zip(contents.lines()) {
        if line.trim().is_empty() {
            continue;
        }
        let restored = parse_line(line, line_number).and_then(|book| {
            catalog.restore_book(book).map_err(|e| PersistenceError::Malformed {
                line: line_number,
                reason: e.to_string(),
            })
        });
        match restored {
            Ok(_) => report.loaded = report.loaded.saturating_add(1),
            Err(e) if policy == LoadPolicy::Skip => {
                warn!(error = %e, "skipping catalog line");
                report.skipped.push(e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok((catalog, report))
}

/// Render the whole catalog, one line per record in insertion order
#[must_use]
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut contents = String::new();
    for book in catalog.list_by_insertion() {
        if [book.title(), book.author()].iter().any(|field| field.contains([',', '\n', '\r'])) {
            warn!(
                book_id = book.id(),
                "title or author contains a separator; the saved line will not load back"
            );
        }
        contents.push_str(&format_line(book));
        contents.push('\n');
    }
    contents
}

/// Load the catalog file at `path`.
///
/// A missing file is not an error: the catalog simply starts empty.
///
/// # Errors
///
/// Returns `PersistenceError::Io` if the file exists but cannot be read, or a
/// parse error as described in [`parse_catalog`]
pub fn load(path: &Path, policy: LoadPolicy) -> Result<(Catalog, LoadReport), PersistenceError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "catalog file not found, starting with an empty catalog");
            return Ok((Catalog::new(), LoadReport::default()));
        }
        Err(e) => return Err(PersistenceError::io(path, e)),
    };
    let (catalog, report) = parse_catalog(&contents, policy)?;
    info!(
        path = %path.display(),
        loaded = report.loaded,
        skipped = report.skipped.len(),
        "catalog loaded"
    );
    Ok((catalog, report))
}

/// Overwrite the file at `path` with the catalog
///
/// # Errors
///
/// Returns `PersistenceError::Io` if the file cannot be written
pub fn save(catalog: &Catalog, path: &Path) -> Result<(), PersistenceError> {
    fs::write(path, render_catalog(catalog)).map_err(|e| PersistenceError::io(path, e))?;
    info!(path = %path.display(), books = catalog.len(), "catalog saved");
    Ok(())
}

/// Serializable view of the whole catalog state
#[derive(Debug, Serialize)]
pub struct CatalogSnapshot<'a> {
    /// Books in insertion order
    pub books: Vec<&'a Book>,
    /// Pending borrow requests, front of the queue first
    pub pending_requests: Vec<&'a BorrowRequest>,
    /// Undoable actions, most recent first
    pub history: Vec<&'a Action>,
}

impl<'a> CatalogSnapshot<'a> {
    /// Borrow the current state of `catalog`
    #[must_use]
    pub fn capture(catalog: &'a Catalog) -> Self {
        Self {
            books: catalog.list_by_insertion().map(|book| &**book).collect(),
            pending_requests: catalog.pending_requests().collect(),
            history: catalog.history().collect(),
        }
    }
}

/// Write a pretty-printed JSON snapshot of the catalog to `path`
///
/// # Errors
///
/// Returns `PersistenceError::Json` if serialization fails, or
/// `PersistenceError::Io` if the file cannot be written
pub fn export_json(catalog: &Catalog, path: &Path) -> Result<(), PersistenceError> {
    let serialized = serde_json::to_string_pretty(&CatalogSnapshot::capture(catalog))?;
    fs::write(path, serialized).map_err(|e| PersistenceError::io(path, e))?;
    info!(path = %path.display(), "JSON snapshot written");
    Ok(())
}
