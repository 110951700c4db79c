//! Line-oriented menu over a [`Catalog`].
//!
//! Input and output are injected so the loop can be driven from tests.

use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::{
    book::{BookId, BookRef},
    catalog::{Catalog, RequestOutcome},
    error::{CatalogError, StructureError},
    queue, stack,
};

/// Menu entries, numbered as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Save and leave
    Exit,
    /// Add a new book
    Add,
    /// Remove a book by id
    Remove,
    /// Look a book up by id
    SearchById,
    /// Look a book up by title
    SearchByTitle,
    /// List books in insertion order
    ListByInsertion,
    /// List books by title
    ListByTitle,
    /// Queue a borrow request
    RequestBorrow,
    /// Process the front borrow request
    ProcessRequest,
    /// Borrow immediately
    BorrowNow,
    /// Return a book
    ReturnNow,
    /// Undo the last borrow or return
    Undo,
    /// Show pending requests
    ShowQueue,
    /// Show undoable actions
    ShowHistory,
}

impl Command {
    /// Every command in menu order
    pub const ALL: [Self; 14] = [
        Self::Add,
        Self::Remove,
        Self::SearchById,
        Self::SearchByTitle,
        Self::ListByInsertion,
        Self::ListByTitle,
        Self::RequestBorrow,
        Self::ProcessRequest,
        Self::BorrowNow,
        Self::ReturnNow,
        Self::Undo,
        Self::ShowQueue,
        Self::ShowHistory,
        Self::Exit,
    ];

    /// The number typed to select this command
    #[must_use]
    pub fn choice(self) -> u8 {
        match self {
            Self::Exit => 0,
            Self::Add => 1,
            Self::Remove => 2,
            Self::SearchById => 3,
            Self::SearchByTitle => 4,
            Self::ListByInsertion => 5,
            Self::ListByTitle => 6,
            Self::RequestBorrow => 7,
            Self::ProcessRequest => 8,
            Self::BorrowNow => 9,
            Self::ReturnNow => 10,
            Self::Undo => 11,
            Self::ShowQueue => 12,
            Self::ShowHistory => 13,
        }
    }

    /// The command selected by `choice`, if any
    #[must_use]
    pub fn from_choice(choice: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.choice() == choice)
    }

    /// Menu label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Exit => "Exit",
            Self::Add => "Add a new book",
            Self::Remove => "Remove a book",
            Self::SearchById => "Search book by ID",
            Self::SearchByTitle => "Search book by title",
            Self::ListByInsertion => "List all books",
            Self::ListByTitle => "List all books alphabetically",
            Self::RequestBorrow => "Request to borrow a book",
            Self::ProcessRequest => "Process next borrow request",
            Self::BorrowNow => "Borrow a book",
            Self::ReturnNow => "Return a book",
            Self::Undo => "Undo last action",
            Self::ShowQueue => "Display borrow queue",
            Self::ShowHistory => "Display action history",
        }
    }
}

/// Interactive menu loop
#[derive(Debug)]
pub struct Console<'a, R, W> {
    /// The catalog every command operates on
    catalog: &'a mut Catalog,
    /// Where commands are read from
    input: R,
    /// Where everything is printed
    output: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    /// Create a console over `catalog`
    #[must_use]
    pub fn new(catalog: &'a mut Catalog, input: R, output: W) -> Self {
        Self { catalog, input, output }
    }

    /// Run until the user picks Exit or input ends. Saving is left to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from reading input or writing output
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", "LIBRARY MANAGEMENT SYSTEM".green().bold())?;
        loop {
            self.print_menu()?;
            let Some(line) = self.read_line()? else {
                return Ok(());
            };
            let Ok(choice) = line.trim().parse::<u8>() else {
                writeln!(self.output, "{}", "Invalid input. Please enter a number.".red())?;
                continue;
            };
            match Command::from_choice(choice) {
                Some(Command::Exit) => return Ok(()),
                Some(command) => self.execute(command)?,
                None => writeln!(self.output, "{}", "Invalid choice. Please try again.".red())?,
            }
        }
    }

    /// Print the numbered menu and the prompt
    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        for command in Command::ALL {
            writeln!(self.output, "{:>2}. {}", command.choice(), command.label())?;
        }
        write!(self.output, "Enter your choice: ")?;
        self.output.flush()
    }

    /// Read one line without its terminator; `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Prompt for free text
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Prompt for a book id until a number is entered or input ends
    fn prompt_id(&mut self) -> io::Result<Option<BookId>> {
        loop {
            let Some(line) = self.prompt("Enter book ID")? else {
                return Ok(None);
            };
            match line.trim().parse() {
                Ok(id) => return Ok(Some(id)),
                Err(_) => {
                    writeln!(self.output, "{}", "Invalid input. Please enter a number.".red())?;
                }
            }
        }
    }

    /// Prompt for the requester's name and a book id
    fn prompt_requester_and_id(&mut self) -> io::Result<Option<(String, BookId)>> {
        let Some(name) = self.prompt("Enter your name")? else {
            return Ok(None);
        };
        Ok(self.prompt_id()?.map(|id| (name, id)))
    }

    /// Report a failed catalog operation
    fn report_error(&mut self, error: &CatalogError) -> io::Result<()> {
        let message = match error {
            CatalogError::Structure(StructureError::Empty { structure: queue::STRUCTURE }) => {
                "No borrow requests in queue.".to_string()
            }
            CatalogError::Structure(StructureError::Empty { structure: stack::STRUCTURE }) => {
                "No actions to undo.".to_string()
            }
            other => format!("{}.", capitalize(&other.to_string())),
        };
        writeln!(self.output, "{}", message.red())
    }

    /// Dispatch one menu command
    #[allow(clippy::too_many_lines)]
    fn execute(&mut self, command: Command) -> io::Result<()> {
        writeln!(self.output, "\n{}", format!("=== {} ===", command.label()).yellow().bold())?;
        match command {
            Command::Add => {
                let Some(title) = self.prompt("Enter book title")? else { return Ok(()) };
                let Some(author) = self.prompt("Enter book author")? else { return Ok(()) };
                if title.contains(',') || author.contains(',') {
                    return writeln!(
                        self.output,
                        "{}",
                        "Titles and authors cannot contain commas.".red()
                    );
                }
                match self.catalog.add_book(&title, &author) {
                    Ok(book) => {
                        writeln!(self.output, "{} {book}", "Book added successfully:".green())
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            Command::Remove => {
                let Some(id) = self.prompt_id()? else { return Ok(()) };
                match self.catalog.remove_book(id) {
                    Ok(book) => {
                        writeln!(self.output, "{} {book}", "Book removed successfully:".green())
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            Command::SearchById => {
                let Some(id) = self.prompt_id()? else { return Ok(()) };
                match self.catalog.find_by_id(id) {
                    Some(book) => writeln!(self.output, "Book found: {book}"),
                    None => writeln!(self.output, "Book with ID {id} not found."),
                }
            }
            Command::SearchByTitle => {
                let Some(title) = self.prompt("Enter book title")? else { return Ok(()) };
                match self.catalog.find_by_title(&title) {
                    Some(book) => writeln!(self.output, "Book found: {book}"),
                    None => writeln!(self.output, "Book with title '{title}' not found."),
                }
            }
            Command::ListByInsertion => write_books(
                &mut self.output,
                "All Books (Order of Addition)",
                self.catalog.list_by_insertion().cloned(),
            ),
            Command::ListByTitle => write_books(
                &mut self.output,
                "Books in Alphabetical Order",
                self.catalog.list_by_title().iter().cloned(),
            ),
            Command::RequestBorrow => {
                let Some((name, id)) = self.prompt_requester_and_id()? else { return Ok(()) };
                match self.catalog.request_borrow(&name, id) {
                    Ok(request) => {
                        writeln!(self.output, "Borrow request added to queue: {request}")
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            Command::ProcessRequest => match self.catalog.process_next_request() {
                Ok(RequestOutcome::Fulfilled { request, book }) => writeln!(
                    self.output,
                    "{}",
                    format!("Processed: {} borrowed '{}'", request.requester, book.title()).green()
                ),
                Ok(RequestOutcome::Requeued { request, book }) => writeln!(
                    self.output,
                    "'{}' is currently borrowed. Request from {} moved to the back of the queue.",
                    book.title(),
                    request.requester
                ),
                Ok(RequestOutcome::Discarded { request }) => writeln!(
                    self.output,
                    "Book {} no longer exists. Request from {} dropped.",
                    request.book_id, request.requester
                ),
                Err(e) => self.report_error(&e),
            },
            Command::BorrowNow => {
                let Some((name, id)) = self.prompt_requester_and_id()? else { return Ok(()) };
                match self.catalog.borrow_now(&name, id) {
                    Ok(book) => writeln!(
                        self.output,
                        "{}",
                        format!("{name} borrowed '{}' successfully.", book.title()).green()
                    ),
                    Err(e) => self.report_error(&e),
                }
            }
            Command::ReturnNow => {
                let Some((name, id)) = self.prompt_requester_and_id()? else { return Ok(()) };
                match self.catalog.return_now(&name, id) {
                    Ok(book) => writeln!(
                        self.output,
                        "{}",
                        format!("{name} returned '{}' successfully.", book.title()).green()
                    ),
                    Err(e) => self.report_error(&e),
                }
            }
            Command::Undo => match self.catalog.undo_last() {
                Ok(outcome) => writeln!(
                    self.output,
                    "{}",
                    format!(
                        "Undone: {}'s {} of '{}'",
                        outcome.action.requester,
                        outcome.action.kind.to_string().to_lowercase(),
                        outcome.book.title()
                    )
                    .green()
                ),
                Err(e) => self.report_error(&e),
            },
            Command::ShowQueue => {
                if self.catalog.pending_len() == 0 {
                    return writeln!(self.output, "No pending borrow requests.");
                }
                writeln!(self.output, "Queue size: {}", self.catalog.pending_len())?;
                for request in self.catalog.pending_requests() {
                    writeln!(self.output, "{request}")?;
                }
                Ok(())
            }
            Command::ShowHistory => {
                if self.catalog.history_len() == 0 {
                    return writeln!(self.output, "No actions recorded.");
                }
                for action in self.catalog.history() {
                    writeln!(self.output, "{action}")?;
                }
                Ok(())
            }
            Command::Exit => Ok(()),
        }
    }
}

/// Print a heading and a list of books, or a placeholder when empty
fn write_books(
    output: &mut impl Write,
    heading: &str,
    books: impl Iterator<Item = BookRef>,
) -> io::Result<()> {
    let mut books = books.peekable();
    if books.peek().is_none() {
        return writeln!(output, "No books in the catalog.");
    }
    writeln!(output, "\n{}", format!("=== {heading} ===").bold())?;
    for book in books {
        writeln!(output, "{book}")?;
    }
    Ok(())
}

/// Upper-case the first character
fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}
