//! Library domain entities.
//!
//! `Book` and `User` keep their fields private so that copy counts and the
//! active-loan set can only change through the invariant-preserving methods
//! the catalog, directory, and ledger call. Loans reference their book and
//! user by key rather than by holding the entities themselves.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::LibraryError;

/// A catalogued title with its copy counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    isbn: u64,
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    publication_year: i32,
    total_copies: u32,
    available_copies: u32,
}

impl Book {
    /// Build a book whose copies are all available.
    pub(crate) fn new(
        isbn: u64,
        title: String,
        authors: Vec<String>,
        publication_year: i32,
        total_copies: u32,
    ) -> Self {
        Self {
            isbn,
            title,
            authors: clean_authors(authors),
            publication_year,
            total_copies,
            available_copies: total_copies,
        }
    }

    /// The thirteen-digit identifier.
    pub fn isbn(&self) -> u64 {
        self.isbn
    }

    /// Title as catalogued.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Authors in catalogue order.
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Year of publication.
    pub fn publication_year(&self) -> i32 {
        self.publication_year
    }

    /// Copies the library owns.
    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    /// Copies currently on the shelf.
    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    /// Whether at least one copy is on the shelf.
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn set_authors(&mut self, authors: Vec<String>) {
        self.authors = clean_authors(authors);
    }

    pub(crate) fn set_publication_year(&mut self, year: i32) {
        self.publication_year = year;
    }

    /// Add copies of an already-catalogued book. Both the total and the
    /// available count grow, so merged copies start on the shelf.
    pub(crate) fn add_copies(&mut self, copies: u32) {
        self.total_copies = self.total_copies.saturating_add(copies);
        self.available_copies = self.available_copies.saturating_add(copies);
    }

    /// Change the total while keeping the loaned count fixed.
    ///
    /// The loaned count is `total - available`; the new total must cover it
    /// and must stay positive. On success the available count becomes
    /// `new_total - loaned`.
    pub(crate) fn resize_total(&mut self, new_total: u32) -> Result<(), LibraryError> {
        if new_total == 0 {
            return Err(LibraryError::InvalidCopyCount(0));
        }
        let loaned = self.total_copies - self.available_copies;
        if new_total < loaned {
            return Err(LibraryError::CopiesBelowLoaned {
                requested: new_total,
                loaned,
            });
        }
        self.total_copies = new_total;
        self.available_copies = new_total - loaned;
        Ok(())
    }

    /// Take one copy off the shelf for a loan.
    pub(crate) fn take_copy(&mut self) -> Result<(), LibraryError> {
        if self.available_copies == 0 {
            return Err(LibraryError::NoCopiesAvailable(self.isbn));
        }
        self.available_copies -= 1;
        Ok(())
    }

    /// Put one copy back on the shelf. A copy count already at the total is
    /// left unchanged, so a stray double return cannot mint copies.
    pub(crate) fn return_copy(&mut self) {
        if self.available_copies < self.total_copies {
            self.available_copies += 1;
        }
    }
}

/// Trim author names and drop the blank ones.
fn clean_authors(authors: Vec<String>) -> Vec<String> {
    authors
        .into_iter()
        .map(|author| author.trim().to_string())
        .filter(|author| !author.is_empty())
        .collect()
}

/// A registered library user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    matricola: String,
    first_name: String,
    last_name: String,
    email: String,
    #[serde(default)]
    blacklisted: bool,
    #[serde(default)]
    active_loans: Vec<LoanKey>,
}

impl User {
    /// Most loans a user may hold open at once.
    pub const MAX_LOANS: usize = 3;

    /// Build a user with no loans and a clear blacklist flag.
    pub fn new(
        matricola: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            matricola: matricola.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            blacklisted: false,
            active_loans: Vec::new(),
        }
    }

    /// The registration number identifying the user.
    pub fn matricola(&self) -> &str {
        &self.matricola
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Contact address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether new loans are blocked for this user.
    pub fn is_blacklisted(&self) -> bool {
        self.blacklisted
    }

    /// Keys of the loans this user currently holds open.
    pub fn active_loans(&self) -> &[LoanKey] {
        &self.active_loans
    }

    /// Number of loans currently held open.
    pub fn active_loan_count(&self) -> usize {
        self.active_loans.len()
    }

    pub(crate) fn set_first_name(&mut self, first_name: String) {
        self.first_name = first_name;
    }

    pub(crate) fn set_last_name(&mut self, last_name: String) {
        self.last_name = last_name;
    }

    pub(crate) fn set_email(&mut self, email: String) {
        self.email = email;
    }

    pub(crate) fn set_blacklisted(&mut self, blacklisted: bool) {
        self.blacklisted = blacklisted;
    }

    /// Record an open loan. A key already present is not added twice.
    pub(crate) fn push_loan(&mut self, key: LoanKey) {
        if !self.active_loans.contains(&key) {
            self.active_loans.push(key);
        }
    }

    /// Drop an open loan from the user's set.
    pub(crate) fn remove_loan(&mut self, key: &LoanKey) {
        self.active_loans.retain(|held| held != key);
    }
}

/// Identity of a loan within one user's active set: the borrowed book plus
/// the day the loan began. The matricola is implied by the owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanKey {
    /// ISBN of the borrowed book.
    pub isbn: u64,
    /// First day of the loan.
    pub start_date: NaiveDate,
}

/// One lending of one copy of a book to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    matricola: String,
    isbn: u64,
    start_date: NaiveDate,
    due_date: NaiveDate,
    #[serde(default)]
    return_date: Option<NaiveDate>,
}

impl Loan {
    pub(crate) fn new(
        matricola: String,
        isbn: u64,
        start_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            matricola,
            isbn,
            start_date,
            due_date,
            return_date: None,
        }
    }

    /// Matricola of the borrowing user.
    pub fn matricola(&self) -> &str {
        &self.matricola
    }

    /// ISBN of the borrowed book.
    pub fn isbn(&self) -> u64 {
        self.isbn
    }

    /// First day of the loan.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Day the book is expected back.
    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Day the book came back, if it has.
    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    /// Whether the book is still out.
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }

    /// Whether the loan is still open past its due date as of `reference`.
    /// A returned loan is never overdue, however late it came back.
    pub fn is_overdue(&self, reference: NaiveDate) -> bool {
        self.is_active() && reference > self.due_date
    }

    /// [`Loan::is_overdue`] against the local calendar date.
    pub fn is_overdue_today(&self) -> bool {
        self.is_overdue(Local::now().date_naive())
    }

    /// The key this loan occupies in its user's active set.
    pub fn key(&self) -> LoanKey {
        LoanKey {
            isbn: self.isbn,
            start_date: self.start_date,
        }
    }

    pub(crate) fn close(&mut self, return_date: NaiveDate) {
        self.return_date = Some(return_date);
    }
}

/// Equality is the loan identity: user, book, and start date. The return
/// state does not participate.
impl PartialEq for Loan {
    fn eq(&self, other: &Self) -> bool {
        self.matricola == other.matricola
            && self.isbn == other.isbn
            && self.start_date == other.start_date
    }
}

impl Eq for Loan {}
