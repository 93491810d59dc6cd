//! Loan ledger.
//!
//! The ledger owns every loan ever registered and is the only place that
//! moves copies off and back onto the shelf or touches a user's active-loan
//! set. Registration and return take the catalog and the directory as
//! explicit parameters, so one `&mut` call updates the three aggregates
//! together and they cannot drift apart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::BookCatalog;
use crate::directory::UserDirectory;
use crate::error::LibraryError;
use crate::models::{Loan, User};

/// Chronological record of loans, both active and returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanLedger {
    loans: Vec<Loan>,
}

impl LoanLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every loan in registration order.
    pub fn all(&self) -> &[Loan] {
        &self.loans
    }

    /// The loans whose book is still out.
    pub fn active(&self) -> Vec<&Loan> {
        self.loans.iter().filter(|loan| loan.is_active()).collect()
    }

    /// Number of loans this user holds open. An unknown matricola counts
    /// zero.
    pub fn count_active(&self, matricola: &str) -> usize {
        self.loans
            .iter()
            .filter(|loan| loan.is_active() && loan.matricola() == matricola)
            .count()
    }

    /// Whether this user holds any loan open.
    pub fn has_active(&self, matricola: &str) -> bool {
        self.loans
            .iter()
            .any(|loan| loan.is_active() && loan.matricola() == matricola)
    }

    /// The active loan with this exact identity, if any.
    pub fn find_active(&self, matricola: &str, isbn: u64, start_date: NaiveDate) -> Option<&Loan> {
        self.loans.iter().find(|loan| {
            loan.is_active()
                && loan.matricola() == matricola
                && loan.isbn() == isbn
                && loan.start_date() == start_date
        })
    }

    /// Register a new loan and take a copy off the shelf.
    ///
    /// Checks run in a fixed order: the user must exist, the book must
    /// exist, a copy must be available, the user must not be blacklisted,
    /// and the user must be under [`User::MAX_LOANS`] open loans. The first
    /// failing check is reported and nothing is changed. On success the
    /// book loses one available copy, the user's active set gains the loan
    /// key, and a snapshot of the new loan is returned.
    pub fn register_loan(
        &mut self,
        catalog: &mut BookCatalog,
        directory: &mut UserDirectory,
        matricola: &str,
        isbn: u64,
        start_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<Loan, LibraryError> {
        let user = directory
            .find_mut(matricola)
            .ok_or_else(|| LibraryError::UserNotFound(matricola.to_string()))?;
        let book = catalog
            .find_mut(isbn)
            .ok_or(LibraryError::BookNotFound(isbn))?;
        if !book.is_available() {
            return Err(LibraryError::NoCopiesAvailable(isbn));
        }
        if user.is_blacklisted() {
            return Err(LibraryError::Blacklisted(matricola.to_string()));
        }
        if user.active_loan_count() >= User::MAX_LOANS {
            return Err(LibraryError::LoanLimitReached {
                matricola: matricola.to_string(),
                active: user.active_loan_count(),
                limit: User::MAX_LOANS,
            });
        }

        let loan = Loan::new(matricola.to_string(), isbn, start_date, due_date);
        book.take_copy()?;
        user.push_loan(loan.key());
        self.loans.push(loan.clone());
        Ok(loan)
    }

    /// Close the active loan with this identity and put the copy back.
    ///
    /// When no active loan matches, nothing changes and `false` comes back;
    /// returning the same loan twice therefore leaves the first return date
    /// in place. A book or user that has meanwhile left the catalog or the
    /// directory is logged and skipped, the loan still closes.
    pub fn register_return(
        &mut self,
        catalog: &mut BookCatalog,
        directory: &mut UserDirectory,
        matricola: &str,
        isbn: u64,
        start_date: NaiveDate,
        return_date: NaiveDate,
    ) -> bool {
        let Some(loan) = self.loans.iter_mut().find(|loan| {
            loan.is_active()
                && loan.matricola() == matricola
                && loan.isbn() == isbn
                && loan.start_date() == start_date
        }) else {
            debug!("no active loan for {matricola}/{isbn} starting {start_date}; return ignored");
            return false;
        };
        loan.close(return_date);
        let key = loan.key();

        match catalog.find_mut(isbn) {
            Some(book) => book.return_copy(),
            None => warn!("returned book {isbn} is no longer catalogued"),
        }
        match directory.find_mut(matricola) {
            Some(user) => user.remove_loan(&key),
            None => warn!("returning user {matricola} is no longer in the directory"),
        }
        true
    }
}
