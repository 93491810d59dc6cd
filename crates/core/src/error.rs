//! Domain error taxonomy.

use thiserror::Error;

/// Errors surfaced by catalog, directory, ledger, and credential operations.
///
/// Variants split into two families: structurally wrong input (an identity
/// that does not resolve, a copy count of zero, a wrong old password) and
/// invariant violations (no copies left, loan cap, blacklist, totals below
/// the loaned count). ISBN format rejection has its own reason enum in
/// [`crate::isbn`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// No book in the catalog carries this ISBN.
    #[error("no book found with ISBN {0}")]
    BookNotFound(u64),

    /// No user in the directory carries this matricola.
    #[error("no user found with matricola {0}")]
    UserNotFound(String),

    /// Copy counts must be at least one.
    #[error("copy count must be at least 1, got {0}")]
    InvalidCopyCount(u32),

    /// Every copy of the book is currently on loan.
    #[error("no available copies of ISBN {0}")]
    NoCopiesAvailable(u64),

    /// The user is blocked from taking new loans.
    #[error("user {0} is blacklisted")]
    Blacklisted(String),

    /// The user already holds the maximum number of active loans.
    #[error("user {matricola} already has {active} active loans (limit {limit})")]
    LoanLimitReached {
        /// Identifier of the capped user.
        matricola: String,
        /// Active loans held at the time of the request.
        active: usize,
        /// The per-user cap, [`crate::models::User::MAX_LOANS`].
        limit: usize,
    },

    /// Total copies cannot drop below the number currently on loan.
    #[error("cannot set total copies to {requested}: {loaned} copies are on loan")]
    CopiesBelowLoaned {
        /// The requested new total.
        requested: u32,
        /// Copies currently out on loan.
        loaned: u32,
    },

    /// The old password presented for a password change did not verify.
    #[error("old password is not correct")]
    WrongPassword,
}
