#![warn(clippy::all, missing_docs)]

//! Core domain logic for the biblio library manager.
//!
//! This crate hosts the book catalog, user directory, and loan ledger,
//! the ISBN-13 validator, configuration handling, and the snapshot
//! persistence layer used by the terminal UI and any future frontends.

pub mod archive;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod isbn;
pub mod ledger;
pub mod models;

pub use archive::FileArchive;
pub use auth::AuthCredential;
pub use catalog::{BookCatalog, BookPatch};
pub use config::AppConfig;
pub use directory::{UserDirectory, UserPatch};
pub use error::LibraryError;
pub use isbn::IsbnError;
pub use ledger::LoanLedger;
pub use models::{Book, Loan, LoanKey, User};
