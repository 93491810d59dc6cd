//! Snapshot persistence for the library aggregates.
//!
//! Each aggregate is one JSON file under the archive root. Loading never
//! fails the caller: a missing, unreadable, or unparsable snapshot yields a
//! freshly constructed aggregate, so the application always starts. Saving
//! is best-effort and returns nothing; failures are logged and swallowed.
//! Callers must not assume a completed operation was durably saved.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::auth::AuthCredential;
use crate::catalog::BookCatalog;
use crate::config::AppConfig;
use crate::directory::UserDirectory;
use crate::ledger::LoanLedger;

const BOOKS_FILE: &str = "books.json";
const USERS_FILE: &str = "users.json";
const LOANS_FILE: &str = "loans.json";
const AUTH_FILE: &str = "auth.json";

/// File-backed archive rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileArchive {
    root: PathBuf,
}

impl FileArchive {
    /// An archive rooted at `root`. The directory is created lazily on the
    /// first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// An archive rooted at the configured data directory.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    /// The directory holding the snapshots.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The catalog snapshot, or an empty catalog.
    pub fn load_books(&self) -> BookCatalog {
        self.load_aggregate(BOOKS_FILE)
    }

    /// Persist the catalog, best-effort.
    pub fn save_books(&self, catalog: &BookCatalog) {
        self.save_aggregate(BOOKS_FILE, catalog);
    }

    /// The directory snapshot, or an empty directory.
    pub fn load_users(&self) -> UserDirectory {
        self.load_aggregate(USERS_FILE)
    }

    /// Persist the user directory, best-effort.
    pub fn save_users(&self, directory: &UserDirectory) {
        self.save_aggregate(USERS_FILE, directory);
    }

    /// The ledger snapshot, or an empty ledger.
    pub fn load_loans(&self) -> LoanLedger {
        self.load_aggregate(LOANS_FILE)
    }

    /// Persist the loan ledger, best-effort.
    pub fn save_loans(&self, ledger: &LoanLedger) {
        self.save_aggregate(LOANS_FILE, ledger);
    }

    /// The stored credential, or one seeded with the default password.
    pub fn load_auth(&self) -> AuthCredential {
        self.load_aggregate(AUTH_FILE)
    }

    /// Persist the credential, best-effort.
    pub fn save_auth(&self, credential: &AuthCredential) {
        self.save_aggregate(AUTH_FILE, credential);
    }

    fn load_aggregate<T>(&self, file_name: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let path = self.root.join(file_name);
        if !path.exists() {
            debug!("no snapshot at {}; starting empty", path.display());
            return T::default();
        }
        match read_snapshot(&path) {
            Ok(value) => value,
            Err(err) => {
                warn!("failed to load {}: {err:#}; starting empty", path.display());
                T::default()
            }
        }
    }

    fn save_aggregate<T: Serialize>(&self, file_name: &str, value: &T) {
        if let Err(err) = self.write_snapshot(file_name, value) {
            warn!("failed to save {file_name}: {err:#}");
        }
    }

    /// Serialize into a temp file next to the target and rename it into
    /// place, so a crash mid-write never leaves a half snapshot behind.
    fn write_snapshot<T: Serialize>(&self, file_name: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let serialized =
            serde_json::to_vec_pretty(value).context("failed to serialize snapshot")?;
        let mut temp = NamedTempFile::new_in(&self.root)
            .with_context(|| format!("failed to create temp file in {}", self.root.display()))?;
        temp.write_all(&serialized)
            .context("failed to write snapshot")?;
        let path = self.root.join(file_name);
        temp.persist(&path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(value)
}
