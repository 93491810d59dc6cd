//! Librarian credential storage.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::LibraryError;

/// Password seeded into a freshly created credential store.
const DEFAULT_PASSWORD: &str = "admin";

/// The stored login credential. Only the SHA-256 digest of the password is
/// kept, as lowercase hex; the clear text never persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredential {
    password_hash: String,
}

impl Default for AuthCredential {
    fn default() -> Self {
        Self {
            password_hash: hash_password(DEFAULT_PASSWORD),
        }
    }
}

impl AuthCredential {
    /// A credential store seeded with the default password.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored digest, lowercase hex.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Whether `password` hashes to the stored digest.
    pub fn verify(&self, password: &str) -> bool {
        hash_password(password) == self.password_hash
    }

    /// Replace the password after verifying the old one.
    pub fn change_password(&mut self, old: &str, new: &str) -> Result<(), LibraryError> {
        if !self.verify(old) {
            return Err(LibraryError::WrongPassword);
        }
        self.password_hash = hash_password(new);
        Ok(())
    }
}

/// Lowercase hex SHA-256 digest of the clear text.
pub fn hash_password(clear: &str) -> String {
    hex::encode(Sha256::digest(clear.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_to_lowercase_hex_sha256() {
        assert_eq!(
            hash_password("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn fresh_store_accepts_the_default_password() {
        let credential = AuthCredential::new();
        assert_eq!(credential.password_hash(), hash_password("admin"));
        assert!(credential.verify("admin"));
        assert!(!credential.verify("Admin"));
        assert!(!credential.verify(""));
    }

    #[test]
    fn change_password_requires_the_old_one() {
        let mut credential = AuthCredential::new();
        let err = credential.change_password("wrong", "segreto").unwrap_err();
        assert_eq!(err, LibraryError::WrongPassword);
        assert!(credential.verify("admin"));

        credential
            .change_password("admin", "segreto")
            .expect("old password verified");
        assert!(credential.verify("segreto"));
        assert!(!credential.verify("admin"));
    }
}
