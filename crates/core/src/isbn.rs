//! ISBN-13 normalization and checksum validation.
//!
//! An ISBN-13 is thirteen digits starting with the `978` or `979` bookland
//! prefix. The first twelve digits are weighted alternately by 1 and 3; the
//! thirteenth must equal `(10 - sum % 10) % 10`. Validation runs on the
//! normalized digit string, so `978-88-0000000-0` and `9788800000000` are
//! the same ISBN.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Digits in an ISBN-13.
const ISBN_LEN: usize = 13;

static NON_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9]").expect("invalid digit-strip regex"));

/// Reasons a candidate string is not a valid ISBN-13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IsbnError {
    /// The normalized form does not have exactly thirteen digits.
    #[error("an ISBN-13 has exactly 13 digits, found {0}")]
    WrongLength(usize),

    /// The normalized form does not start with 978 or 979.
    #[error("an ISBN-13 starts with the prefix 978 or 979")]
    BadPrefix,

    /// The weighted checksum does not match the final digit.
    #[error("check digit should be {expected}, found {found}")]
    BadCheckDigit {
        /// Digit demanded by the checksum of the first twelve.
        expected: u8,
        /// Digit actually present in position thirteen.
        found: u8,
    },
}

/// Strip every non-digit character from `raw`.
///
/// Hyphens, spaces, and any other separators are removed; the digits keep
/// their order. The result is not necessarily a valid ISBN.
pub fn normalize(raw: &str) -> String {
    NON_DIGITS.replace_all(raw, "").into_owned()
}

/// Validate an already-normalized digit string as an ISBN-13.
///
/// Checks run in a fixed order: length first, then the bookland prefix,
/// then the checksum. The first failing check is reported.
pub fn validate(digits: &str) -> Result<(), IsbnError> {
    if digits.len() != ISBN_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
        let count = digits.bytes().filter(|b| b.is_ascii_digit()).count();
        return Err(IsbnError::WrongLength(count));
    }
    if !digits.starts_with("978") && !digits.starts_with("979") {
        return Err(IsbnError::BadPrefix);
    }
    let values: Vec<u8> = digits.bytes().map(|b| b - b'0').collect();
    let sum: u32 = values[..ISBN_LEN - 1]
        .iter()
        .enumerate()
        .map(|(pos, &digit)| u32::from(digit) * if pos % 2 == 0 { 1 } else { 3 })
        .sum();
    let expected = ((10 - sum % 10) % 10) as u8;
    let found = values[ISBN_LEN - 1];
    if expected != found {
        return Err(IsbnError::BadCheckDigit { expected, found });
    }
    Ok(())
}

/// Normalize `raw`, validate it, and yield the numeric ISBN.
pub fn parse(raw: &str) -> Result<u64, IsbnError> {
    let digits = normalize(raw);
    validate(&digits)?;
    // Thirteen digits always fit in a u64.
    let value = digits
        .bytes()
        .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'));
    Ok(value)
}
