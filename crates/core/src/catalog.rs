//! Book catalog keyed by ISBN.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::LibraryError;
use crate::models::Book;

/// Field changes applied by [`BookCatalog::modify`]. A `None` field keeps
/// its current value.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement author list.
    pub authors: Option<Vec<String>>,
    /// Replacement publication year.
    pub publication_year: Option<i32>,
    /// New total copy count; the loaned count is preserved.
    pub total_copies: Option<u32>,
}

/// The set of catalogued books, at most one per ISBN, kept in ISBN order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookCatalog {
    #[serde(
        serialize_with = "serialize_books",
        deserialize_with = "deserialize_books"
    )]
    books: BTreeMap<u64, Book>,
}

impl BookCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct titles.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether no title is catalogued.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Catalogue a book, or add copies to it if the ISBN is already present.
    ///
    /// On a merge the existing title, authors, and year win; the incoming
    /// descriptive fields are ignored and only the copy counts grow. A copy
    /// count of zero is rejected either way.
    pub fn insert_or_merge(
        &mut self,
        isbn: u64,
        title: &str,
        authors: Vec<String>,
        publication_year: i32,
        copies: u32,
    ) -> Result<&Book, LibraryError> {
        if copies == 0 {
            return Err(LibraryError::InvalidCopyCount(0));
        }
        let book = match self.books.entry(isbn) {
            Entry::Occupied(entry) => {
                let book = entry.into_mut();
                book.add_copies(copies);
                book
            }
            Entry::Vacant(entry) => entry.insert(Book::new(
                isbn,
                title.to_string(),
                authors,
                publication_year,
                copies,
            )),
        };
        Ok(&*book)
    }

    /// Apply a patch to the book with this ISBN.
    ///
    /// The total, when present, is resized first; if the new total would not
    /// cover the copies currently on loan nothing at all is changed.
    pub fn modify(&mut self, isbn: u64, patch: BookPatch) -> Result<&Book, LibraryError> {
        let book = self
            .books
            .get_mut(&isbn)
            .ok_or(LibraryError::BookNotFound(isbn))?;
        if let Some(total) = patch.total_copies {
            book.resize_total(total)?;
        }
        if let Some(title) = patch.title {
            book.set_title(title);
        }
        if let Some(authors) = patch.authors {
            book.set_authors(authors);
        }
        if let Some(year) = patch.publication_year {
            book.set_publication_year(year);
        }
        Ok(&*book)
    }

    /// Remove the book whose ISBN is written in `isbn_text`.
    ///
    /// Unparsable text and unknown ISBNs are quiet no-ops; the return value
    /// says whether a book was actually removed.
    pub fn delete(&mut self, isbn_text: &str) -> bool {
        let trimmed = isbn_text.trim();
        let isbn = match trimmed.parse::<u64>() {
            Ok(isbn) => isbn,
            Err(_) => {
                debug!("ignoring catalog delete for unparsable ISBN {trimmed:?}");
                return false;
            }
        };
        if self.books.remove(&isbn).is_none() {
            debug!("ignoring catalog delete for unknown ISBN {isbn}");
            return false;
        }
        true
    }

    /// Find books matching every non-blank criterion.
    ///
    /// The ISBN matches by exact digit string, title and author by
    /// case-insensitive substring. All-blank criteria return the whole
    /// catalog. Results come back in ISBN order.
    pub fn search(&self, isbn: &str, title: &str, author: &str) -> Vec<&Book> {
        let isbn = isbn.trim();
        let title = title.trim().to_lowercase();
        let author = author.trim().to_lowercase();
        self.books
            .values()
            .filter(|book| isbn.is_empty() || book.isbn().to_string() == isbn)
            .filter(|book| title.is_empty() || book.title().to_lowercase().contains(&title))
            .filter(|book| {
                author.is_empty()
                    || book
                        .authors()
                        .iter()
                        .any(|name| name.to_lowercase().contains(&author))
            })
            .collect()
    }

    /// Every book, ordered by case-insensitive title.
    pub fn sorted_by_title(&self) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.values().collect();
        books.sort_by_key(|book| book.title().to_lowercase());
        books
    }

    /// The book with this ISBN, if catalogued.
    pub fn find(&self, isbn: u64) -> Option<&Book> {
        self.books.get(&isbn)
    }

    pub(crate) fn find_mut(&mut self, isbn: u64) -> Option<&mut Book> {
        self.books.get_mut(&isbn)
    }

    /// Walk the catalog in ISBN order.
    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }
}

fn serialize_books<S>(books: &BTreeMap<u64, Book>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(books.values())
}

fn deserialize_books<'de, D>(deserializer: D) -> Result<BTreeMap<u64, Book>, D::Error>
where
    D: Deserializer<'de>,
{
    let books = Vec::<Book>::deserialize(deserializer)?;
    Ok(books.into_iter().map(|book| (book.isbn(), book)).collect())
}
