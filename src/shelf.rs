pub mod repo;

use crate::catalog::{Book, DomainError, SharedBookRepository, StoreError};
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::warn;

/// Shelving state of a book on a user's reading list. The three states are
/// mutually exclusive; a book is in exactly one of them or not on the list.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ReadingStatus {
    Reading,
    WantToRead,
    Completed,
}

impl ReadingStatus {
    pub fn to_code_str(&self) -> &'static str {
        match self {
            ReadingStatus::Reading => "reading",
            ReadingStatus::WantToRead => "want-to-read",
            ReadingStatus::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for ReadingStatus {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "reading" => Ok(ReadingStatus::Reading),
            "want-to-read" => Ok(ReadingStatus::WantToRead),
            "completed" => Ok(ReadingStatus::Completed),
            _ => Err(DomainError::UnknownCode(value.to_owned())),
        }
    }
}

impl Display for ReadingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_code_str())
    }
}

/// One (user, book) relationship. At most one entry exists per pair;
/// `added_at` is stamped when the pair first appears and survives status
/// changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShelfEntry {
    user_id: u64,
    book_id: u64,
    status: ReadingStatus,
    added_at: chrono::NaiveDateTime,
}

impl ShelfEntry {
    pub fn new(user_id: u64, book_id: u64, status: ReadingStatus, added_at: chrono::NaiveDateTime) -> Self {
        Self { user_id, book_id, status, added_at }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn book_id(&self) -> u64 {
        self.book_id
    }

    pub fn status(&self) -> ReadingStatus {
        self.status
    }

    pub fn added_at(&self) -> chrono::NaiveDateTime {
        self.added_at
    }

    pub fn with_status(&self, status: ReadingStatus) -> Self {
        Self { status, ..self.clone() }
    }
}

/// A user's shelf, partitioned by status. Groups hold full catalog records
/// in insertion order.
#[derive(Debug, Default)]
pub struct Shelves {
    pub reading: Vec<Book>,
    pub want_to_read: Vec<Book>,
    pub completed: Vec<Book>,
}

pub type SharedShelfRepository = Arc<dyn ShelfRepository>;

/// Reading-list storage, keyed by the (user, book) pair.
pub trait ShelfRepository: Send + Sync {

    /// Overwrites the status of the entry for the pair, creating the entry
    /// stamped with the current time when none exists. Returns the entry as
    /// stored.
    fn upsert_status(&self, user_id: u64, book_id: u64, status: ReadingStatus) -> Result<ShelfEntry, StoreError>;

    /// Deletes the entry for the pair. Returns whether an entry existed.
    fn delete(&self, user_id: u64, book_id: u64) -> Result<bool, StoreError>;

    /// Returns the user's entries in insertion order.
    fn find_by_user(&self, user_id: u64) -> Result<Vec<ShelfEntry>, StoreError>;
}

/// Tracks which books are on which of a user's three shelves.
///
/// The store keys entries by (user, book) and resolves book identifiers
/// through the catalog when a shelf is read back. Callers are expected to
/// have validated user and book references before shelving them; the store
/// itself does not check existence.
pub struct ReadingListStore {
    shelf: SharedShelfRepository,
    catalog: SharedBookRepository,
}

impl ReadingListStore {
    pub fn new(shelf: SharedShelfRepository, catalog: SharedBookRepository) -> Self {
        Self { shelf, catalog }
    }

    /// Puts the book on the given shelf. Re-shelving an already listed book
    /// moves it (or leaves it, for an idempotent re-set) without creating a
    /// second entry or touching its added-at stamp.
    pub fn set_status(&self, user_id: u64, book_id: u64, status: ReadingStatus) -> Result<ShelfEntry, StoreError> {
        self.shelf.upsert_status(user_id, book_id, status)
    }

    /// Takes the book off the user's list. Removing a book that is not
    /// listed reports `false` and is not an error.
    pub fn remove(&self, user_id: u64, book_id: u64) -> Result<bool, StoreError> {
        self.shelf.delete(user_id, book_id)
    }

    /// Returns the user's shelf partitioned by status. Entries whose book no
    /// longer resolves in the catalog are skipped with a warning rather than
    /// failing the whole read. A user with no entries gets three empty
    /// groups.
    pub fn get_for_user(&self, user_id: u64) -> Result<Shelves, StoreError> {
        let entries = self.shelf.find_by_user(user_id)?;

        let ids = entries.iter().map(|e| e.book_id()).collect::<Vec<_>>();
        let books = self.catalog.find_by_ids(&ids)?
            .into_iter()
            .map(|b| (b.id(), b))
            .collect::<HashMap<_, _>>();

        let mut shelves = Shelves::default();
        for entry in entries {
            let Some(book) = books.get(&entry.book_id()) else {
                warn!(user_id, book_id = entry.book_id(), "shelved book missing from catalog, skipping");
                continue;
            };

            match entry.status() {
                ReadingStatus::Reading => shelves.reading.push(book.clone()),
                ReadingStatus::WantToRead => shelves.want_to_read.push(book.clone()),
                ReadingStatus::Completed => shelves.completed.push(book.clone()),
            }
        }

        Ok(shelves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repo::memory::MemoryBookStore;
    use crate::catalog::{Book, BookRepository};
    use crate::shelf::repo::memory::MemoryShelfStore;

    fn store_with_books(count: usize) -> ReadingListStore {
        let catalog = Arc::new(MemoryBookStore::new());
        let books = (0..count)
            .map(|i| {
                Book::builder()
                    .title(format!("Book {}", i + 1))
                    .author("author")
                    .description("description")
                    .build()
                    .unwrap()
            })
            .collect::<Vec<_>>();
        catalog.save_books(&books).unwrap();

        let shelf = Arc::new(MemoryShelfStore::new());
        ReadingListStore::new(shelf, catalog)
    }

    #[test]
    fn status_codes_round_trip_and_reject_unknown() {
        for status in [ReadingStatus::Reading, ReadingStatus::WantToRead, ReadingStatus::Completed] {
            assert_eq!(ReadingStatus::try_from(status.to_code_str()).unwrap(), status);
        }
        assert!(ReadingStatus::try_from("read").is_err());
        assert!(ReadingStatus::try_from("dropped").is_err());
    }

    #[test]
    fn setting_the_same_status_twice_keeps_one_entry() {
        let store = store_with_books(1);

        store.set_status(1, 1, ReadingStatus::Reading).unwrap();
        store.set_status(1, 1, ReadingStatus::Reading).unwrap();

        let shelves = store.get_for_user(1).unwrap();
        assert_eq!(shelves.reading.len(), 1);
        assert!(shelves.want_to_read.is_empty());
        assert!(shelves.completed.is_empty());
    }

    #[test]
    fn status_transitions_are_exclusive() {
        let store = store_with_books(1);

        store.set_status(1, 1, ReadingStatus::Reading).unwrap();
        store.set_status(1, 1, ReadingStatus::Completed).unwrap();

        let shelves = store.get_for_user(1).unwrap();
        assert!(shelves.reading.is_empty());
        assert_eq!(shelves.completed.len(), 1);
        assert_eq!(shelves.completed[0].id(), 1);
    }

    #[test]
    fn want_to_read_then_reading_lands_on_the_reading_shelf() {
        let store = store_with_books(5);

        store.set_status(1, 5, ReadingStatus::WantToRead).unwrap();
        store.set_status(1, 5, ReadingStatus::Reading).unwrap();

        let shelves = store.get_for_user(1).unwrap();
        assert_eq!(shelves.reading.len(), 1);
        assert_eq!(shelves.reading[0].id(), 5);
        assert!(shelves.want_to_read.is_empty());
        assert!(shelves.completed.is_empty());
    }

    #[test]
    fn removing_a_missing_entry_reports_false() {
        let store = store_with_books(1);

        assert!(!store.remove(1, 1).unwrap());

        store.set_status(1, 1, ReadingStatus::Reading).unwrap();
        assert!(store.remove(1, 1).unwrap());
        assert!(!store.remove(1, 1).unwrap());
    }

    #[test]
    fn empty_shelf_yields_three_empty_groups() {
        let store = store_with_books(1);

        let shelves = store.get_for_user(42).unwrap();
        assert!(shelves.reading.is_empty());
        assert!(shelves.want_to_read.is_empty());
        assert!(shelves.completed.is_empty());
    }

    #[test]
    fn unresolvable_books_are_skipped_not_errors() {
        let store = store_with_books(1);

        store.set_status(1, 1, ReadingStatus::Reading).unwrap();
        store.set_status(1, 99, ReadingStatus::Reading).unwrap();

        let shelves = store.get_for_user(1).unwrap();
        assert_eq!(shelves.reading.len(), 1);
        assert_eq!(shelves.reading[0].id(), 1);
    }

    #[test]
    fn groups_keep_insertion_order_and_users_stay_separate() {
        let store = store_with_books(3);

        store.set_status(1, 2, ReadingStatus::Completed).unwrap();
        store.set_status(1, 1, ReadingStatus::Completed).unwrap();
        store.set_status(2, 3, ReadingStatus::Reading).unwrap();

        let shelves = store.get_for_user(1).unwrap();
        let ids: Vec<u64> = shelves.completed.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(shelves.reading.is_empty());

        let other = store.get_for_user(2).unwrap();
        assert_eq!(other.reading.len(), 1);
        assert_eq!(other.reading[0].id(), 3);
    }
}
