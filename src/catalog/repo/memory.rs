use crate::catalog::{Book, BookRepository, StoreError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Map-backed catalog store. Identifiers are assigned from a monotonic
/// sequence, so iteration order is creation order.
pub struct MemoryBookStore {
    books: Mutex<BTreeMap<u64, Book>>,
    sequence: AtomicU64,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(BTreeMap::new()),
            sequence: AtomicU64::new(0),
        }
    }
}

impl Default for MemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookRepository for MemoryBookStore {
    fn get_all(&self) -> Result<Vec<Book>, StoreError> {
        let books = self.books.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        Ok(books.values().cloned().collect())
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Book>, StoreError> {
        let books = self.books.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        Ok(books.get(&id).cloned())
    }

    fn find_by_ids(&self, ids: &[u64]) -> Result<Vec<Book>, StoreError> {
        let books = self.books.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        Ok(books
            .values()
            .filter(|b| ids.contains(&b.id()))
            .cloned()
            .collect())
    }

    fn find_by_isbn(&self, isbn: &[&str]) -> Result<Vec<Book>, StoreError> {
        let books = self.books.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        Ok(books
            .values()
            .filter(|b| b.isbn().map(|i| isbn.contains(&i)).unwrap_or(false))
            .cloned()
            .collect())
    }

    fn find_featured(&self, limit: usize) -> Result<Vec<Book>, StoreError> {
        let books = self.books.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        Ok(books
            .values()
            .filter(|b| b.featured())
            .take(limit)
            .cloned()
            .collect())
    }

    fn save_books(&self, books: &[Book]) -> Result<Vec<Book>, StoreError> {
        let mut stored = self.books.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let mut saved = Vec::with_capacity(books.len());
        for book in books {
            let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            let book = book
                .to_builder()
                .id(id)
                .registered_at(chrono::Local::now().naive_local())
                .build()
                .map_err(|e| StoreError::ConvertError(e.to_string()))?;
            stored.insert(id, book.clone());
            saved.push(book);
        }

        Ok(saved)
    }
}
