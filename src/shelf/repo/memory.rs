use crate::catalog::StoreError;
use crate::shelf::{ReadingStatus, ShelfEntry, ShelfRepository};
use std::sync::Mutex;

/// Vec-backed reading-list store. Entries keep their position across status
/// updates, so per-user iteration order is insertion order by construction.
pub struct MemoryShelfStore {
    entries: Mutex<Vec<ShelfEntry>>,
}

impl MemoryShelfStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryShelfStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShelfRepository for MemoryShelfStore {
    fn upsert_status(&self, user_id: u64, book_id: u64, status: ReadingStatus) -> Result<ShelfEntry, StoreError> {
        let mut entries = self.entries.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;

        if let Some(existing) = entries
            .iter_mut()
            .find(|e| e.user_id() == user_id && e.book_id() == book_id)
        {
            *existing = existing.with_status(status);
            return Ok(existing.clone());
        }

        let entry = ShelfEntry::new(user_id, book_id, status, chrono::Local::now().naive_local());
        entries.push(entry.clone());
        Ok(entry)
    }

    fn delete(&self, user_id: u64, book_id: u64) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let before = entries.len();
        entries.retain(|e| !(e.user_id() == user_id && e.book_id() == book_id));
        Ok(entries.len() < before)
    }

    fn find_by_user(&self, user_id: u64) -> Result<Vec<ShelfEntry>, StoreError> {
        let entries = self.entries.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        Ok(entries
            .iter()
            .filter(|e| e.user_id() == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_status_but_keeps_added_at() {
        let store = MemoryShelfStore::new();

        let first = store.upsert_status(1, 1, ReadingStatus::WantToRead).unwrap();
        let second = store.upsert_status(1, 1, ReadingStatus::Completed).unwrap();

        assert_eq!(second.status(), ReadingStatus::Completed);
        assert_eq!(second.added_at(), first.added_at());
        assert_eq!(store.find_by_user(1).unwrap().len(), 1);
    }

    #[test]
    fn delete_reports_whether_an_entry_existed() {
        let store = MemoryShelfStore::new();

        assert!(!store.delete(1, 1).unwrap());
        store.upsert_status(1, 1, ReadingStatus::Reading).unwrap();
        assert!(store.delete(1, 1).unwrap());
        assert!(store.find_by_user(1).unwrap().is_empty());
    }

    #[test]
    fn entries_are_scoped_per_user() {
        let store = MemoryShelfStore::new();

        store.upsert_status(1, 1, ReadingStatus::Reading).unwrap();
        store.upsert_status(2, 1, ReadingStatus::Completed).unwrap();

        let first = store.find_by_user(1).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].status(), ReadingStatus::Reading);

        let second = store.find_by_user(2).unwrap();
        assert_eq!(second[0].status(), ReadingStatus::Completed);
    }
}
