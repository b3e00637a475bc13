use crate::catalog::StoreError;
use crate::review::{Review, ReviewRepository};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Map-backed review store.
pub struct MemoryReviewStore {
    reviews: Mutex<Vec<Review>>,
    sequence: AtomicU64,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self {
            reviews: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
        }
    }
}

impl Default for MemoryReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewRepository for MemoryReviewStore {
    fn find_by_book(&self, book_id: u64) -> Result<Vec<Review>, StoreError> {
        let reviews = self.reviews.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let mut matched = reviews
            .iter()
            .filter(|r| r.book_id() == book_id)
            .cloned()
            .collect::<Vec<_>>();
        matched.reverse();
        Ok(matched)
    }

    fn find_by_user(&self, user_id: u64) -> Result<Vec<Review>, StoreError> {
        let reviews = self.reviews.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let mut matched = reviews
            .iter()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect::<Vec<_>>();
        matched.reverse();
        Ok(matched)
    }

    fn save(&self, review: Review) -> Result<Review, StoreError> {
        let mut reviews = self.reviews.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let review = review
            .to_builder()
            .id(id)
            .registered_at(chrono::Local::now().naive_local())
            .build()
            .map_err(|e| StoreError::ConvertError(e.to_string()))?;

        reviews.push(review.clone());
        Ok(review)
    }

    fn average_ratings(&self, book_ids: &[u64]) -> Result<HashMap<u64, f32>, StoreError> {
        let reviews = self.reviews.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let mut sums: HashMap<u64, (u32, u32)> = HashMap::new();
        for review in reviews.iter().filter(|r| book_ids.contains(&r.book_id())) {
            let entry = sums.entry(review.book_id()).or_insert((0, 0));
            entry.0 += review.rating() as u32;
            entry.1 += 1;
        }

        Ok(sums
            .into_iter()
            .map(|(book_id, (sum, count))| (book_id, sum as f32 / count as f32))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(book_id: u64, user_id: u64, rating: u8) -> Review {
        Review::builder()
            .book_id(book_id)
            .user_id(user_id)
            .title("title")
            .content("content")
            .rating(rating)
            .build()
            .unwrap()
    }

    #[test]
    fn book_listing_is_newest_first() {
        let store = MemoryReviewStore::new();
        store.save(review(1, 1, 3)).unwrap();
        store.save(review(1, 2, 5)).unwrap();
        store.save(review(2, 1, 4)).unwrap();

        let listed = store.find_by_book(1).unwrap();
        let ids: Vec<u64> = listed.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn average_ratings_cover_only_requested_books() {
        let store = MemoryReviewStore::new();
        store.save(review(1, 1, 2)).unwrap();
        store.save(review(1, 2, 4)).unwrap();
        store.save(review(2, 1, 5)).unwrap();

        let averages = store.average_ratings(&[1]).unwrap();
        assert_eq!(averages.get(&1), Some(&3.0));
        assert!(!averages.contains_key(&2));
    }
}
