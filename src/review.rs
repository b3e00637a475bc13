pub mod repo;

use crate::catalog::{DomainError, StoreError};
use crate::refine::{self, SharedRefiner};
use std::collections::HashMap;
use std::sync::Arc;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A user's review of a book. `refined_content` holds the AI-edited copy of
/// the text when refinement was requested and available.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    id: u64,
    book_id: u64,
    user_id: u64,
    title: String,
    content: String,
    rating: u8,
    refined_content: Option<String>,
    registered_at: Option<chrono::NaiveDateTime>,
}

impl Review {
    pub fn builder() -> ReviewBuilder {
        ReviewBuilder::new()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn book_id(&self) -> u64 {
        self.book_id
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn refined_content(&self) -> Option<&str> {
        self.refined_content.as_deref()
    }

    pub fn registered_at(&self) -> Option<chrono::NaiveDateTime> {
        self.registered_at
    }

    pub fn to_builder(&self) -> ReviewBuilder {
        let mut builder = ReviewBuilder::new()
            .id(self.id)
            .book_id(self.book_id)
            .user_id(self.user_id)
            .title(self.title.clone())
            .content(self.content.clone())
            .rating(self.rating);

        if let Some(refined) = &self.refined_content {
            builder = builder.refined_content(refined.clone());
        }
        if let Some(registered_at) = self.registered_at {
            builder = builder.registered_at(registered_at);
        }

        builder
    }
}

/// Review builder
#[derive(Debug, Clone, Default)]
pub struct ReviewBuilder {
    id: Option<u64>,
    book_id: Option<u64>,
    user_id: Option<u64>,
    title: Option<String>,
    content: Option<String>,
    rating: Option<u8>,
    refined_content: Option<String>,
    registered_at: Option<chrono::NaiveDateTime>,
}

impl ReviewBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn book_id(mut self, book_id: u64) -> Self {
        self.book_id = Some(book_id);
        self
    }

    pub fn user_id(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn refined_content<S: Into<String>>(mut self, refined_content: S) -> Self {
        self.refined_content = Some(refined_content.into());
        self
    }

    pub fn registered_at(mut self, registered_at: chrono::NaiveDateTime) -> Self {
        self.registered_at = Some(registered_at);
        self
    }

    pub fn build(self) -> Result<Review, DomainError> {
        let book_id = self.book_id.ok_or(DomainError::RequireArgumentMissing("book_id".to_owned()))?;
        let user_id = self.user_id.ok_or(DomainError::RequireArgumentMissing("user_id".to_owned()))?;
        let title = self.title.ok_or(DomainError::RequireArgumentMissing("title".to_owned()))?;
        let content = self.content.ok_or(DomainError::RequireArgumentMissing("content".to_owned()))?;

        let rating = self.rating.ok_or(DomainError::RequireArgumentMissing("rating".to_owned()))?;
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(DomainError::InvalidValue(format!(
                "rating must be between {} and {}: {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }

        Ok(Review {
            id: self.id.unwrap_or(0),
            book_id,
            user_id,
            title,
            content,
            rating,
            refined_content: self.refined_content,
            registered_at: self.registered_at,
        })
    }
}

pub type SharedReviewRepository = Arc<dyn ReviewRepository>;

/// Review storage
pub trait ReviewRepository: Send + Sync {

    /// Returns the reviews for a book, newest first.
    fn find_by_book(&self, book_id: u64) -> Result<Vec<Review>, StoreError>;

    /// Returns the reviews a user has written, newest first.
    fn find_by_user(&self, user_id: u64) -> Result<Vec<Review>, StoreError>;

    /// Stores a review. Identifier and registration timestamp are assigned
    /// by the store.
    fn save(&self, review: Review) -> Result<Review, StoreError>;

    /// Mean rating per book for the given identifiers. Books without reviews
    /// are absent from the result.
    fn average_ratings(&self, book_ids: &[u64]) -> Result<HashMap<u64, f32>, StoreError>;
}

/// Review submission and lookup, with best-effort text refinement.
pub struct ReviewService {
    reviews: SharedReviewRepository,
    refiner: Option<SharedRefiner>,
}

impl ReviewService {
    pub fn new(reviews: SharedReviewRepository) -> Self {
        Self { reviews, refiner: None }
    }

    pub fn with_refiner(reviews: SharedReviewRepository, refiner: SharedRefiner) -> Self {
        Self { reviews, refiner: Some(refiner) }
    }

    /// Stores the review. With `use_refinement` set and a refiner configured,
    /// the content is passed through the refiner first; a refinement failure
    /// falls back to the unedited text and never blocks the submission.
    pub fn submit(&self, review: Review, use_refinement: bool) -> Result<Review, StoreError> {
        let review = match (&self.refiner, use_refinement) {
            (Some(refiner), true) => {
                let refined = refine::refine_or_original(refiner.as_ref(), review.content());
                review
                    .to_builder()
                    .refined_content(refined)
                    .build()
                    .map_err(|e| StoreError::ConvertError(e.to_string()))?
            }
            _ => review,
        };

        self.reviews.save(review)
    }

    pub fn for_book(&self, book_id: u64) -> Result<Vec<Review>, StoreError> {
        self.reviews.find_by_book(book_id)
    }

    pub fn for_user(&self, user_id: u64) -> Result<Vec<Review>, StoreError> {
        self.reviews.find_by_user(user_id)
    }

    /// Mean rating for one book, `None` when it has no reviews yet.
    pub fn average_rating(&self, book_id: u64) -> Result<Option<f32>, StoreError> {
        let ratings = self.reviews.average_ratings(&[book_id])?;
        Ok(ratings.get(&book_id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::{Error as RefineError, Refiner};
    use crate::review::repo::memory::MemoryReviewStore;

    struct FixedRefiner(&'static str);

    impl Refiner for FixedRefiner {
        fn refine(&self, _content: &str) -> Result<String, RefineError> {
            Ok(self.0.to_owned())
        }
    }

    struct FailingRefiner;

    impl Refiner for FailingRefiner {
        fn refine(&self, _content: &str) -> Result<String, RefineError> {
            Err(RefineError::ConnectFailed("connection refused".to_owned()))
        }
    }

    fn review() -> Review {
        Review::builder()
            .book_id(1)
            .user_id(1)
            .title("A captivating journey")
            .content("i could not put it down")
            .rating(4)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_rejects_out_of_range_ratings() {
        for rating in [0, 6] {
            let result = Review::builder()
                .book_id(1)
                .user_id(1)
                .title("t")
                .content("c")
                .rating(rating)
                .build();
            assert!(result.is_err());
        }
    }

    #[test]
    fn submit_with_refiner_stores_the_refined_copy() {
        let service = ReviewService::with_refiner(
            Arc::new(MemoryReviewStore::new()),
            Arc::new(FixedRefiner("I could not put it down.")),
        );

        let saved = service.submit(review(), true).unwrap();
        assert_eq!(saved.content(), "i could not put it down");
        assert_eq!(saved.refined_content(), Some("I could not put it down."));
    }

    #[test]
    fn refinement_failure_falls_back_to_the_original_text() {
        let service = ReviewService::with_refiner(
            Arc::new(MemoryReviewStore::new()),
            Arc::new(FailingRefiner),
        );

        let saved = service.submit(review(), true).unwrap();
        assert_eq!(saved.refined_content(), Some("i could not put it down"));
    }

    #[test]
    fn submit_without_refiner_or_opt_in_keeps_the_review_as_is() {
        let store = Arc::new(MemoryReviewStore::new());
        let plain = ReviewService::new(store.clone());
        let saved = plain.submit(review(), true).unwrap();
        assert!(saved.refined_content().is_none());

        let opted_out = ReviewService::with_refiner(store, Arc::new(FixedRefiner("edited")));
        let saved = opted_out.submit(review(), false).unwrap();
        assert!(saved.refined_content().is_none());
    }

    #[test]
    fn listings_come_back_newest_first() {
        let service = ReviewService::new(Arc::new(MemoryReviewStore::new()));

        for (book_id, user_id) in [(1, 1), (1, 2), (2, 1)] {
            let review = Review::builder()
                .book_id(book_id)
                .user_id(user_id)
                .title("t")
                .content("c")
                .rating(4)
                .build()
                .unwrap();
            service.submit(review, false).unwrap();
        }

        let by_book: Vec<u64> = service.for_book(1).unwrap().iter().map(|r| r.id()).collect();
        assert_eq!(by_book, vec![2, 1]);

        let by_user: Vec<u64> = service.for_user(1).unwrap().iter().map(|r| r.id()).collect();
        assert_eq!(by_user, vec![3, 1]);
    }

    #[test]
    fn average_rating_reflects_all_reviews_for_the_book() {
        let store = Arc::new(MemoryReviewStore::new());
        let service = ReviewService::new(store);

        for rating in [3, 4] {
            let review = Review::builder()
                .book_id(7)
                .user_id(1)
                .title("t")
                .content("c")
                .rating(rating)
                .build()
                .unwrap();
            service.submit(review, false).unwrap();
        }

        assert_eq!(service.average_rating(7).unwrap(), Some(3.5));
        assert_eq!(service.average_rating(8).unwrap(), None);
    }
}
