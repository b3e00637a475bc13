use crate::account::repo::{MemoryUserStore, UserPgStore};
use crate::account::SharedUserRepository;
use crate::catalog::query::BookQueryEngine;
use crate::catalog::repo::{BookPgStore, MemoryBookStore};
use crate::catalog::SharedBookRepository;
use crate::refine::SharedRefiner;
use crate::review::repo::{MemoryReviewStore, ReviewPgStore};
use crate::review::{ReviewService, SharedReviewRepository};
use crate::shelf::repo::{MemoryShelfStore, ShelfPgStore};
use crate::shelf::{ReadingListStore, SharedShelfRepository};
use diesel::r2d2::ConnectionManager;
use diesel::PgConnection;
use r2d2::Pool;
use std::sync::Arc;
use tracing::warn;

pub mod account;
pub mod catalog;
pub mod config;
pub mod refine;
pub mod review;
pub mod seed;
pub mod shelf;

/// The application's component bundle. Every store is constructed once and
/// injected here; nothing in the crate reaches for shared global state.
pub struct Services {
    pub books: BookQueryEngine,
    pub shelf: ReadingListStore,
    pub reviews: ReviewService,
    pub accounts: SharedUserRepository,
    pub catalog: SharedBookRepository,
}

/// Wires the production deployment: every aggregate backed by PostgreSQL,
/// review refinement enabled when credentials are present.
pub fn create_postgres_services(
    pool: Pool<ConnectionManager<PgConnection>>,
    refine_settings: &config::Refine,
) -> Services {
    let catalog: SharedBookRepository = Arc::new(BookPgStore::new(pool.clone()));
    let reviews: SharedReviewRepository = Arc::new(ReviewPgStore::new(pool.clone()));
    let shelf: SharedShelfRepository = Arc::new(ShelfPgStore::new(pool.clone()));
    let accounts: SharedUserRepository = Arc::new(UserPgStore::new(pool));

    let refiner = create_refiner(refine_settings);

    build_services(catalog, reviews, shelf, accounts, refiner)
}

/// Wires the in-memory deployment used by tests and local development. No
/// refiner is attached; review submission simply keeps the original text.
pub fn create_memory_services() -> Services {
    let catalog: SharedBookRepository = Arc::new(MemoryBookStore::new());
    let reviews: SharedReviewRepository = Arc::new(MemoryReviewStore::new());
    let shelf: SharedShelfRepository = Arc::new(MemoryShelfStore::new());
    let accounts: SharedUserRepository = Arc::new(MemoryUserStore::new());

    build_services(catalog, reviews, shelf, accounts, None)
}

fn create_refiner(settings: &config::Refine) -> Option<SharedRefiner> {
    match refine::openai::Client::new_with_env(settings) {
        Ok(client) => Some(Arc::new(client)),
        Err(_) => {
            warn!("OPENAI_API_KEY is not set or empty, review refinement disabled");
            None
        }
    }
}

fn build_services(
    catalog: SharedBookRepository,
    reviews: SharedReviewRepository,
    shelf: SharedShelfRepository,
    accounts: SharedUserRepository,
    refiner: Option<SharedRefiner>,
) -> Services {
    let books = BookQueryEngine::with_ratings(catalog.clone(), reviews.clone());
    let reading_list = ReadingListStore::new(shelf, catalog.clone());
    let review_service = match refiner {
        Some(refiner) => ReviewService::with_refiner(reviews, refiner),
        None => ReviewService::new(reviews),
    };

    Services {
        books,
        shelf: reading_list,
        reviews: review_service,
        accounts,
        catalog,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::query::{BookQuery, SortKey, SortOrder};
    use crate::catalog::{Book, BookRepository};
    use crate::shelf::ReadingStatus;

    #[test]
    fn memory_services_cover_the_main_flows_end_to_end() {
        let services = create_memory_services();

        let books = vec![
            Book::builder()
                .title("Atomic Habits")
                .author("James Clear")
                .description("Tiny changes, remarkable results.")
                .price(18.99)
                .add_genre("self-help")
                .build()
                .unwrap(),
            Book::builder()
                .title("Deep Work")
                .author("Cal Newport")
                .description("Rules for focused success in a distracted world.")
                .price(16.99)
                .add_genre("business")
                .build()
                .unwrap(),
        ];
        services.catalog.save_books(&books).unwrap();

        let page = services
            .books
            .list(
                &BookQuery::builder()
                    .sort(SortKey::Price)
                    .order(SortOrder::Asc)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.books[0].title(), "Deep Work");

        services.shelf.set_status(1, 1, ReadingStatus::Reading).unwrap();
        let shelves = services.shelf.get_for_user(1).unwrap();
        assert_eq!(shelves.reading.len(), 1);
        assert_eq!(shelves.reading[0].title(), "Atomic Habits");
    }
}
