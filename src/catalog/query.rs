use crate::catalog::{Book, SharedBookRepository, StoreError};
use crate::review::SharedReviewRepository;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    InvalidParameter(String),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Catalog sort keys.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SortKey {
    Title,
    Author,
    Price,
    Rating,
    PublishedDate,
}

impl SortKey {
    /// Parses a sort parameter. Unknown or empty values fall back to
    /// [`SortKey::Title`].
    ///
    /// # Example
    /// ```
    /// use book_shelf_rust::catalog::query::SortKey;
    ///
    /// assert_eq!(SortKey::from_param("price"), SortKey::Price);
    /// assert_eq!(SortKey::from_param("popularity"), SortKey::Title);
    /// ```
    pub fn from_param(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "title" => SortKey::Title,
            "author" => SortKey::Author,
            "price" => SortKey::Price,
            "rating" => SortKey::Rating,
            "date" => SortKey::PublishedDate,
            _ => SortKey::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses an order parameter. Anything other than `desc` is ascending.
    pub fn from_param(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "desc" => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// A validated catalog listing request. Pages are 1-indexed.
#[derive(Debug, Clone)]
pub struct BookQuery {
    page: usize,
    size: usize,
    search: Option<String>,
    genre: Option<String>,
    sort: SortKey,
    order: SortOrder,
}

impl BookQuery {
    pub fn builder() -> BookQueryBuilder {
        BookQueryBuilder::new()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

const DEFAULT_PAGE: usize = 1;
const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Default)]
pub struct BookQueryBuilder {
    page: Option<usize>,
    size: Option<usize>,
    search: Option<String>,
    genre: Option<String>,
    sort: Option<SortKey>,
    order: Option<SortOrder>,
}

impl BookQueryBuilder {
    pub fn new() -> Self {
        BookQueryBuilder::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn genre<S: Into<String>>(mut self, genre: S) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn build(self) -> Result<BookQuery, QueryError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        if page < 1 {
            return Err(QueryError::InvalidParameter("page must be greater than or equal to 1".to_string()));
        }

        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size < 1 {
            return Err(QueryError::InvalidParameter("size must be greater than or equal to 1".to_string()));
        }

        Ok(BookQuery {
            page,
            size,
            search: self.search,
            genre: self.genre,
            sort: self.sort.unwrap_or(SortKey::Title),
            order: self.order.unwrap_or(SortOrder::Asc),
        })
    }
}

/// One page of a catalog listing. `total` counts every match before
/// pagination, so callers can derive the page count.
#[derive(Debug)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub total: usize,
}

/// Serves filtered, sorted, paginated catalog listings.
///
/// Filtering and ordering happen here, over the full catalog, so every
/// storage backend shares a single query path. Rating order needs review
/// data; engines built without a review source order such requests by title
/// instead.
pub struct BookQueryEngine {
    catalog: SharedBookRepository,
    ratings: Option<SharedReviewRepository>,
}

impl BookQueryEngine {
    pub fn new(catalog: SharedBookRepository) -> Self {
        Self { catalog, ratings: None }
    }

    pub fn with_ratings(catalog: SharedBookRepository, reviews: SharedReviewRepository) -> Self {
        Self { catalog, ratings: Some(reviews) }
    }

    /// Lists the catalog page matching `query`. Filters combine as a
    /// conjunction; a page past the last match is an empty slice with the
    /// total preserved.
    pub fn list(&self, query: &BookQuery) -> Result<BookPage, StoreError> {
        let mut books = self.catalog.get_all()?;

        if let Some(genre) = query.genre() {
            books.retain(|b| b.has_genre(genre));
        }

        if let Some(term) = query.search() {
            let term = term.to_lowercase();
            books.retain(|b| {
                b.title().to_lowercase().contains(&term)
                    || b.author().to_lowercase().contains(&term)
                    || b.description().to_lowercase().contains(&term)
            });
        }

        let total = books.len();

        let ratings = match (query.sort(), &self.ratings) {
            (SortKey::Rating, Some(reviews)) => {
                let ids = books.iter().map(|b| b.id()).collect::<Vec<_>>();
                Some(reviews.average_ratings(&ids)?)
            }
            _ => None,
        };

        books.sort_by(|a, b| compare(a, b, query.sort(), query.order(), &ratings));

        let books = books
            .into_iter()
            .skip((query.page() - 1) * query.size())
            .take(query.size())
            .collect();

        Ok(BookPage { books, total })
    }

    /// Returns at most `limit` featured books.
    pub fn featured(&self, limit: usize) -> Result<Vec<Book>, StoreError> {
        self.catalog.find_featured(limit)
    }
}

// Equal primary keys fall back to id ascending regardless of direction, so
// repeated requests page through a stable order.
fn compare(
    a: &Book,
    b: &Book,
    sort: SortKey,
    order: SortOrder,
    ratings: &Option<HashMap<u64, f32>>,
) -> Ordering {
    let primary = match sort {
        SortKey::Title => compare_text(a.title(), b.title()),
        SortKey::Author => compare_text(a.author(), b.author()),
        SortKey::Price => a.price().total_cmp(&b.price()),
        SortKey::PublishedDate => a.published_date().cmp(&b.published_date()),
        SortKey::Rating => match ratings {
            Some(map) => rating_of(map, a).total_cmp(&rating_of(map, b)),
            None => compare_text(a.title(), b.title()),
        },
    };

    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };

    primary.then_with(|| a.id().cmp(&b.id()))
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn rating_of(ratings: &HashMap<u64, f32>, book: &Book) -> f32 {
    ratings.get(&book.id()).copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repo::memory::MemoryBookStore;
    use crate::catalog::{Book, BookRepository};
    use crate::review::repo::memory::MemoryReviewStore;
    use crate::review::{Review, ReviewRepository};
    use std::sync::Arc;

    fn book(title: &str, author: &str, description: &str, price: f64, genre: &str) -> Book {
        Book::builder()
            .title(title)
            .author(author)
            .description(description)
            .price(price)
            .add_genre(genre)
            .build()
            .unwrap()
    }

    fn seeded_engine(books: Vec<Book>) -> BookQueryEngine {
        let store = Arc::new(MemoryBookStore::new());
        store.save_books(&books).unwrap();
        BookQueryEngine::new(store)
    }

    fn query() -> BookQueryBuilder {
        BookQuery::builder()
    }

    #[test]
    fn price_ascending_orders_cheapest_first() {
        let engine = seeded_engine(vec![
            book("Atomic Habits", "James Clear", "Build good habits.", 18.99, "self-help"),
            book("Deep Work", "Cal Newport", "Focused success.", 16.99, "business"),
        ]);

        let page = engine
            .list(&query().sort(SortKey::Price).build().unwrap())
            .unwrap();

        assert_eq!(page.total, 2);
        let titles: Vec<&str> = page.books.iter().map(|b| b.title()).collect();
        assert_eq!(titles, vec!["Deep Work", "Atomic Habits"]);
    }

    #[test]
    fn search_matches_title_author_or_description() {
        let engine = seeded_engine(vec![
            book("Atomic Habits", "James Clear", "Build good habits.", 18.99, "self-help"),
            book("Deep Work", "Cal Newport", "Focused success.", 16.99, "business"),
            book("Educated", "Tara Westover", "A memoir about atomic families.", 14.99, "biography"),
        ]);

        let by_title = engine.list(&query().search("ATOMIC").build().unwrap()).unwrap();
        let matched: Vec<&str> = by_title.books.iter().map(|b| b.title()).collect();
        assert_eq!(matched, vec!["Atomic Habits", "Educated"]);
        assert_eq!(by_title.total, 2);

        let by_author = engine.list(&query().search("newport").build().unwrap()).unwrap();
        assert_eq!(by_author.total, 1);
        assert_eq!(by_author.books[0].title(), "Deep Work");
    }

    #[test]
    fn genre_filter_is_case_insensitive_membership() {
        let engine = seeded_engine(vec![
            book("Atomic Habits", "James Clear", "Build good habits.", 18.99, "self-help"),
            book("Deep Work", "Cal Newport", "Focused success.", 16.99, "business"),
        ]);

        let page = engine.list(&query().genre("Business").build().unwrap()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.books[0].title(), "Deep Work");
    }

    #[test]
    fn filters_combine_as_a_conjunction() {
        let engine = seeded_engine(vec![
            book("Atomic Habits", "James Clear", "Build good habits.", 18.99, "self-help"),
            book("Tiny Habits", "BJ Fogg", "Small changes.", 15.99, "self-help"),
            book("Deep Work", "Cal Newport", "Focused success.", 16.99, "business"),
        ]);

        let page = engine
            .list(&query().search("habits").genre("self-help").build().unwrap())
            .unwrap();
        assert_eq!(page.total, 2);

        let none = engine
            .list(&query().search("habits").genre("business").build().unwrap())
            .unwrap();
        assert_eq!(none.total, 0);
        assert!(none.books.is_empty());
    }

    #[test]
    fn pages_partition_the_match_set() {
        let engine = seeded_engine(vec![
            book("A", "a", "d", 1.0, "fiction"),
            book("B", "b", "d", 2.0, "fiction"),
            book("C", "c", "d", 3.0, "fiction"),
            book("D", "d", "d", 4.0, "fiction"),
            book("E", "e", "d", 5.0, "fiction"),
        ]);

        let mut seen = 0;
        for page_no in 1..=3 {
            let page = engine
                .list(&query().page(page_no).size(2).build().unwrap())
                .unwrap();
            assert_eq!(page.total, 5);
            seen += page.books.len();
        }
        assert_eq!(seen, 5);

        let past_end = engine.list(&query().page(9).size(2).build().unwrap()).unwrap();
        assert!(past_end.books.is_empty());
        assert_eq!(past_end.total, 5);
    }

    #[test]
    fn descending_price_never_increases() {
        let engine = seeded_engine(vec![
            book("A", "a", "d", 18.99, "fiction"),
            book("B", "b", "d", 24.99, "fiction"),
            book("C", "c", "d", 16.99, "fiction"),
            book("D", "d", "d", 24.99, "fiction"),
        ]);

        let page = engine
            .list(&query().sort(SortKey::Price).order(SortOrder::Desc).build().unwrap())
            .unwrap();

        let prices: Vec<f64> = page.books.iter().map(|b| b.price()).collect();
        for pair in prices.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn equal_sort_keys_break_ties_by_id_ascending() {
        let engine = seeded_engine(vec![
            book("B", "b", "d", 9.99, "fiction"),
            book("A", "a", "d", 9.99, "fiction"),
            book("C", "c", "d", 9.99, "fiction"),
        ]);

        let asc = engine.list(&query().sort(SortKey::Price).build().unwrap()).unwrap();
        let ids: Vec<u64> = asc.books.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let desc = engine
            .list(&query().sort(SortKey::Price).order(SortOrder::Desc).build().unwrap())
            .unwrap();
        let ids: Vec<u64> = desc.books.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn unknown_sort_param_falls_back_to_title() {
        assert_eq!(SortKey::from_param("relevance"), SortKey::Title);
        assert_eq!(SortKey::from_param(""), SortKey::Title);
        assert_eq!(SortKey::from_param("DATE"), SortKey::PublishedDate);
    }

    #[test]
    fn rating_sort_uses_average_review_rating() {
        let store = Arc::new(MemoryBookStore::new());
        store
            .save_books(&[
                book("Atomic Habits", "James Clear", "Build good habits.", 18.99, "self-help"),
                book("Deep Work", "Cal Newport", "Focused success.", 16.99, "business"),
            ])
            .unwrap();

        let reviews = Arc::new(MemoryReviewStore::new());
        for (book_id, rating) in [(1, 3), (2, 5), (2, 4)] {
            let review = Review::builder()
                .book_id(book_id)
                .user_id(1)
                .title("t")
                .content("c")
                .rating(rating)
                .build()
                .unwrap();
            reviews.save(review).unwrap();
        }

        let engine = BookQueryEngine::with_ratings(store, reviews);
        let page = engine
            .list(&query().sort(SortKey::Rating).order(SortOrder::Desc).build().unwrap())
            .unwrap();

        let titles: Vec<&str> = page.books.iter().map(|b| b.title()).collect();
        assert_eq!(titles, vec!["Deep Work", "Atomic Habits"]);
    }

    #[test]
    fn rating_sort_without_review_source_falls_back_to_title() {
        let engine = seeded_engine(vec![
            book("Zebra", "z", "d", 1.0, "fiction"),
            book("Apple", "a", "d", 2.0, "fiction"),
        ]);

        let page = engine.list(&query().sort(SortKey::Rating).build().unwrap()).unwrap();
        let titles: Vec<&str> = page.books.iter().map(|b| b.title()).collect();
        assert_eq!(titles, vec!["Apple", "Zebra"]);
    }

    #[test]
    fn builder_rejects_non_positive_page_and_size() {
        assert!(query().page(0).build().is_err());
        assert!(query().size(0).build().is_err());
        assert!(query().page(1).size(1).build().is_ok());
    }

    #[test]
    fn featured_listing_respects_limit() {
        let store = Arc::new(MemoryBookStore::new());
        let mut books = Vec::new();
        for (title, featured) in [("A", true), ("B", false), ("C", true), ("D", true)] {
            books.push(
                Book::builder()
                    .title(title)
                    .author("a")
                    .description("d")
                    .featured(featured)
                    .build()
                    .unwrap(),
            );
        }
        store.save_books(&books).unwrap();

        let engine = BookQueryEngine::new(store);
        let featured = engine.featured(2).unwrap();
        let titles: Vec<&str> = featured.iter().map(|b| b.title()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }
}
