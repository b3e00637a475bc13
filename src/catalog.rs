pub mod query;
pub mod repo;

use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Errors raised while constructing or converting domain values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required attribute was not provided.
    RequireArgumentMissing(String),

    /// An enum code string did not match any known variant.
    UnknownCode(String),

    /// A value was outside its allowed range.
    InvalidValue(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Errors raised by a storage backend. Backend failures are propagated to the
/// caller unchanged; no retries or recovery happen at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    ConnectError(String),

    ExecuteError(String),

    ConvertError(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Catalog entry. Identifiers are assigned by the store on first save and are
/// immutable afterwards; everything else is read-only for this core once the
/// book has been imported.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    id: u64,
    title: String,
    author: String,
    description: String,
    cover_image: Option<String>,
    price: f64,
    genres: Vec<String>,
    featured: bool,
    published_date: Option<chrono::NaiveDate>,
    publisher: Option<String>,
    pages: Option<u32>,
    language: Option<String>,
    isbn: Option<String>,
    registered_at: Option<chrono::NaiveDateTime>,
}

impl Book {
    pub fn builder() -> BookBuilder {
        BookBuilder::new()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref()
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Case-insensitive membership test against the genre tag set.
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }

    pub fn featured(&self) -> bool {
        self.featured
    }

    pub fn published_date(&self) -> Option<chrono::NaiveDate> {
        self.published_date
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn pages(&self) -> Option<u32> {
        self.pages
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    pub fn registered_at(&self) -> Option<chrono::NaiveDateTime> {
        self.registered_at
    }

    pub fn to_builder(&self) -> BookBuilder {
        let mut builder = BookBuilder::new()
            .id(self.id)
            .title(self.title.clone())
            .author(self.author.clone())
            .description(self.description.clone())
            .price(self.price)
            .genres(self.genres.clone())
            .featured(self.featured);

        if let Some(cover_image) = &self.cover_image {
            builder = builder.cover_image(cover_image.clone());
        }
        if let Some(published_date) = self.published_date {
            builder = builder.published_date(published_date);
        }
        if let Some(publisher) = &self.publisher {
            builder = builder.publisher(publisher.clone());
        }
        if let Some(pages) = self.pages {
            builder = builder.pages(pages);
        }
        if let Some(language) = &self.language {
            builder = builder.language(language.clone());
        }
        if let Some(isbn) = &self.isbn {
            builder = builder.isbn(isbn.clone());
        }
        if let Some(registered_at) = self.registered_at {
            builder = builder.registered_at(registered_at);
        }

        builder
    }
}

impl AsRef<Book> for Book {
    fn as_ref(&self) -> &Book {
        self
    }
}

/// Book builder
#[derive(Debug, Clone, Default)]
pub struct BookBuilder {
    id: Option<u64>,
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    cover_image: Option<String>,
    price: Option<f64>,
    genres: Vec<String>,
    featured: bool,
    published_date: Option<chrono::NaiveDate>,
    publisher: Option<String>,
    pages: Option<u32>,
    language: Option<String>,
    isbn: Option<String>,
    registered_at: Option<chrono::NaiveDateTime>,
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn cover_image<S: Into<String>>(mut self, cover_image: S) -> Self {
        self.cover_image = Some(cover_image.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn genres(mut self, genres: Vec<String>) -> Self {
        self.genres = genres;
        self
    }

    pub fn add_genre<S: Into<String>>(mut self, genre: S) -> Self {
        self.genres.push(genre.into());
        self
    }

    pub fn featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    pub fn published_date(mut self, date: chrono::NaiveDate) -> Self {
        self.published_date = Some(date);
        self
    }

    pub fn publisher<S: Into<String>>(mut self, publisher: S) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn pages(mut self, pages: u32) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn isbn<S: Into<String>>(mut self, isbn: S) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn registered_at(mut self, registered_at: chrono::NaiveDateTime) -> Self {
        self.registered_at = Some(registered_at);
        self
    }

    pub fn build(self) -> Result<Book, DomainError> {
        let title = self.title.ok_or(DomainError::RequireArgumentMissing("title".to_owned()))?;
        let author = self.author.ok_or(DomainError::RequireArgumentMissing("author".to_owned()))?;
        let description = self.description.ok_or(DomainError::RequireArgumentMissing("description".to_owned()))?;

        Ok(Book {
            id: self.id.unwrap_or(0),
            title,
            author,
            description,
            cover_image: self.cover_image,
            price: self.price.unwrap_or(0.0),
            genres: self.genres,
            featured: self.featured,
            published_date: self.published_date,
            publisher: self.publisher,
            pages: self.pages,
            language: self.language.or_else(|| Some("English".to_owned())),
            isbn: self.isbn,
            registered_at: self.registered_at,
        })
    }
}

pub type SharedBookRepository = Arc<dyn BookRepository>;

/// Book storage
pub trait BookRepository: Send + Sync {

    /// Returns the whole catalog in identifier order.
    fn get_all(&self) -> Result<Vec<Book>, StoreError>;

    /// Finds a single book by identifier.
    fn find_by_id(&self, id: u64) -> Result<Option<Book>, StoreError>;

    /// Finds the books with the given identifiers. Identifiers that do not
    /// resolve are simply absent from the result.
    fn find_by_ids(&self, ids: &[u64]) -> Result<Vec<Book>, StoreError>;

    /// Finds the books carrying one of the given ISBNs.
    fn find_by_isbn(&self, isbn: &[&str]) -> Result<Vec<Book>, StoreError>;

    /// Returns at most `limit` featured books in identifier order.
    fn find_featured(&self, limit: usize) -> Result<Vec<Book>, StoreError>;

    /// Stores the given books. Identifiers and registration timestamps are
    /// assigned by the store; the stored books are returned.
    fn save_books(&self, books: &[Book]) -> Result<Vec<Book>, StoreError>;
}
