use crate::catalog::{Book, SharedBookRepository, StoreError};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use tracing::info;

const WRITE_SIZE: usize = 100;

#[derive(Debug)]
pub enum SeedError {
    /// The catalog file could not be read.
    ReadFailed(String),

    /// The catalog file did not hold valid book records.
    ParseFailed(String),

    /// The repository rejected the write.
    WriteFailed(StoreError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::ReadFailed(s) => write!(f, "Failed to read catalog file: {}", s),
            SeedError::ParseFailed(s) => write!(f, "Failed to parse catalog file: {}", s),
            SeedError::WriteFailed(e) => write!(f, "Failed to write catalog: {}", e),
        }
    }
}

/// One book record of a catalog seed file.
#[derive(Debug, Deserialize)]
pub struct SeedBook {
    title: String,
    author: String,
    description: String,
    cover_image: Option<String>,
    price: Option<f64>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    featured: bool,
    published_date: Option<String>,
    publisher: Option<String>,
    pages: Option<u32>,
    language: Option<String>,
    isbn: Option<String>,
}

impl SeedBook {
    fn to_domain(&self) -> Result<Book, SeedError> {
        let mut builder = Book::builder()
            .title(self.title.clone())
            .author(self.author.clone())
            .description(self.description.clone())
            .genres(self.genres.clone())
            .featured(self.featured);

        if let Some(cover_image) = &self.cover_image {
            builder = builder.cover_image(cover_image.clone());
        }
        if let Some(price) = self.price {
            builder = builder.price(price);
        }
        if let Some(raw) = &self.published_date {
            let date = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| SeedError::ParseFailed(format!("invalid published_date '{}': {}", raw, e)))?;
            builder = builder.published_date(date);
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

        builder.build().map_err(|e| SeedError::ParseFailed(e.to_string()))
    }
}

/// Parses a JSON array of seed records into domain books.
pub fn parse_catalog(json: &str) -> Result<Vec<Book>, SeedError> {
    let seeds = serde_json::from_str::<Vec<SeedBook>>(json)
        .map_err(|e| SeedError::ParseFailed(e.to_string()))?;

    seeds.iter().map(|s| s.to_domain()).collect()
}

pub fn read_catalog(path: &Path) -> Result<Vec<Book>, SeedError> {
    let text = fs::read_to_string(path)
        .map_err(|e| SeedError::ReadFailed(format!("{}: {}", path.display(), e)))?;

    parse_catalog(&text)
}

/// Writes seed books into the catalog, skipping records whose ISBN is
/// already present so the import can be re-run safely.
pub struct CatalogSeeder {
    repository: SharedBookRepository,
}

impl CatalogSeeder {
    pub fn new(repository: SharedBookRepository) -> Self {
        Self { repository }
    }

    /// Returns the number of books actually written.
    pub fn seed(&self, books: &[Book]) -> Result<usize, SeedError> {
        let isbn = books.iter().filter_map(|b| b.isbn()).collect::<Vec<&str>>();
        let existing = self.repository.find_by_isbn(&isbn)
            .map_err(SeedError::WriteFailed)?
            .iter()
            .filter_map(|b| b.isbn().map(str::to_owned))
            .collect::<HashSet<String>>();

        let new_books = books.iter()
            .filter(|b| b.isbn().map(|i| !existing.contains(i)).unwrap_or(true))
            .cloned()
            .collect::<Vec<Book>>();

        let mut written = 0;
        for chunk in new_books.chunks(WRITE_SIZE) {
            written += self.repository.save_books(chunk)
                .map_err(SeedError::WriteFailed)?
                .len();
        }

        info!(total = books.len(), written, "catalog seed finished");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repo::memory::MemoryBookStore;
    use crate::catalog::BookRepository;
    use std::sync::Arc;

    const CATALOG: &str = r#"[
        {
            "title": "Atomic Habits",
            "author": "James Clear",
            "description": "Tiny changes, remarkable results.",
            "price": 18.99,
            "genres": ["self-help"],
            "featured": true,
            "published_date": "2018-10-16",
            "publisher": "Penguin Random House",
            "pages": 320,
            "isbn": "978-0735211292"
        },
        {
            "title": "Deep Work",
            "author": "Cal Newport",
            "description": "Rules for focused success in a distracted world.",
            "price": 16.99,
            "genres": ["business"],
            "isbn": "978-1455586691"
        }
    ]"#;

    #[test]
    fn parses_seed_records_into_domain_books() {
        let books = parse_catalog(CATALOG).unwrap();

        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title(), "Atomic Habits");
        assert_eq!(books[0].published_date().unwrap().to_string(), "2018-10-16");
        assert!(books[0].featured());
        assert!(!books[1].featured());
        assert_eq!(books[1].language(), Some("English"));
    }

    #[test]
    fn rejects_malformed_dates() {
        let json = r#"[{"title": "t", "author": "a", "description": "d", "published_date": "16/10/2018"}]"#;
        assert!(parse_catalog(json).is_err());
    }

    #[test]
    fn reseeding_does_not_duplicate_books() {
        let store = Arc::new(MemoryBookStore::new());
        let seeder = CatalogSeeder::new(store.clone());
        let books = parse_catalog(CATALOG).unwrap();

        assert_eq!(seeder.seed(&books).unwrap(), 2);
        assert_eq!(seeder.seed(&books).unwrap(), 0);
        assert_eq!(store.get_all().unwrap().len(), 2);
    }
}
