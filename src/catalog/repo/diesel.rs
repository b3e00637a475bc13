use crate::catalog::{Book, BookRepository, StoreError};
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use r2d2::Pool;

mod schema;

#[derive(Queryable, Selectable)]
#[diesel(table_name = schema::bookshelf::book)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookEntity {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub price: f64,
    pub genres: Vec<String>,
    pub featured: bool,
    pub published_date: Option<chrono::NaiveDate>,
    pub publisher: Option<String>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub isbn: Option<String>,
    pub registered_at: chrono::NaiveDateTime,
}

impl BookEntity {
    fn to_domain(&self) -> Result<Book, StoreError> {
        let mut builder = Book::builder()
            .id(self.id as u64)
            .title(self.title.clone())
            .author(self.author.clone())
            .description(self.description.clone())
            .price(self.price)
            .genres(self.genres.clone())
            .featured(self.featured)
            .registered_at(self.registered_at);

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
            builder = builder.pages(pages as u32);
        }
        if let Some(language) = &self.language {
            builder = builder.language(language.clone());
        }
        if let Some(isbn) = &self.isbn {
            builder = builder.isbn(isbn.clone());
        }

        builder.build().map_err(|e| StoreError::ConvertError(e.to_string()))
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::bookshelf::book)]
pub struct NewBookRow<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub description: &'a str,
    pub cover_image: Option<&'a str>,
    pub price: f64,
    pub genres: Vec<String>,
    pub featured: bool,
    pub published_date: Option<chrono::NaiveDate>,
    pub publisher: Option<&'a str>,
    pub pages: Option<i32>,
    pub language: Option<&'a str>,
    pub isbn: Option<&'a str>,
    pub registered_at: chrono::NaiveDateTime,
}

impl<'a, 'b> NewBookRow<'a>
where
    'b: 'a,
{
    pub fn from(book: &'b Book) -> Self {
        Self {
            title: book.title(),
            author: book.author(),
            description: book.description(),
            cover_image: book.cover_image(),
            price: book.price(),
            genres: book.genres().to_vec(),
            featured: book.featured(),
            published_date: book.published_date(),
            publisher: book.publisher(),
            pages: book.pages().map(|p| p as i32),
            language: book.language(),
            isbn: book.isbn(),
            registered_at: chrono::Local::now().naive_local(),
        }
    }
}

pub struct BookPgStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl BookPgStore {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    fn to_domain_all(entities: Vec<BookEntity>) -> Result<Vec<Book>, StoreError> {
        entities.iter().map(|e| e.to_domain()).collect()
    }
}

impl BookRepository for BookPgStore {
    fn get_all(&self) -> Result<Vec<Book>, StoreError> {
        use schema::bookshelf::book::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let entities = book
            .order_by(id.asc())
            .select(BookEntity::as_select())
            .load(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        Self::to_domain_all(entities)
    }

    fn find_by_id(&self, book_id: u64) -> Result<Option<Book>, StoreError> {
        use schema::bookshelf::book::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let entity = book
            .filter(id.eq(book_id as i64))
            .select(BookEntity::as_select())
            .first(&mut connection)
            .optional()
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        entity.map(|e| e.to_domain()).transpose()
    }

    fn find_by_ids(&self, ids: &[u64]) -> Result<Vec<Book>, StoreError> {
        use schema::bookshelf::book::dsl::{book, id};

        let targets = ids.iter().map(|v| *v as i64).collect::<Vec<i64>>();

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let entities = book
            .filter(id.eq_any(targets))
            .order_by(id.asc())
            .select(BookEntity::as_select())
            .load(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        Self::to_domain_all(entities)
    }

    fn find_by_isbn(&self, isbn: &[&str]) -> Result<Vec<Book>, StoreError> {
        use schema::bookshelf::book::dsl::isbn as db_isbn;
        use schema::bookshelf::book::dsl::{book, id};

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let entities = book
            .filter(db_isbn.eq_any(isbn))
            .order_by(id.asc())
            .select(BookEntity::as_select())
            .load(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        Self::to_domain_all(entities)
    }

    fn find_featured(&self, limit: usize) -> Result<Vec<Book>, StoreError> {
        use schema::bookshelf::book::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let entities = book
            .filter(featured.eq(true))
            .order_by(id.asc())
            .limit(limit as i64)
            .select(BookEntity::as_select())
            .load(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        Self::to_domain_all(entities)
    }

    fn save_books(&self, books: &[Book]) -> Result<Vec<Book>, StoreError> {
        use schema::bookshelf::book;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let rows = books.iter()
            .map(NewBookRow::from)
            .collect::<Vec<_>>();

        let entities = diesel::insert_into(book::table)
            .values(rows)
            .returning(BookEntity::as_select())
            .get_results(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        Self::to_domain_all(entities)
    }
}
