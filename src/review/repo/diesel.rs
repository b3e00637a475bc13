use crate::catalog::StoreError;
use crate::review::{Review, ReviewRepository};
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use r2d2::Pool;
use std::collections::HashMap;

mod schema;

#[derive(Queryable, Selectable)]
#[diesel(table_name = schema::bookshelf::review)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewEntity {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub rating: i32,
    pub refined_content: Option<String>,
    pub registered_at: chrono::NaiveDateTime,
}

impl ReviewEntity {
    fn to_domain(&self) -> Result<Review, StoreError> {
        let mut builder = Review::builder()
            .id(self.id as u64)
            .book_id(self.book_id as u64)
            .user_id(self.user_id as u64)
            .title(self.title.clone())
            .content(self.content.clone())
            .rating(self.rating as u8)
            .registered_at(self.registered_at);

        if let Some(refined) = &self.refined_content {
            builder = builder.refined_content(refined.clone());
        }

        builder.build().map_err(|e| StoreError::ConvertError(e.to_string()))
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::bookshelf::review)]
struct NewReviewRow<'a> {
    book_id: i64,
    user_id: i64,
    title: &'a str,
    content: &'a str,
    rating: i32,
    refined_content: Option<&'a str>,
    registered_at: chrono::NaiveDateTime,
}

impl<'a, 'b> NewReviewRow<'a>
where
    'b: 'a,
{
    fn from(review: &'b Review) -> Self {
        Self {
            book_id: review.book_id() as i64,
            user_id: review.user_id() as i64,
            title: review.title(),
            content: review.content(),
            rating: review.rating() as i32,
            refined_content: review.refined_content(),
            registered_at: chrono::Local::now().naive_local(),
        }
    }
}

pub struct ReviewPgStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl ReviewPgStore {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl ReviewRepository for ReviewPgStore {
    fn find_by_book(&self, target_book: u64) -> Result<Vec<Review>, StoreError> {
        use schema::bookshelf::review::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let entities = review
            .filter(book_id.eq(target_book as i64))
            .order_by(registered_at.desc())
            .then_order_by(id.desc())
            .select(ReviewEntity::as_select())
            .load(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        entities.iter().map(|e| e.to_domain()).collect()
    }

    fn find_by_user(&self, target_user: u64) -> Result<Vec<Review>, StoreError> {
        use schema::bookshelf::review::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let entities = review
            .filter(user_id.eq(target_user as i64))
            .order_by(registered_at.desc())
            .then_order_by(id.desc())
            .select(ReviewEntity::as_select())
            .load(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        entities.iter().map(|e| e.to_domain()).collect()
    }

    fn save(&self, target: Review) -> Result<Review, StoreError> {
        use schema::bookshelf::review;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let entity = diesel::insert_into(review::table)
            .values(NewReviewRow::from(&target))
            .returning(ReviewEntity::as_select())
            .get_result(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        entity.to_domain()
    }

    fn average_ratings(&self, book_ids: &[u64]) -> Result<HashMap<u64, f32>, StoreError> {
        use schema::bookshelf::review::dsl::*;

        let targets = book_ids.iter().map(|v| *v as i64).collect::<Vec<i64>>();

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let rows = review
            .filter(book_id.eq_any(targets))
            .select((book_id, rating))
            .load::<(i64, i32)>(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        let mut sums: HashMap<u64, (u32, u32)> = HashMap::new();
        for (target_book, value) in rows {
            let entry = sums.entry(target_book as u64).or_insert((0, 0));
            entry.0 += value as u32;
            entry.1 += 1;
        }

        Ok(sums
            .into_iter()
            .map(|(target_book, (sum, count))| (target_book, sum as f32 / count as f32))
            .collect())
    }
}
