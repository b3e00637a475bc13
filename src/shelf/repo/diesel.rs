use crate::catalog::StoreError;
use crate::shelf::{ReadingStatus, ShelfEntry, ShelfRepository};
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use r2d2::Pool;

mod schema;

#[derive(Queryable, Selectable)]
#[diesel(table_name = schema::bookshelf::shelf_entry)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShelfEntryEntity {
    pub user_id: i64,
    pub book_id: i64,
    pub status: String,
    pub added_at: chrono::NaiveDateTime,
}

impl ShelfEntryEntity {
    fn to_domain(&self) -> Result<ShelfEntry, StoreError> {
        let status = ReadingStatus::try_from(self.status.as_str())
            .map_err(|e| StoreError::ConvertError(e.to_string()))?;

        Ok(ShelfEntry::new(
            self.user_id as u64,
            self.book_id as u64,
            status,
            self.added_at,
        ))
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::bookshelf::shelf_entry)]
struct NewShelfEntryRow<'a> {
    user_id: i64,
    book_id: i64,
    status: &'a str,
    added_at: chrono::NaiveDateTime,
}

pub struct ShelfPgStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl ShelfPgStore {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl ShelfRepository for ShelfPgStore {
    fn upsert_status(&self, target_user: u64, target_book: u64, target_status: ReadingStatus) -> Result<ShelfEntry, StoreError> {
        use schema::bookshelf::shelf_entry::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let row = NewShelfEntryRow {
            user_id: target_user as i64,
            book_id: target_book as i64,
            status: target_status.to_code_str(),
            added_at: chrono::Local::now().naive_local(),
        };

        // The conflict path only touches the status column; added_at keeps
        // its first-insert value.
        let entity = diesel::insert_into(shelf_entry)
            .values(&row)
            .on_conflict((user_id, book_id))
            .do_update()
            .set(status.eq(target_status.to_code_str()))
            .returning(ShelfEntryEntity::as_select())
            .get_result(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        entity.to_domain()
    }

    fn delete(&self, target_user: u64, target_book: u64) -> Result<bool, StoreError> {
        use schema::bookshelf::shelf_entry::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let deleted = diesel::delete(
            shelf_entry
                .filter(user_id.eq(target_user as i64))
                .filter(book_id.eq(target_book as i64)),
        )
        .execute(&mut connection)
        .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        Ok(deleted > 0)
    }

    fn find_by_user(&self, target_user: u64) -> Result<Vec<ShelfEntry>, StoreError> {
        use schema::bookshelf::shelf_entry::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let entities = shelf_entry
            .filter(user_id.eq(target_user as i64))
            .order_by((added_at.asc(), book_id.asc()))
            .select(ShelfEntryEntity::as_select())
            .load(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        entities.iter().map(|e| e.to_domain()).collect()
    }
}
