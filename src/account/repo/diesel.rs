use crate::account::{User, UserRepository};
use crate::catalog::StoreError;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use r2d2::Pool;

mod schema;

#[derive(Queryable, Selectable)]
#[diesel(table_name = schema::bookshelf::account)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserEntity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub registered_at: chrono::NaiveDateTime,
}

impl UserEntity {
    fn to_domain(&self) -> Result<User, StoreError> {
        let mut builder = User::builder()
            .id(self.id as u64)
            .username(self.username.clone())
            .email(self.email.clone())
            .name(self.name.clone())
            .registered_at(self.registered_at);

        if let Some(bio) = &self.bio {
            builder = builder.bio(bio.clone());
        }
        if let Some(profile_image) = &self.profile_image {
            builder = builder.profile_image(profile_image.clone());
        }

        builder.build().map_err(|e| StoreError::ConvertError(e.to_string()))
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::bookshelf::account)]
struct NewUserRow<'a> {
    username: &'a str,
    email: &'a str,
    name: &'a str,
    bio: Option<&'a str>,
    profile_image: Option<&'a str>,
    registered_at: chrono::NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = schema::bookshelf::account)]
struct UserForm<'a> {
    email: &'a str,
    name: &'a str,
    bio: Option<&'a str>,
    profile_image: Option<&'a str>,
}

pub struct UserPgStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl UserPgStore {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl UserRepository for UserPgStore {
    fn find_by_id(&self, target: u64) -> Result<Option<User>, StoreError> {
        use schema::bookshelf::account::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let entity = account
            .filter(id.eq(target as i64))
            .select(UserEntity::as_select())
            .first(&mut connection)
            .optional()
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        entity.map(|e| e.to_domain()).transpose()
    }

    fn find_by_username(&self, target: &str) -> Result<Option<User>, StoreError> {
        use schema::bookshelf::account::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;
        let entity = account
            .filter(username.eq(target))
            .select(UserEntity::as_select())
            .first(&mut connection)
            .optional()
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        entity.map(|e| e.to_domain()).transpose()
    }

    fn save(&self, user: User) -> Result<User, StoreError> {
        use schema::bookshelf::account;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let row = NewUserRow {
            username: user.username(),
            email: user.email(),
            name: user.name(),
            bio: user.bio(),
            profile_image: user.profile_image(),
            registered_at: chrono::Local::now().naive_local(),
        };

        let entity = diesel::insert_into(account::table)
            .values(&row)
            .returning(UserEntity::as_select())
            .get_result(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        entity.to_domain()
    }

    fn update(&self, user: &User) -> Result<usize, StoreError> {
        use schema::bookshelf::account::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let form = UserForm {
            email: user.email(),
            name: user.name(),
            bio: user.bio(),
            profile_image: user.profile_image(),
        };

        let updated = diesel::update(account.filter(id.eq(user.id() as i64)))
            .set(&form)
            .execute(&mut connection)
            .map_err(|e| StoreError::ExecuteError(e.to_string()))?;

        Ok(updated)
    }
}
