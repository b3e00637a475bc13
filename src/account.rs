pub mod repo;

use crate::catalog::{DomainError, StoreError};
use std::sync::Arc;

/// Reader profile. Authentication lives at the excluded transport boundary;
/// this core only carries the identity the other modules reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: u64,
    username: String,
    email: String,
    name: String,
    bio: Option<String>,
    profile_image: Option<String>,
    registered_at: Option<chrono::NaiveDateTime>,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::new()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn profile_image(&self) -> Option<&str> {
        self.profile_image.as_deref()
    }

    pub fn registered_at(&self) -> Option<chrono::NaiveDateTime> {
        self.registered_at
    }

    pub fn to_builder(&self) -> UserBuilder {
        let mut builder = UserBuilder::new()
            .id(self.id)
            .username(self.username.clone())
            .email(self.email.clone())
            .name(self.name.clone());

        if let Some(bio) = &self.bio {
            builder = builder.bio(bio.clone());
        }
        if let Some(profile_image) = &self.profile_image {
            builder = builder.profile_image(profile_image.clone());
        }
        if let Some(registered_at) = self.registered_at {
            builder = builder.registered_at(registered_at);
        }

        builder
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserBuilder {
    id: Option<u64>,
    username: Option<String>,
    email: Option<String>,
    name: Option<String>,
    bio: Option<String>,
    profile_image: Option<String>,
    registered_at: Option<chrono::NaiveDateTime>,
}

impl UserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bio<S: Into<String>>(mut self, bio: S) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn profile_image<S: Into<String>>(mut self, profile_image: S) -> Self {
        self.profile_image = Some(profile_image.into());
        self
    }

    pub fn registered_at(mut self, registered_at: chrono::NaiveDateTime) -> Self {
        self.registered_at = Some(registered_at);
        self
    }

    pub fn build(self) -> Result<User, DomainError> {
        let username = self.username.ok_or(DomainError::RequireArgumentMissing("username".to_owned()))?;
        let email = self.email.ok_or(DomainError::RequireArgumentMissing("email".to_owned()))?;
        let name = self.name.ok_or(DomainError::RequireArgumentMissing("name".to_owned()))?;

        Ok(User {
            id: self.id.unwrap_or(0),
            username,
            email,
            name,
            bio: self.bio,
            profile_image: self.profile_image,
            registered_at: self.registered_at,
        })
    }
}

pub type SharedUserRepository = Arc<dyn UserRepository>;

/// User storage
pub trait UserRepository: Send + Sync {

    fn find_by_id(&self, id: u64) -> Result<Option<User>, StoreError>;

    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Stores a new user; identifier and registration timestamp are assigned
    /// by the store.
    fn save(&self, user: User) -> Result<User, StoreError>;

    /// Updates an existing user's profile fields. Returns the number of
    /// records touched.
    fn update(&self, user: &User) -> Result<usize, StoreError>;
}
