use crate::account::{User, UserRepository};
use crate::catalog::StoreError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Map-backed user store.
pub struct MemoryUserStore {
    users: Mutex<BTreeMap<u64, User>>,
    sequence: AtomicU64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(BTreeMap::new()),
            sequence: AtomicU64::new(0),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for MemoryUserStore {
    fn find_by_id(&self, id: u64) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        Ok(users.get(&id).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;
        Ok(users
            .values()
            .find(|u| u.username().eq_ignore_ascii_case(username))
            .cloned())
    }

    fn save(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;

        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let user = user
            .to_builder()
            .id(id)
            .registered_at(chrono::Local::now().naive_local())
            .build()
            .map_err(|e| StoreError::ConvertError(e.to_string()))?;

        users.insert(id, user.clone());
        Ok(user)
    }

    fn update(&self, user: &User) -> Result<usize, StoreError> {
        let mut users = self.users.lock().map_err(|e| StoreError::ConnectError(e.to_string()))?;

        match users.get_mut(&user.id()) {
            Some(existing) => {
                *existing = user.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> User {
        User::builder()
            .username(username)
            .email(format!("{}@example.com", username))
            .name(username)
            .build()
            .unwrap()
    }

    #[test]
    fn username_lookup_ignores_case() {
        let store = MemoryUserStore::new();
        store.save(user("johndoe")).unwrap();

        assert!(store.find_by_username("JohnDoe").unwrap().is_some());
        assert!(store.find_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn update_touches_only_existing_users() {
        let store = MemoryUserStore::new();
        let saved = store.save(user("sarah")).unwrap();

        let changed = saved.to_builder().bio("Book lover").build().unwrap();
        assert_eq!(store.update(&changed).unwrap(), 1);
        assert_eq!(
            store.find_by_id(saved.id()).unwrap().unwrap().bio(),
            Some("Book lover")
        );

        let ghost = user("ghost").to_builder().id(99).build().unwrap();
        assert_eq!(store.update(&ghost).unwrap(), 0);
    }
}
