pub mod diesel;
pub mod memory;

pub use crate::account::repo::diesel::UserPgStore;
pub use crate::account::repo::memory::MemoryUserStore;
