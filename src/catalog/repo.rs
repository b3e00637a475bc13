pub mod diesel;
pub mod memory;

pub use crate::catalog::repo::diesel::BookPgStore;
pub use crate::catalog::repo::memory::MemoryBookStore;
