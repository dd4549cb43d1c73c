//! User store implementations
//!
//! Provides the `UserStore` boundary and its Postgres and in-memory backends.

pub mod memory;
pub mod postgres;
pub mod user;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;
pub use user::{NewUser, StoreError, UserRecord, UserStore};
