//! User store boundary
//!
//! Handlers and services only see the `UserStore` trait. The Postgres and
//! in-memory implementations live next to it.

use async_trait::async_trait;
use authgate_shared::{Role, User};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Stored user, including the password hash
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never plaintext
    pub password: String,
    pub role: Role,
    pub number: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
            role: record.role,
            number: record.number,
            created_at: record.created_at,
        }
    }
}

/// Input for creating a user; the store assigns `id` and `created_at`
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub number: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// Another record already owns this email
    #[error("email already registered")]
    DuplicateEmail,

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// Persistent collection of user records, unique by email
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup by email
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new record; fails with `DuplicateEmail` if the email is taken
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Every record, oldest first
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Cheap liveness probe of the backing store
    async fn health_check(&self) -> Result<(), StoreError>;
}
