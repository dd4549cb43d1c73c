//! In-memory user store
//!
//! Intended for tests and local development. Not optimized for performance.

use super::user::{NewUser, StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        // Check and insert under one write lock so concurrent registrations
        // of the same email cannot both succeed
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            number: user.number,
            created_at: Utc::now(),
        };
        users.push(record.clone());

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
