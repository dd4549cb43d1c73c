//! Postgres-backed user store

use super::user::{NewUser, StoreError, UserRecord, UserStore};
use crate::db;
use async_trait::async_trait;
use authgate_shared::Role;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// User row as stored; `role` is plain text in the table
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password: String,
    role: String,
    number: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password: row.password,
            role,
            number: row.number,
            created_at: row.created_at,
        })
    }
}

/// User store over a shared connection pool
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password, role, number, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password, role, number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password, role, number, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // users_email_key closes the check-then-insert race in registration
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            other => StoreError::Database(other),
        })?;

        row.try_into()
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password, role, number, created_at
            FROM users
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRecord::try_from).collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        db::health_check(&self.pool).await
    }
}
