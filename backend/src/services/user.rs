//! User service for registration, login and listing
//!
//! - Password hashing/verification runs on the blocking thread pool
//! - The token authority is passed by reference (pre-computed keys)
//! - The store is reached only through the `UserStore` trait

use crate::auth::{CredentialManager, Identity, TokenAuthority, MAX_PASSWORD_BYTES};
use crate::error::ApiError;
use crate::repositories::{NewUser, UserStore};
use authgate_shared::{LoginRequest, RegisterRequest, Role, User};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Outcome of a successful registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub token: String,
    pub user_id: Uuid,
}

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and issue their first token
    pub async fn register(
        store: &dyn UserStore,
        tokens: &TokenAuthority,
        req: RegisterRequest,
    ) -> Result<Registration, ApiError> {
        req.validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        // The length rule above counts characters; bcrypt's limit is in bytes
        if req.password.len() > MAX_PASSWORD_BYTES {
            return Err(ApiError::Validation(format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        let role = match req.role.as_deref() {
            Some(name) => name
                .parse::<Role>()
                .map_err(|e| ApiError::Validation(e.to_string()))?,
            None => Role::default(),
        };

        if store.find_by_email(&req.email).await?.is_some() {
            warn!("Registration rejected: email already registered");
            return Err(ApiError::DuplicateUser);
        }

        // Hash password on blocking thread pool (CPU-intensive)
        let password_hash = CredentialManager::hash_async(req.password).await?;

        // A concurrent registration can still win the race here; the
        // store reports that as DuplicateEmail, which maps to DuplicateUser
        let user = store
            .insert(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                role,
                number: req.number,
            })
            .await?;

        let token = Self::issue_for(tokens, &user.email, user.role)?;

        info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(Registration {
            token,
            user_id: user.id,
        })
    }

    /// Login with email and password
    ///
    /// The token carries the role stored on the account.
    pub async fn login(
        store: &dyn UserStore,
        tokens: &TokenAuthority,
        req: LoginRequest,
    ) -> Result<String, ApiError> {
        let user = store
            .find_by_email(&req.email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        // Verify password on blocking thread pool (CPU-intensive)
        let valid = CredentialManager::verify_async(req.password, user.password.clone()).await?;

        if !valid {
            warn!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(ApiError::InvalidPassword);
        }

        let token = Self::issue_for(tokens, &user.email, user.role)?;

        info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(token)
    }

    /// Every registered user, without password hashes
    pub async fn list_users(store: &dyn UserStore) -> Result<Vec<User>, ApiError> {
        let users = store.list().await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    /// The account behind an authenticated identity
    pub async fn current_user(store: &dyn UserStore, email: &str) -> Result<User, ApiError> {
        store
            .find_by_email(email)
            .await?
            .map(User::from)
            .ok_or(ApiError::UserNotFound)
    }

    fn issue_for(tokens: &TokenAuthority, email: &str, role: Role) -> Result<String, ApiError> {
        tokens
            .issue(&Identity {
                email: email.to_string(),
                role,
            })
            .map_err(|e| ApiError::Internal(e.into()))
    }
}
