//! Application state management
//!
//! This module provides the shared context that is passed to all request
//! handlers via Axum's state extraction. It is built once at startup and
//! is read-only afterwards.

use crate::auth::TokenAuthority;
use crate::config::AppConfig;
use crate::repositories::UserStore;
use anyhow::Result;
use std::sync::Arc;

/// Shared application state
///
/// All fields are cheap to clone across async tasks:
/// - `store`: trait object behind an Arc
/// - `config`: wrapped in Arc
/// - `tokens`: pre-computed signing keys wrapped in Arc
#[derive(Clone)]
pub struct AppState {
    /// User store shared by every request
    pub store: Arc<dyn UserStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token authority with cached keys
    pub tokens: TokenAuthority,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails when no signing secret is configured, since no token could
    /// be issued or verified without one.
    pub fn new(store: Arc<dyn UserStore>, config: AppConfig) -> Result<Self> {
        let tokens = TokenAuthority::new(config.jwt_secret()?, config.jwt.token_ttl_secs);

        Ok(Self {
            store,
            config: Arc::new(config),
            tokens,
        })
    }

    /// Get a reference to the user store
    #[inline]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the token authority
    #[inline]
    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }
}
