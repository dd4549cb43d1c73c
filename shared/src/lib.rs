//! Authgate Shared Library
//!
//! Wire types and domain models shared between the backend and any client
//! that talks to it.

pub mod errors;
pub mod models;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use models::{Role, User};
pub use types::*;
