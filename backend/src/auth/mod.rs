//! Authentication and authorization
//!
//! bcrypt credential hashing, HS256 identity tokens and the role-gated
//! access guard.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, Identity, TokenAuthority, TokenError};
pub use middleware::{bearer_token, require_admin, AccessGuard, AccessPolicy, AuthUser};
pub use password::{CredentialManager, HASH_COST, MAX_PASSWORD_BYTES};
