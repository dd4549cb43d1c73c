//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the user store and the auth components.

pub mod user;

pub use user::{Registration, UserService};
