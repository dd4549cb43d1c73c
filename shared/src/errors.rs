//! Error types for the shared domain model

use thiserror::Error;

/// A role name that is not part of the closed role set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);
