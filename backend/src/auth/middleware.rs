//! Access guard
//!
//! Every protected request walks the same three steps:
//!
//! 1. Pull a bearer token out of the `Authorization` header. A missing or
//!    malformed header ends the request with 401.
//! 2. Verify the token. Invalid and expired tokens both end with 403.
//! 3. Check the token's role against the route's policy. A role outside the
//!    allowed set ends with 403; otherwise the claims are attached to the
//!    request and the handler runs.

use crate::auth::jwt::{Claims, TokenAuthority};
use crate::error::ApiError;
use crate::state::AppState;
use authgate_shared::Role;
use axum::{
    extract::{FromRef, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Which roles may pass a guarded route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    /// `None` admits any verified identity
    allowed: Option<&'static [Role]>,
}

impl AccessPolicy {
    /// Any valid token passes
    pub const fn authenticated() -> Self {
        Self { allowed: None }
    }

    /// Only tokens whose role is in `roles` pass
    pub const fn require(roles: &'static [Role]) -> Self {
        Self {
            allowed: Some(roles),
        }
    }

    /// Admin-only routes
    pub const ADMIN: AccessPolicy = AccessPolicy::require(&[Role::Admin]);

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.map_or(true, |roles| roles.contains(&role))
    }
}

/// Authenticated caller, attached to the request once the guard passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Extract the token from `Authorization: <scheme> <token>`
///
/// The header must be exactly two space-separated parts, the scheme must be
/// `Bearer` (any case) and the token must be non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized access".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid authorization header".to_string()))?;

    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(ApiError::Unauthorized(
            "Invalid authorization format".to_string(),
        )),
    }
}

/// Token verification plus a role policy
pub struct AccessGuard<'a> {
    tokens: &'a TokenAuthority,
    policy: AccessPolicy,
}

impl<'a> AccessGuard<'a> {
    pub fn new(tokens: &'a TokenAuthority, policy: AccessPolicy) -> Self {
        Self { tokens, policy }
    }

    /// Run the guard against a request's headers
    pub fn authorize(&self, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
        let token = bearer_token(headers)?;

        let claims = self.tokens.verify(token).map_err(|e| {
            debug!(reason = %e, "Rejected bearer token");
            ApiError::InvalidOrExpiredToken
        })?;

        if !self.policy.permits(claims.role) {
            debug!(email = %claims.email, role = %claims.role, "Role not permitted");
            return Err(ApiError::InsufficientRole);
        }

        Ok(claims.into())
    }
}

/// Any authenticated caller, as a handler argument
#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // A guard layer may already have done the work
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let app_state = AppState::from_ref(state);
        AccessGuard::new(app_state.tokens(), AccessPolicy::authenticated()).authorize(&parts.headers)
    }
}

/// Middleware for admin-only route groups
///
/// Apply with `axum::middleware::from_fn_with_state(state, require_admin)`.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = AccessGuard::new(state.tokens(), AccessPolicy::ADMIN).authorize(request.headers())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
