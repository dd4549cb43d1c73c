//! Authentication routes
//!
//! Registration, login and the caller's own record.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::AppJson;
use crate::services::UserService;
use crate::state::AppState;
use authgate_shared::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Register a new user
///
/// POST /register
async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let registration = UserService::register(state.store(), state.tokens(), req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            token: registration.token,
            user_id: registration.user_id,
        }),
    ))
}

/// Login with email and password
///
/// POST /login
async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let token = UserService::login(state.store(), state.tokens(), req).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// The authenticated caller's own record
///
/// GET /me
///
/// # Authentication
/// Requires a valid Bearer token; any role.
async fn me(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<Json<User>> {
    let user = UserService::current_user(state.store(), &auth_user.email).await?;
    Ok(Json(user))
}
