//! Admin-only user listing

use crate::auth::{require_admin, AuthUser};
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use authgate_shared::User;
use axum::{extract::State, middleware, routing::get, Extension, Json, Router};
use tracing::debug;

/// Create user routes, all behind the admin guard
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// List every registered user
///
/// GET /users
async fn list_users(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
) -> ApiResult<Json<Vec<User>>> {
    let users = UserService::list_users(state.store()).await?;
    debug!(admin = %admin.email, count = users.len(), "Listed users");
    Ok(Json(users))
}
