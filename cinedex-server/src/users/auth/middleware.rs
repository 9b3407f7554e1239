use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use cinedex_core::domain::users::User;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Resolve the bearer token to a live account and attach it to the request
/// as a [`User`] extension.
///
/// The account is reloaded on every request, so deleted or deactivated
/// users lose access immediately, and a token whose role no longer matches
/// the account is refused.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    // Owned, so no borrow of the request is held across the await.
    let token = extract_bearer_token(&request)?.to_string();
    let user = validate_and_get_user(&state, &token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Middleware that ensures the caller is an administrator.
/// This middleware must run AFTER auth_middleware in the layer stack.
pub async fn admin_middleware(request: Request, next: Next) -> Response {
    let Some(user) = request.extensions().get::<User>() else {
        return AppError::unauthorized("Authentication required")
            .into_response();
    };

    if !user.is_admin() {
        debug!(user_id = %user.id, "admin route refused");
        return AppError::forbidden("Admin access required").into_response();
    }

    next.run(request).await
}

fn extract_bearer_token(request: &Request) -> AppResult<&str> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))
}

async fn validate_and_get_user(
    state: &AppState,
    token: &str,
) -> AppResult<User> {
    let claims = state.jwt.verify(token).map_err(|err| {
        debug!(error = %err, "token rejected");
        AppError::unauthorized("Invalid or expired token")
    })?;

    let user = state
        .users
        .get(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

    if !user.is_active {
        return Err(AppError::unauthorized("Account is deactivated"));
    }
    if user.role != claims.role {
        return Err(AppError::unauthorized(
            "Token is stale, please sign in again",
        ));
    }

    Ok(user)
}
