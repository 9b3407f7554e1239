use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{SubsecRound, Utc};
use tracing::{info, warn};

use cinedex_core::{
    api::ApiResponse,
    domain::users::{AuthToken, LoginRequest, RegisterRequest, Role, User},
};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
    extract::ApiJson,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// `POST /auth/register`: create an account and sign it in.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthToken>>)> {
    request.validate()?;

    let password_hash = state.auth_crypto.hash_password(&request.password)?;
    let user = User::register(&request, Role::User);
    let user = state.users.register(&user, &password_hash).await?;

    if user.is_admin() {
        info!(user_id = %user.id, "first account registered as administrator");
    }

    let token = issue_token(&state, user)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(token))))
}

/// `POST /auth/login`: exchange a username (or email) and password for a
/// token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthToken>>> {
    let identifier = request.identifier();
    let user = if request.is_email() {
        state.users.get_by_email(&identifier).await?
    } else {
        state.users.get_by_username(&identifier).await?
    };
    let Some(mut user) = user else {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    let Some(password_hash) = state.users.password_hash(user.id).await? else {
        warn!(user_id = %user.id, "account has no stored credentials");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };
    if !state
        .auth_crypto
        .verify_password(&request.password, &password_hash)?
    {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    user.last_login = Some(Utc::now().trunc_subsecs(6));
    state.users.replace(&user).await?;

    let token = issue_token(&state, user)?;
    Ok(Json(ApiResponse::success(token)))
}

/// `GET /auth/me`
pub async fn me(Extension(user): Extension<User>) -> Json<ApiResponse<User>> {
    Json(ApiResponse::success(user))
}

fn issue_token(state: &AppState, user: User) -> AppResult<AuthToken> {
    let access_token = state.jwt.issue(&user).map_err(|err| {
        tracing::error!(error = %err, "failed to sign access token");
        AppError::internal("Internal server error")
    })?;

    Ok(AuthToken {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.ttl_secs(),
        user,
    })
}
