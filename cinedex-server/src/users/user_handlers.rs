use axum::{
    Extension, Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use tracing::info;
use uuid::Uuid;

use cinedex_core::{
    api::{ApiResponse, ListResponse},
    database::ports::UsersRepository,
    domain::users::{
        AdminUpdateUserRequest, Role, UpdateProfileRequest, User,
    },
};

use crate::{
    handlers::list_resource,
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
        extract::{ApiJson, ApiPath},
    },
};

/// `GET /users` (admin)
pub async fn list_users(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ListResponse>> {
    list_resource::<User, dyn UsersRepository>(
        &state,
        query.as_deref(),
        state.users.as_ref(),
    )
    .await
}

/// `GET /users/{id}` (admin)
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = find_user(&state, id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// `PATCH /users/{id}` (admin): display name, role and activation.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AdminUpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    request.validate()?;

    let demotes = request.role.is_some_and(|role| role != Role::Admin);
    let deactivates = request.is_active == Some(false);
    if admin.id == id && (demotes || deactivates) {
        return Err(AppError::bad_request(
            "You cannot change your own role or deactivate your own account",
        ));
    }

    let mut user = find_user(&state, id).await?;
    request.apply(&mut user);
    state.users.replace(&user).await?;

    info!(
        user_id = %user.id,
        role = %user.role,
        active = user.is_active,
        updated_by = %admin.id,
        "user updated by admin"
    );
    Ok(Json(ApiResponse::success(user)))
}

/// `DELETE /users/{id}` (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<StatusCode> {
    if admin.id == id {
        return Err(AppError::bad_request("You cannot delete your own account"));
    }
    if !state.users.remove(id).await? {
        return Err(AppError::not_found("User not found"));
    }

    info!(user_id = %id, deleted_by = %admin.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /users/me`: profile fields, plus a password change when the
/// current password is supplied.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(mut user): Extension<User>,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    request.validate()?;

    // A wrong current password must leave the profile untouched.
    let new_hash = match &request.new_password {
        Some(new_password) => {
            let current_password =
                request.current_password.as_deref().unwrap_or_default();
            verify_current_password(&state, user.id, current_password).await?;
            Some(state.auth_crypto.hash_password(new_password)?)
        }
        None => None,
    };

    request.apply(&mut user);
    state.users.replace(&user).await?;

    if let Some(new_hash) = new_hash {
        state.users.update_password(user.id, &new_hash).await?;
        info!(user_id = %user.id, "password changed");
    }

    Ok(Json(ApiResponse::success(user)))
}

async fn verify_current_password(
    state: &AppState,
    user_id: Uuid,
    password: &str,
) -> AppResult<()> {
    let stored_hash = state.users.password_hash(user_id).await?;
    let matches = match stored_hash {
        Some(hash) => state.auth_crypto.verify_password(password, &hash)?,
        None => false,
    };
    if matches {
        Ok(())
    } else {
        Err(AppError::unauthorized("Current password is incorrect"))
    }
}

async fn find_user(state: &AppState, id: Uuid) -> AppResult<User> {
    state
        .users
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}
