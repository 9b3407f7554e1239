use axum::{
    Extension, Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use tracing::info;
use uuid::Uuid;

use cinedex_core::{
    api::{ApiResponse, ListResponse},
    domain::{
        movies::{CreateMovieRequest, Movie, UpdateMovieRequest},
        users::User,
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

/// `GET /movies`
pub async fn list_movies(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ListResponse>> {
    list_resource::<Movie, _>(&state, query.as_deref(), state.movies.as_ref())
        .await
}

/// `GET /movies/{id}`
pub async fn get_movie(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let movie = find_movie(&state, id).await?;
    Ok(Json(ApiResponse::success(movie)))
}

/// `POST /movies` (admin)
pub async fn create_movie(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    ApiJson(request): ApiJson<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Movie>>)> {
    let movie = Movie::create(request, Some(admin.id))?;
    state.movies.insert(&movie).await?;

    info!(movie_id = %movie.id, created_by = %admin.id, "movie created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(movie))))
}

/// `PATCH /movies/{id}` (admin)
pub async fn update_movie(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateMovieRequest>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let current = find_movie(&state, id).await?;
    let updated = request.apply(&current)?;
    state.movies.replace(&updated).await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// `DELETE /movies/{id}` (admin)
pub async fn delete_movie(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<StatusCode> {
    if !state.movies.remove(id).await? {
        return Err(AppError::not_found("Movie not found"));
    }

    info!(movie_id = %id, "movie deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_movie(state: &AppState, id: Uuid) -> AppResult<Movie> {
    state
        .movies
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Movie not found"))
}
