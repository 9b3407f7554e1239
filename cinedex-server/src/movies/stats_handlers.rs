use axum::{
    Json,
    extract::{RawQuery, State},
};
use tracing::debug;

use cinedex_core::{
    api::ApiResponse,
    domain::movies::{MovieStats, StatsQuery},
    query::QueryParams,
};

use crate::infra::{app_state::AppState, errors::AppResult};

/// `GET /movies/stats?group_by=genre&min_rating=7`
pub async fn movie_stats(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ApiResponse<MovieStats>>> {
    let params = QueryParams::parse(query.as_deref().unwrap_or_default());
    let stats_query = StatsQuery::from_params(&params)?;
    debug!(
        group_by = stats_query.group_by.as_str(),
        min_rating = ?stats_query.min_rating,
        "computing movie statistics"
    );
    let stats = state.movies.stats(&stats_query).await?;

    Ok(Json(ApiResponse::success(stats)))
}
