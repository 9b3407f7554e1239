use axum::Json;
use tracing::debug;

use cinedex_core::{
    api::ListResponse,
    database::ports::Collection,
    query::QueryParams,
    schema::Resource,
};

use crate::infra::{app_state::AppState, errors::AppResult};

/// Translate a raw listing query string and run it against `store`.
///
/// Parameter problems never fail the request; only the store can, when a
/// filter value cannot be compared with its field.
pub async fn list_resource<R, C>(
    state: &AppState,
    raw_query: Option<&str>,
    store: &C,
) -> AppResult<Json<ListResponse>>
where
    R: Resource,
    C: Collection<R> + ?Sized,
{
    let params = QueryParams::parse(raw_query.unwrap_or_default());
    let plan = state.translator.translate::<R>(&params);
    let outcome = plan.execute::<R, C>(store).await?;

    debug!(
        collection = R::COLLECTION,
        total = outcome.total,
        returned = outcome.data.len(),
        "listing served"
    );
    Ok(Json(ListResponse::from(outcome)))
}
