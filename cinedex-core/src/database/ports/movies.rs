use async_trait::async_trait;

use super::collection::Collection;
use crate::{
    domain::movies::{Movie, MovieStats, StatsQuery},
    error::Result,
};

#[async_trait]
pub trait MoviesRepository: Collection<Movie> {
    /// Grouped rating/duration aggregates.
    async fn stats(&self, query: &StatsQuery) -> Result<MovieStats>;
}
