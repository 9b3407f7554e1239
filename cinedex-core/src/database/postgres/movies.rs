use async_trait::async_trait;

use super::collection::PgCollection;
use crate::{
    database::ports::MoviesRepository,
    domain::movies::{
        GroupStats, Movie, MovieStats, StatsGroupBy, StatsQuery, StatsSummary,
    },
    error::Result,
};

type GroupRow = (String, i64, f64, f64, f64, f64);

const GENRE_SOURCE: &str =
    "movies AS m CROSS JOIN LATERAL unnest(m.genres) AS g(key)";

#[async_trait]
impl MoviesRepository for PgCollection<Movie> {
    async fn stats(&self, query: &StatsQuery) -> Result<MovieStats> {
        let (key, source) = match query.group_by {
            StatsGroupBy::Genre => ("g.key", GENRE_SOURCE),
            StatsGroupBy::Director => ("m.director", "movies AS m"),
            StatsGroupBy::ReleaseYear => {
                ("m.release_year::text", "movies AS m")
            }
        };

        let statement = format!(
            "SELECT {key} AS key, COUNT(*) AS movie_count, \
                    AVG(m.rating)::float8, MIN(m.rating)::float8, \
                    MAX(m.rating)::float8, AVG(m.duration)::float8 \
             FROM {source} \
             WHERE ($1::float8 IS NULL OR m.rating >= $1) \
             GROUP BY {key}"
        );
        let rows: Vec<GroupRow> = sqlx::query_as(&statement)
            .bind(query.min_rating)
            .fetch_all(self.pool())
            .await?;

        let groups = rows
            .into_iter()
            .map(|row| {
                let (key, count, avg_rating, min_rating, max_rating, duration) =
                    row;
                GroupStats {
                    key,
                    movie_count: u64::try_from(count).unwrap_or_default(),
                    avg_rating,
                    min_rating,
                    max_rating,
                    avg_duration: duration,
                }
            })
            .collect();

        let (total_movies, avg_rating, avg_duration): (i64, f64, f64) =
            sqlx::query_as(
                "SELECT COUNT(*), COALESCE(AVG(rating), 0)::float8, \
                        COALESCE(AVG(duration), 0)::float8 \
                 FROM movies \
                 WHERE ($1::float8 IS NULL OR rating >= $1)",
            )
            .bind(query.min_rating)
            .fetch_one(self.pool())
            .await?;

        let summary = StatsSummary {
            total_movies: u64::try_from(total_movies).unwrap_or_default(),
            avg_rating,
            avg_duration,
        };

        Ok(MovieStats::from_parts(*query, groups, summary))
    }
}
