//! Movie catalog domain: records, requests and grouped statistics.

pub mod movie;
pub mod stats;

pub use movie::{CreateMovieRequest, Movie, UpdateMovieRequest};
pub use stats::{
    GroupStats, MovieStats, StatsGroupBy, StatsQuery, StatsSummary,
};
