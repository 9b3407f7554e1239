use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::movie::{MAX_RATING, Movie};
use crate::{
    domain::validation::{ValidationError, check_range},
    query::QueryParams,
};

/// Dimension movie statistics are grouped by.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StatsGroupBy {
    /// One group per genre; a movie with several genres counts in each.
    #[default]
    Genre,
    Director,
    ReleaseYear,
}

impl StatsGroupBy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "genre" | "genres" => Some(Self::Genre),
            "director" => Some(Self::Director),
            "release_year" | "year" => Some(Self::ReleaseYear),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Director => "director",
            Self::ReleaseYear => "release_year",
        }
    }

    fn keys(self, movie: &Movie) -> Vec<String> {
        match self {
            Self::Genre => movie.genres.clone(),
            Self::Director => vec![movie.director.clone()],
            Self::ReleaseYear => vec![movie.release_year.to_string()],
        }
    }
}

/// Parameters of `GET /movies/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsQuery {
    pub group_by: StatsGroupBy,
    /// Only movies rated at least this are aggregated.
    pub min_rating: Option<f64>,
}

impl StatsQuery {
    /// Read `group_by` and `min_rating` from listing-style parameters.
    pub fn from_params(params: &QueryParams) -> Result<Self, ValidationError> {
        let group_by = match params.get("group_by").map(|v| v.last()) {
            None | Some("") => StatsGroupBy::default(),
            Some(raw) => StatsGroupBy::parse(raw)
                .ok_or_else(|| ValidationError::UnknownGrouping(raw.into()))?,
        };

        let min_rating = match params.get("min_rating").map(|v| v.last().trim())
        {
            None | Some("") => None,
            Some(raw) => {
                // Unparseable input is reported as out of range.
                let value = raw.parse::<f64>().unwrap_or(f64::NAN);
                check_range("min_rating", value, 0.0, MAX_RATING)?;
                Some(value)
            }
        };

        Ok(Self {
            group_by,
            min_rating,
        })
    }

    pub fn includes(&self, movie: &Movie) -> bool {
        self.min_rating.is_none_or(|min| movie.rating >= min)
    }
}

/// Aggregates for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub key: String,
    pub movie_count: u64,
    pub avg_rating: f64,
    pub min_rating: f64,
    pub max_rating: f64,
    pub avg_duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_movies: u64,
    pub avg_rating: f64,
    pub avg_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    pub group_by: StatsGroupBy,
    pub min_rating: Option<f64>,
    pub groups: Vec<GroupStats>,
    pub summary: StatsSummary,
}

impl MovieStats {
    /// Assemble stats from raw aggregates: averages are rounded to two
    /// decimals and groups ordered by count (descending), then key.
    pub fn from_parts(
        query: StatsQuery,
        mut groups: Vec<GroupStats>,
        mut summary: StatsSummary,
    ) -> Self {
        for group in &mut groups {
            group.avg_rating = round2(group.avg_rating);
            group.min_rating = round2(group.min_rating);
            group.max_rating = round2(group.max_rating);
            group.avg_duration = round2(group.avg_duration);
        }
        groups.sort_by(|a, b| {
            b.movie_count
                .cmp(&a.movie_count)
                .then_with(|| a.key.cmp(&b.key))
        });
        summary.avg_rating = round2(summary.avg_rating);
        summary.avg_duration = round2(summary.avg_duration);

        Self {
            group_by: query.group_by,
            min_rating: query.min_rating,
            groups,
            summary,
        }
    }

    /// Aggregate in memory over `movies`.
    pub fn compute<'a>(
        query: StatsQuery,
        movies: impl IntoIterator<Item = &'a Movie>,
    ) -> Self {
        let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
        let mut overall = Accumulator::default();

        for movie in movies.into_iter().filter(|m| query.includes(m)) {
            overall.add(movie);
            for key in query.group_by.keys(movie) {
                groups.entry(key).or_default().add(movie);
            }
        }

        let groups = groups
            .into_iter()
            .map(|(key, acc)| GroupStats {
                key,
                movie_count: acc.count,
                avg_rating: acc.avg_rating(),
                min_rating: acc.min_rating,
                max_rating: acc.max_rating,
                avg_duration: acc.avg_duration(),
            })
            .collect();

        let summary = StatsSummary {
            total_movies: overall.count,
            avg_rating: overall.avg_rating(),
            avg_duration: overall.avg_duration(),
        };

        Self::from_parts(query, groups, summary)
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: u64,
    rating_sum: f64,
    duration_sum: f64,
    min_rating: f64,
    max_rating: f64,
}

impl Accumulator {
    fn add(&mut self, movie: &Movie) {
        if self.count == 0 {
            self.min_rating = movie.rating;
            self.max_rating = movie.rating;
        } else {
            self.min_rating = self.min_rating.min(movie.rating);
            self.max_rating = self.max_rating.max(movie.rating);
        }
        self.count += 1;
        self.rating_sum += movie.rating;
        self.duration_sum += f64::from(movie.duration);
    }

    fn avg_rating(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.rating_sum / self.count as f64
        }
    }

    fn avg_duration(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.duration_sum / self.count as f64
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::movies::CreateMovieRequest;

    fn movie(
        title: &str,
        director: &str,
        genres: &[&str],
        year: i32,
        rating: f64,
    ) -> Movie {
        Movie::create(
            CreateMovieRequest {
                title: title.into(),
                description: format!("{title} description"),
                director: director.into(),
                genres: genres.iter().map(|g| g.to_string()).collect(),
                release_year: year,
                duration: 120,
                rating: Some(rating),
            },
            None,
        )
        .unwrap()
    }

    fn catalog() -> Vec<Movie> {
        vec![
            movie("Heat", "Michael Mann", &["Crime", "Drama"], 1995, 8.3),
            movie("Collateral", "Michael Mann", &["Crime"], 2004, 7.5),
            movie("Inception", "Christopher Nolan", &["Sci-Fi"], 2010, 8.8),
        ]
    }

    #[test]
    fn multi_genre_movies_count_once_per_genre() {
        let movies = catalog();
        let stats = MovieStats::compute(StatsQuery::default(), &movies);

        let keys: Vec<_> = stats
            .groups
            .iter()
            .map(|g| (g.key.as_str(), g.movie_count))
            .collect();
        assert_eq!(keys, vec![("Crime", 2), ("Drama", 1), ("Sci-Fi", 1)]);
        assert_eq!(stats.summary.total_movies, 3);

        let crime = &stats.groups[0];
        assert_eq!(crime.avg_rating, 7.9);
        assert_eq!(crime.min_rating, 7.5);
        assert_eq!(crime.max_rating, 8.3);
    }

    #[test]
    fn min_rating_restricts_input() {
        let movies = catalog();
        let query = StatsQuery {
            group_by: StatsGroupBy::Director,
            min_rating: Some(8.0),
        };
        let stats = MovieStats::compute(query, &movies);

        assert_eq!(stats.summary.total_movies, 2);
        assert_eq!(stats.groups.len(), 2);
        assert!(stats.groups.iter().all(|g| g.movie_count == 1));
        assert_eq!(stats.groups[0].key, "Christopher Nolan");
    }

    #[test]
    fn parses_grouping_from_params() {
        let params = QueryParams::parse("group_by=year&min_rating=7");
        let query = StatsQuery::from_params(&params).unwrap();
        assert_eq!(query.group_by, StatsGroupBy::ReleaseYear);
        assert_eq!(query.min_rating, Some(7.0));

        assert!(matches!(
            StatsQuery::from_params(&QueryParams::parse("group_by=studio")),
            Err(ValidationError::UnknownGrouping(_))
        ));
    }

    #[test]
    fn min_rating_outside_the_rating_scale_is_rejected() {
        for raw in ["50", "-1", "ten", "inf"] {
            let params = QueryParams::parse(&format!("min_rating={raw}"));
            assert_eq!(
                StatsQuery::from_params(&params),
                Err(ValidationError::OutOfRange {
                    field: "min_rating",
                    min: "0".into(),
                    max: "10".into(),
                })
            );
        }

        let params = QueryParams::parse("min_rating=10");
        assert_eq!(
            StatsQuery::from_params(&params).unwrap().min_rating,
            Some(10.0)
        );
    }

    #[test]
    fn empty_catalog_has_zero_summary() {
        let stats =
            MovieStats::compute(StatsQuery::default(), &Vec::<Movie>::new());
        assert!(stats.groups.is_empty());
        assert_eq!(stats.summary, StatsSummary::default());
    }
}
