use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::validation::{ValidationError, check_length, check_range},
    schema::{FieldKind, FieldSpec, Resource},
};

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 2000;
pub const DIRECTOR_MAX: usize = 100;
pub const GENRE_MAX: usize = 50;
pub const EARLIEST_RELEASE_YEAR: i32 = 1888;
pub const LATEST_RELEASE_YEAR: i32 = 2100;
pub const MAX_DURATION_MINUTES: i32 = 1000;
pub const MAX_RATING: f64 = 10.0;

/// A catalogued movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub director: String,
    pub genres: Vec<String>,
    pub release_year: i32,
    /// Running time in minutes
    pub duration: i32,
    /// 0.0 - 10.0
    pub rating: f64,
    /// Admin who added the movie
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Movie {
    const COLLECTION: &'static str = "movies";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FieldKind::Uuid),
        FieldSpec::new("title", FieldKind::Text),
        FieldSpec::new("description", FieldKind::Text),
        FieldSpec::new("director", FieldKind::Text),
        FieldSpec::new("genres", FieldKind::TextList),
        FieldSpec::new("release_year", FieldKind::Number),
        FieldSpec::new("duration", FieldKind::Number),
        FieldSpec::new("rating", FieldKind::Number),
        FieldSpec::new("created_by", FieldKind::Uuid),
        FieldSpec::new("created_at", FieldKind::Timestamp),
        FieldSpec::new("updated_at", FieldKind::Timestamp),
    ];

    const SEARCH_FIELDS: &'static [&'static str] =
        &["title", "description", "director"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Movie {
    /// Validate a creation request and build the movie it describes.
    pub fn create(
        request: CreateMovieRequest,
        created_by: Option<Uuid>,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now().trunc_subsecs(6);
        let movie = Self {
            id: Uuid::now_v7(),
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            director: request.director.trim().to_string(),
            genres: normalize_genres(request.genres),
            release_year: request.release_year,
            duration: request.duration,
            rating: request.rating.unwrap_or(0.0),
            created_by,
            created_at: now,
            updated_at: now,
        };
        movie.validate()?;
        Ok(movie)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("title", &self.title, 1, TITLE_MAX)?;
        check_length("description", &self.description, 1, DESCRIPTION_MAX)?;
        check_length("director", &self.director, 1, DIRECTOR_MAX)?;

        if self.genres.is_empty() {
            return Err(ValidationError::MissingGenres);
        }
        for genre in &self.genres {
            check_length("genre", genre, 1, GENRE_MAX)?;
        }

        check_range(
            "release_year",
            self.release_year,
            EARLIEST_RELEASE_YEAR,
            LATEST_RELEASE_YEAR,
        )?;
        check_range("duration", self.duration, 1, MAX_DURATION_MINUTES)?;
        check_range("rating", self.rating, 0.0, MAX_RATING)?;
        Ok(())
    }
}

/// Body of `POST /movies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub description: String,
    pub director: String,
    pub genres: Vec<String>,
    pub release_year: i32,
    pub duration: i32,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Body of `PATCH /movies/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub director: Option<String>,
    pub genres: Option<Vec<String>>,
    pub release_year: Option<i32>,
    pub duration: Option<i32>,
    pub rating: Option<f64>,
}

impl UpdateMovieRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.director.is_none()
            && self.genres.is_none()
            && self.release_year.is_none()
            && self.duration.is_none()
            && self.rating.is_none()
    }

    /// Apply the changes to a copy of `movie`, validating the result.
    pub fn apply(self, movie: &Movie) -> Result<Movie, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }

        let mut updated = movie.clone();
        if let Some(title) = self.title {
            updated.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            updated.description = description.trim().to_string();
        }
        if let Some(director) = self.director {
            updated.director = director.trim().to_string();
        }
        if let Some(genres) = self.genres {
            updated.genres = normalize_genres(genres);
        }
        if let Some(release_year) = self.release_year {
            updated.release_year = release_year;
        }
        if let Some(duration) = self.duration {
            updated.duration = duration;
        }
        if let Some(rating) = self.rating {
            updated.rating = rating;
        }

        updated.validate()?;
        updated.updated_at = Utc::now().trunc_subsecs(6);
        Ok(updated)
    }
}

/// Trim genre names and drop blanks and repeats, keeping first-seen order.
fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let genre = genre.trim();
        if !genre.is_empty() && !normalized.iter().any(|g| g == genre) {
            normalized.push(genre.to_string());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateMovieRequest {
        CreateMovieRequest {
            title: " Heat ".into(),
            description: "A group of professional bank robbers.".into(),
            director: "Michael Mann".into(),
            genres: vec!["Crime".into(), " Drama".into(), "Crime".into()],
            release_year: 1995,
            duration: 170,
            rating: Some(8.3),
        }
    }

    #[test]
    fn create_normalizes_input() {
        let movie = Movie::create(request(), None).unwrap();
        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.genres, vec!["Crime", "Drama"]);
        assert_eq!(movie.created_at, movie.updated_at);
    }

    #[test]
    fn create_rejects_out_of_range_values() {
        let mut bad_year = request();
        bad_year.release_year = 1700;
        assert!(matches!(
            Movie::create(bad_year, None),
            Err(ValidationError::OutOfRange {
                field: "release_year",
                ..
            })
        ));

        let mut bad_rating = request();
        bad_rating.rating = Some(11.0);
        assert!(Movie::create(bad_rating, None).is_err());

        let mut no_genres = request();
        no_genres.genres = vec!["  ".into()];
        assert_eq!(
            Movie::create(no_genres, None),
            Err(ValidationError::MissingGenres)
        );
    }

    #[test]
    fn update_applies_only_given_fields() {
        let movie = Movie::create(request(), None).unwrap();
        let updated = UpdateMovieRequest {
            rating: Some(9.0),
            ..Default::default()
        }
        .apply(&movie)
        .unwrap();

        assert_eq!(updated.rating, 9.0);
        assert_eq!(updated.title, movie.title);
        assert_eq!(updated.id, movie.id);
        assert!(updated.updated_at >= movie.updated_at);
    }

    #[test]
    fn empty_update_is_rejected() {
        let movie = Movie::create(request(), None).unwrap();
        assert_eq!(
            UpdateMovieRequest::default().apply(&movie),
            Err(ValidationError::EmptyUpdate)
        );
    }

    #[test]
    fn search_fields_are_title_description_director() {
        assert_eq!(
            Movie::SEARCH_FIELDS,
            &["title", "description", "director"]
        );
        for field in Movie::SEARCH_FIELDS {
            assert_eq!(
                Movie::field(field).map(|f| f.kind),
                Some(FieldKind::Text)
            );
        }
    }
}
