use thiserror::Error;

/// Input validation failures for movie and user requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "Invalid username: must be 3-30 characters, alphanumeric or underscore"
    )]
    InvalidUsername,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be between 8 and 128 characters")]
    InvalidPassword,

    #[error("Current password is required to set a new password")]
    CurrentPasswordRequired,

    #[error("Invalid display name: must be 1-100 characters")]
    InvalidDisplayName,

    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: String,
        max: String,
    },

    #[error("At least one genre is required")]
    MissingGenres,

    #[error("Unknown statistics grouping {0:?}")]
    UnknownGrouping(String),

    #[error("Request contains no changes")]
    EmptyUpdate,
}

/// Check the trimmed character count of `value`.
pub fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(ValidationError::Length { field, min, max });
    }
    Ok(())
}

pub fn check_range<T>(
    field: &'static str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError>
where
    T: PartialOrd + ToString + Copy,
{
    // NaN is never in range.
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}
