use crate::errors::ValidationError;

/// Title length bounds, counted in characters of the trimmed title.
pub const MIN_TITLE_LEN: usize = 3;
pub const MAX_TITLE_LEN: usize = 100;

/// Checks the length rules for a candidate todo title and returns the
/// trimmed form that is stored and compared for duplicates. Both bounds
/// apply to the trimmed title; surrounding whitespace never counts.
pub fn check_title(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < MIN_TITLE_LEN {
        return Err(ValidationError::TooShort);
    }
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong);
    }
    Ok(trimmed)
}
