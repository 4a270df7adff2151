use thiserror::Error;

/// Expected, user-correctable submission failures. The display strings are
/// the user-facing notification text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Todo must be at least 3 characters")]
    TooShort,

    #[error("Todo must be less than 100 characters")]
    TooLong,

    #[error("Please wait a moment before adding another todo")]
    RateLimited,

    #[error("You already have an active todo with this title!")]
    DuplicateActive,
}
