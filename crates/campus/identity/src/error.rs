use thiserror::Error;

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-related errors.
///
/// Resolution itself never fails; these cover building the collaborators.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid seed account: {0}")]
    InvalidSeed(String),

    #[error("Duplicate seed account: {0}")]
    DuplicateSeed(String),

    #[error("Unsupported seed file format: {0}")]
    UnsupportedFormat(String),

    #[error("Seed file parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
