use thiserror::Error;

/// Recoverable failures. Unknown ids are contract violations and panic
/// instead of surfacing here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CageError {
    #[error("degenerate geometry: {what}")]
    Degenerate { what: &'static str },
    #[error("point is not bound to the cage")]
    NotBound,
    #[error("parameter '{param}' must be finite")]
    NonFinite { param: &'static str },
    #[error("{what} exceeds limit of {max}")]
    LimitExceeded { what: &'static str, max: usize },
    #[error("invalid document: {0}")]
    InvalidJson(String),
}

impl CageError {
    /// Stable machine-readable code for host bindings.
    pub fn code(&self) -> &'static str {
        match self {
            CageError::Degenerate { .. } => "degenerate",
            CageError::NotBound => "not_bound",
            CageError::NonFinite { .. } => "non_finite",
            CageError::LimitExceeded { .. } => "limit_exceeded",
            CageError::InvalidJson(_) => "invalid_json",
        }
    }
}

pub type CageResult<T> = Result<T, CageError>;
