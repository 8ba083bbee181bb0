//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = SkipgramError> = std::result::Result<T, E>;

/// Domain-specific error describing invalid parameters, invalid corpus state, or IO failures.
#[derive(Debug, Error)]
pub enum SkipgramError {
    /// A caller-supplied parameter was rejected before any state was touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The corpus cannot support the requested operation (empty or shorter than a window).
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// Catch-all variant for invariants that should not occur.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SkipgramError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }

    /// Returns true for errors caused by caller-supplied parameters.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns true for errors caused by a corpus that cannot support the request.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(err: &SkipgramError) -> &'static str {
        match err {
            SkipgramError::InvalidArgument(_) => "invalid argument",
            SkipgramError::InvalidState(_) => "invalid state",
            SkipgramError::Io { .. } => "io error",
            SkipgramError::Internal(_) => "internal error",
        }
    }

    #[test]
    fn display_leads_with_the_error_category() {
        let errors = [
            SkipgramError::InvalidArgument("batch_size".into()),
            SkipgramError::InvalidState("empty corpus".into()),
            SkipgramError::io(
                std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
                Some(PathBuf::from("text8")),
            ),
            SkipgramError::Internal("unreachable".into()),
        ];
        for err in &errors {
            assert!(err.to_string().starts_with(category(err)), "{err}");
        }
        assert!(errors[0].is_invalid_argument());
        assert!(errors[1].is_invalid_state());
        assert!(!errors[2].is_invalid_argument() && !errors[2].is_invalid_state());
    }
}
