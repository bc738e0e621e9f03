use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum AppError {
    /// The analysis subject is neither a recognizable ticket nor a review,
    /// or one of its fields is out of range.
    #[error("Malformed subject: {0}")]
    MalformedSubject(String),

    /// Configuration could not be read, parsed or validated.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stage looked up a table entry the configuration does not define.
    #[error("Missing entry '{key}' in table '{table}'")]
    MissingTableEntry { table: &'static str, key: String },

    /// An upstream collaborator (repository, report sink, notifier) failed.
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// The analysis service channel is closed or dropped a reply.
    #[error("Actor error: {0}")]
    Actor(String),

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AppError {
    pub(crate) fn missing(table: &'static str, key: impl Into<String>) -> Self {
        AppError::MissingTableEntry {
            table,
            key: key.into(),
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::MalformedSubject(s) => AppError::MalformedSubject(s.clone()),
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::MissingTableEntry { table, key } => AppError::MissingTableEntry {
                table,
                key: key.clone(),
            },
            AppError::Collaborator(s) => AppError::Collaborator(s.clone()),
            AppError::Actor(s) => AppError::Actor(s.clone()),
            AppError::Timeout(s) => AppError::Timeout(s.clone()),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Analysis request timed out: {}", err))
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Config(format!("Invalid automation trigger pattern: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_message() {
        let err = AppError::missing("category_scores", "refund");
        assert_eq!(
            err.to_string(),
            "Missing entry 'refund' in table 'category_scores'"
        );
    }

    #[test]
    fn test_clone_preserves_variant() {
        let err = AppError::MalformedSubject("no kind".to_string());
        assert!(matches!(err.clone(), AppError::MalformedSubject(s) if s == "no kind"));
    }
}
