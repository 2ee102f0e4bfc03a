use std::fmt;

/// Failure taxonomy shared by the data-access layer and the HTTP handlers
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed input; surfaced as 400 with the message
    Validation(String),
    /// Store read/write failure; surfaced as 500, message kept for logs
    Persistence(String),
    /// A collaborator read needed for aggregation failed
    DataUnavailable(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// Re-tag a store failure as a collaborator outage for aggregation paths
    pub fn into_unavailable(self) -> Self {
        match self {
            AppError::Persistence(message) => AppError::DataUnavailable(message),
            other => other,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(message) => write!(f, "{}", message),
            AppError::Persistence(message) => write!(f, "Database error: {}", message),
            AppError::DataUnavailable(message) => write!(f, "Data unavailable: {}", message),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_only_retags_store_failures() {
        let err = AppError::Persistence("disk I/O error".to_string()).into_unavailable();
        assert!(matches!(err, AppError::DataUnavailable(ref m) if m == "disk I/O error"));

        let err = AppError::validation("Lecture ID is required").into_unavailable();
        assert!(err.is_validation());
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = AppError::validation("No present or absent student IDs provided");
        assert_eq!(err.to_string(), "No present or absent student IDs provided");
    }
}
