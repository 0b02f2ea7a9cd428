use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("job failed: {0}")]
    JobFailed(String),
    #[error("cancelled")]
    Cancelled,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Builds the error for a non-success response. `detail` is the
    /// server's own explanation when the body carried one.
    pub fn from_status(status: StatusCode, detail: Option<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized,
            StatusCode::NOT_FOUND => AppError::NotFound,
            _ => AppError::Http {
                status: status.as_u16(),
                message: detail.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            },
        }
    }

    /// Text shown to the operator.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Unauthorized => "Wrong username or password, or the session has expired".into(),
            AppError::NotFound => "Not found".into(),
            AppError::Http { message, .. } => message.clone(),
            AppError::Network(e) => format!("Backend unreachable: {}", e),
            AppError::Decode(msg) => format!("Unexpected backend response: {}", msg),
            AppError::JobFailed(msg) => msg.clone(),
            AppError::Cancelled => "Cancelled".into(),
            AppError::NotLoggedIn => "Not logged in, run `login` first".into(),
            AppError::Io(e) => format!("File error: {}", e),
            AppError::Config(msg) => format!("Configuration error: {}", msg),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            AppError::from_status(StatusCode::UNAUTHORIZED, None),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::NOT_FOUND, Some("Job not found".into())),
            AppError::NotFound
        ));
        let err = AppError::from_status(StatusCode::BAD_GATEWAY, None);
        assert_eq!(err.user_message(), "HTTP 502");
        let err = AppError::from_status(StatusCode::UNPROCESSABLE_ENTITY, Some("bad region".into()));
        assert_eq!(err.user_message(), "bad region");
    }

    #[test]
    fn job_failure_text_is_verbatim() {
        let err = AppError::JobFailed("WB API timeout on shard 7".into());
        assert_eq!(err.user_message(), "WB API timeout on shard 7");
    }
}
