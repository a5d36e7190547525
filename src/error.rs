/// Console error types
///
/// An empty result set is not an error; fetches report it through
/// [`crate::logs::FetchOutcome::Empty`].
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Client-detected problem; no network call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend reported a missing resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure, timeout or unreachable backend
    #[error("Transport error: {0}")]
    Transport(String),

    /// Any other non-2xx answer from the backend
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ConsoleError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Short machine-readable kind, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Transport(_) => "transport_error",
            Self::Api { .. } => "api_error",
            Self::Decode(_) => "decode_error",
        }
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ConsoleError::validation("missing search id");
        assert_eq!(error.to_string(), "Validation error: missing search id");

        let error = ConsoleError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "API error (500): boom");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(ConsoleError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(ConsoleError::Transport("x".into()).kind(), "transport_error");
        assert!(ConsoleError::validation("x").is_validation());
        assert!(!ConsoleError::validation("x").is_not_found());
    }

    #[test]
    fn test_json_error_maps_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: ConsoleError = err.into();
        assert!(matches!(error, ConsoleError::Decode(_)));
    }
}
