//! Error types for the kindle-weather crates.

use thiserror::Error;

/// Result type alias using DisplayError.
pub type DisplayResult<T> = Result<T, DisplayError>;

/// Primary error type for fetch, store and render operations.
#[derive(Debug, Error)]
pub enum DisplayError {
    // === Transport Errors ===
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("HTTP error {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    // === Data Errors ===
    #[error("Failed to decode {source_name} response: {message}")]
    Decode {
        source_name: &'static str,
        message: String,
    },

    #[error("No data in {source_name} response: {message}")]
    NoData {
        source_name: &'static str,
        message: String,
    },

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },

    // === Storage Errors ===
    #[error("Database error: {0}")]
    Database(String),

    // === Rendering Errors ===
    #[error("Template error: {0}")]
    Template(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl DisplayError {
    /// Shorthand for a decode failure of a named upstream source.
    pub fn decode(source_name: &'static str, message: impl Into<String>) -> Self {
        DisplayError::Decode {
            source_name,
            message: message.into(),
        }
    }

    /// Shorthand for a response that carried no usable data yet.
    pub fn no_data(source_name: &'static str, message: impl Into<String>) -> Self {
        DisplayError::NoData {
            source_name,
            message: message.into(),
        }
    }

    /// Whether a retry of the same request could succeed.
    ///
    /// A malformed body decodes the same way on every attempt, so
    /// [`DisplayError::Decode`] is final. An empty or not yet published
    /// response is not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DisplayError::Transport(_) | DisplayError::HttpStatus { .. } | DisplayError::NoData { .. }
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DisplayError {
    fn from(err: serde_json::Error) -> Self {
        DisplayError::decode("JSON", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(DisplayError::Transport("reset".into()).is_retryable());
        assert!(DisplayError::HttpStatus {
            status: 503,
            url: "https://example.com".into()
        }
        .is_retryable());
        assert!(DisplayError::no_data("air quality", "no data rows").is_retryable());
        assert!(!DisplayError::decode("forecast", "missing field `currently`").is_retryable());
        assert!(!DisplayError::Database("locked".into()).is_retryable());
        assert!(!DisplayError::Template("missing".into()).is_retryable());
    }

    #[test]
    fn test_io_conversion() {
        let err: DisplayError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, DisplayError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
