//! Error types and handling for `Wanderplan`

use thiserror::Error;

/// Main error type for the `Wanderplan` library
#[derive(Error, Debug)]
pub enum WanderplanError {
    /// The recommendation endpoint answered with a non-success status
    #[error("HTTP error! status: {status}")]
    Transport { status: u16 },

    /// The request never produced a response
    #[error("{message}")]
    Network { message: String },

    /// The endpoint answered successfully but carried an `error` field
    #[error("{message}")]
    Service { message: String },

    /// The payload could not be decoded into a recommendation result
    #[error("{message}")]
    Parse { message: String },

    /// A view region is missing or could not be written
    #[error("{message}")]
    Render { message: String },

    /// The language model call failed
    #[error("Gemini API error: {message}")]
    Model { message: String },

    /// Input validation errors
    #[error("{message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WanderplanError {
    /// Create a new transport error for a non-success status code
    #[must_use]
    pub fn transport(status: u16) -> Self {
        Self::Transport { status }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new service error
    pub fn service<S: Into<String>>(message: S) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new language model error
    pub fn model<S: Into<String>>(message: S) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Text written to the error surface for this error
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WanderplanError::Render { message } => {
                format!("Error displaying recommendations: {message}")
            }
            other => format!("Error: {other}"),
        }
    }
}

impl From<serde_json::Error> for WanderplanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for WanderplanError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::transport(status.as_u16()),
            None => Self::network(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let transport_err = WanderplanError::transport(502);
        assert!(matches!(transport_err, WanderplanError::Transport { status: 502 }));

        let service_err = WanderplanError::service("quota exceeded");
        assert!(matches!(service_err, WanderplanError::Service { .. }));

        let render_err = WanderplanError::render("Required containers not found");
        assert!(matches!(render_err, WanderplanError::Render { .. }));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            WanderplanError::transport(500).user_message(),
            "Error: HTTP error! status: 500"
        );
        assert_eq!(
            WanderplanError::service("quota exceeded").user_message(),
            "Error: quota exceeded"
        );
        assert_eq!(
            WanderplanError::render("Required containers not found").user_message(),
            "Error displaying recommendations: Required containers not found"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: WanderplanError = json_err.into();
        assert!(matches!(err, WanderplanError::Parse { .. }));
        assert!(err.user_message().starts_with("Error: "));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WanderplanError = io_err.into();
        assert!(matches!(err, WanderplanError::Io { .. }));
    }

    #[test]
    fn test_model_error_prefix() {
        let err = WanderplanError::model("quota exhausted");
        assert_eq!(err.to_string(), "Gemini API error: quota exhausted");
    }
}
