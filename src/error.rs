//! Error types for parlor.
//!
//! Every fallible operation in the crate returns [`Result`].  The variants
//! separate transport failures (which the widget surfaces as a visible
//! notice) from local problems such as an unreadable state file.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The main error type for parlor.
#[derive(Clone, Debug)]
pub enum Error {
    /// The chat service answered with a non-success status.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Human-readable error message, usually the response body.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// The chat service could not be reached.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Any other failure inside the HTTP client.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// A local argument or configuration value was rejected.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Parameter that failed validation.
        param: Option<String>,
    },

    /// A URL could not be parsed or joined.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// An output target the view writes into is unavailable.
    MissingTarget {
        /// Name of the target.
        target: String,
    },
}

impl Error {
    /// Creates a new API error.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new missing target error.
    pub fn missing_target(target: impl Into<String>) -> Self {
        Error::MissingTarget {
            target: target.into(),
        }
    }

    /// True when the request never produced a usable response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Api { .. }
                | Error::Timeout { .. }
                | Error::Connection { .. }
                | Error::HttpClient { .. }
        )
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::Serialization { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_missing_target(&self) -> bool {
        matches!(self, Error::MissingTarget { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api {
                status_code,
                message,
            } => {
                write!(f, "API error ({status_code}): {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::MissingTarget { target } => {
                write!(f, "Missing output target: {target}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. }
            | Error::HttpClient { source, .. }
            | Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source.as_ref()),
            Error::Url { source, .. } => source
                .as_ref()
                .map(|e| e as &(dyn error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(err.to_string(), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(err.to_string(), Some(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::timeout(err.to_string(), None)
        } else if err.is_connect() {
            Error::connection(err.to_string(), Some(Box::new(err)))
        } else if err.is_decode() {
            Error::serialization(err.to_string(), Some(Box::new(err)))
        } else {
            Error::http_client(err.to_string(), Some(Box::new(err)))
        }
    }
}

/// Result type alias for parlor operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_classification() {
        assert!(Error::api(502, "bad gateway").is_transport());
        assert!(Error::timeout("slow", Some(30.0)).is_transport());
        assert!(Error::connection("refused", None).is_transport());
        assert!(Error::http_client("broken", None).is_transport());
        assert!(!Error::serialization("garbled", None).is_transport());
        assert!(!Error::missing_target("stdout").is_transport());
        assert!(!Error::io("disk", std::io::Error::other("full")).is_transport());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::api(400, "Conversation not started").to_string(),
            "API error (400): Conversation not started"
        );
        assert_eq!(
            Error::timeout("no answer", Some(30.0)).to_string(),
            "Timeout error: no answer (30 seconds)"
        );
        assert_eq!(
            Error::validation("must not be empty", Some("base_url".to_string())).to_string(),
            "Validation error: must not be empty (parameter: base_url)"
        );
        assert_eq!(
            Error::missing_target("transcript").to_string(),
            "Missing output target: transcript"
        );
    }

    #[test]
    fn status_code_only_for_api() {
        assert_eq!(Error::api(503, "down").status_code(), Some(503));
        assert_eq!(Error::timeout("slow", None).status_code(), None);
    }

    #[test]
    fn io_conversion_keeps_source() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "no file").into();
        assert!(matches!(err, Error::Io { .. }));
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn json_conversion() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.is_serialization());
    }

    #[tokio::test]
    async fn reqwest_conversion_keeps_source() {
        let err: Error = reqwest::Client::new()
            .post("not a url")
            .send()
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::HttpClient { .. }));
        assert!(err.is_transport());
        assert!(error::Error::source(&err).is_some());
    }
}
