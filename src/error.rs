use thiserror::Error;

/// Result type for Venstar operations
pub type Result<T> = std::result::Result<T, VenstarError>;

/// Errors that can occur when discovering or controlling thermostats
#[derive(Error, Debug)]
pub enum VenstarError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Device answered with a non-2xx status
    #[error("HTTP status: {0}")]
    Status(reqwest::StatusCode),

    /// Device rejected the request
    #[error("API error: {reason}")]
    ApiError {
        /// Reason text reported by the device
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Address could not be parsed or extended
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Base address cannot carry a path
    #[error("URL cannot be a base: {0}")]
    NotABaseUrl(url::Url),

    /// Discovery payload is not an HTTP-style header block
    #[error("Malformed discovery response: {0}")]
    MalformedResponse(String),

    /// Discovery payload lacks a required header
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    /// Heat and cool setpoints are too close together
    #[error("difference between heat & cool temps ({spread}) less than 2 degrees")]
    SetpointSpread {
        /// Cool setpoint minus heat setpoint
        spread: f64,
    },

    /// The state read that precedes every mutation failed
    #[error("error getting current settings: {0}")]
    Snapshot(#[source] Box<VenstarError>),

    /// Request body could not be form-encoded
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
}

/// Errors produced by the form encoder
///
/// These indicate a mismatch between a settings type and the encoder, not a
/// runtime condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The value to encode was absent
    #[error("nil input")]
    NilInput,

    /// A field holds a kind the encoder cannot format
    #[error("unsupported field {field} type {kind}")]
    UnsupportedField {
        /// Declared field identifier
        field: &'static str,
        /// Name of the offending kind
        kind: &'static str,
    },
}
