use thiserror::Error;

/// Raised while building a [`Notifier`](crate::Notifier). No notifier exists afterwards.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("webhook endpoint URL is missing")]
    MissingEndpoint,

    #[error("webhook endpoint URL is not a valid http(s) URL: {0}")]
    InvalidEndpoint(String),

    #[error("default message text must not be empty")]
    EmptyDefaultText,

    #[error("transport `{0}` is not registered")]
    UnknownTransport(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Delivery failure for a single message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Endpoint answered with a non-2xx status.
    #[error("webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request never produced a response (DNS, connect, timeout...).
    #[error("webhook request failed: {0}")]
    Transport(String),

    #[error("failed to encode payload: {0}")]
    Encode(String),
}

impl TransportFailure {
    /// Text recorded in the failure log: the response body for HTTP errors,
    /// the error message otherwise.
    pub fn response(&self) -> &str {
        match self {
            TransportFailure::Status { body, .. } => body.as_str(),
            TransportFailure::Transport(msg) | TransportFailure::Encode(msg) => msg.as_str(),
        }
    }

    pub(crate) fn reason(&self) -> &'static str {
        match self {
            TransportFailure::Status { .. } => "status",
            TransportFailure::Transport(_) => "transport",
            TransportFailure::Encode(_) => "encode",
        }
    }
}
