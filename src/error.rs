/// Failure kinds produced below the HTTP layer. Only `api` turns these into
/// status codes.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("timeout")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AppError {
    /// Short, stable name used in the `type` field of error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Upstream { .. } => "UpstreamError",
            AppError::Timeout => "UpstreamTimeout",
            AppError::Transport(_) => "TransportError",
            AppError::MalformedPayload(_) => "MalformedPayload",
            AppError::NotFound(_) => "NotFound",
            AppError::Configuration(_) => "ConfigurationError",
            AppError::InvalidRequest(_) => "InvalidRequest",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the provider key as a query parameter.
        let err = err.without_url();
        if err.is_timeout() {
            AppError::Timeout
        } else if err.is_decode() {
            AppError::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedPayload(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
