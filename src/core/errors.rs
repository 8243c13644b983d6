use thiserror::Error;

/// Error taxonomy shared by every adapter and the gateway.
///
/// All remote-API fallibility (bad credentials, timeouts, refused
/// operations, garbage bodies) is a value of this type, never a panic.
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("panel {0} not found")]
    PanelNotFound(i64),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("panel unreachable: {0}")]
    Unreachable(String),

    #[error("panel offline: {0}")]
    Offline(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("remote panel error {status}: {message}")]
    RemoteHttp { status: u16, message: String },

    #[error("malformed panel response: {0}")]
    MalformedResponse(String),

    #[error("operation {operation} is not supported by {kind} panels")]
    Unsupported {
        kind: &'static str,
        operation: &'static str,
    },

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),
}

impl PanelError {
    /// True for errors the caller may reasonably retry with backoff.
    /// This crate itself never retries (see the gateway contract).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unreachable(_) | Self::Offline(_) | Self::ConnectionFailed(_)
        )
    }
}
