//! Error types for the sessionfs library.

use thiserror::Error;

/// Main error type for sessionfs operations.
#[derive(Error, Debug)]
pub enum FsError {
    /// HTTP request failed with status code.
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Invalid or unexpected response from server.
    #[error("Invalid response from server")]
    InvalidResponse,

    /// The session file API answered with a non-success code.
    ///
    /// The message is the server's own text and is shown to the user as-is.
    #[error("{message}")]
    RemoteError { code: i64, message: String },

    /// Input rejected before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// A directory listing is already in flight.
    #[error("Browser busy: {0}")]
    Busy(String),

    /// Command not allowed in the browser's current phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// The browser actor is gone.
    #[error("Browser actor stopped")]
    ActorStopped,
}

/// Coarse classification used by callers deciding how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, timeout or undecodable response. Retrying is up to the caller.
    Transport,
    /// Application-level failure reported by the remote side.
    RemoteOperation,
    /// Rejected locally, nothing was dispatched.
    Validation,
    /// Browser state or lifecycle problem.
    Internal,
}

impl FsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::HttpError(_)
            | FsError::RequestError(_)
            | FsError::Timeout
            | FsError::UrlError(_)
            | FsError::InvalidResponse => ErrorKind::Transport,
            FsError::RemoteError { .. } => ErrorKind::RemoteOperation,
            FsError::Validation(_) => ErrorKind::Validation,
            FsError::Busy(_)
            | FsError::InvalidState(_)
            | FsError::Config(_)
            | FsError::ActorStopped => ErrorKind::Internal,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_remote(&self) -> bool {
        self.kind() == ErrorKind::RemoteOperation
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// Result type alias for sessionfs operations.
pub type Result<T> = std::result::Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(FsError::HttpError(502).kind(), ErrorKind::Transport);
        assert_eq!(FsError::Timeout.kind(), ErrorKind::Transport);
        assert_eq!(FsError::InvalidResponse.kind(), ErrorKind::Transport);
        assert_eq!(
            FsError::RemoteError {
                code: 0,
                message: "permission denied".to_string()
            }
            .kind(),
            ErrorKind::RemoteOperation
        );
        assert!(FsError::Validation("empty".to_string()).is_validation());
        assert_eq!(FsError::ActorStopped.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_remote_message_is_verbatim() {
        let err = FsError::RemoteError {
            code: -1,
            message: "文件已存在".to_string(),
        };
        assert_eq!(err.to_string(), "文件已存在");
        assert!(err.is_remote());
        assert!(!err.is_transport());
    }
}
