//! Response envelope of the session file API.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{FsError, Result};

/// Code the server uses for success. Anything else is an application failure.
pub const SUCCESS_CODE: i64 = 1;

/// `{code, message, data?}` wrapper around every JSON response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Turn a non-success code into [`FsError::RemoteError`] carrying the
    /// server message untouched.
    pub fn into_result(self) -> Result<Option<T>> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(FsError::RemoteError {
                code: self.code,
                message: self.message,
            })
        }
    }
}

/// Parse a response body.
///
/// A body that is not an envelope at all is a transport problem, not a
/// remote failure.
pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<ApiResponse<T>> {
    serde_json::from_str(body).map_err(|_| FsError::InvalidResponse)
}
