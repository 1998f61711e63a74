//! Session file API client and types.

pub mod client;
pub mod response;

pub use client::ApiClient;
pub use response::{ApiResponse, SUCCESS_CODE};
