//! HTTP client wrapper for session file API requests.

use std::time::Duration;

use reqwest::{Client, Method, Url};
use tokio::time::timeout;

use crate::config::ClientConfig;
use crate::error::{FsError, Result};

/// Header carrying the auth token on every request.
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// HTTP client for making requests to the bastion server.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    token: Option<String>,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            token: None,
            timeout: ClientConfig::default().timeout(),
        }
    }

    /// Create a client from configuration, honouring its proxy, token and timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| FsError::Config(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| FsError::Config(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            token: config.token.clone(),
            timeout: config.timeout(),
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Make a GET request.
    ///
    /// # Returns
    /// Response body as string
    pub async fn get(&self, url: Url) -> Result<String> {
        self.send(Method::GET, url).await
    }

    /// Make a POST request with an empty body.
    ///
    /// All parameters of the session file API travel in the query string.
    pub async fn post(&self, url: Url) -> Result<String> {
        self.send(Method::POST, url).await
    }

    async fn send(&self, method: Method, url: Url) -> Result<String> {
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.header(AUTH_HEADER, token);
        }

        let exchange = async {
            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(FsError::HttpError(response.status().as_u16()));
            }
            Ok::<String, FsError>(response.text().await?)
        };

        timeout(self.timeout, exchange)
            .await
            .map_err(|_| FsError::Timeout)?
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
