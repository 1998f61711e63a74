//! Client configuration.
//!
//! Values can come from code, from the environment, or from a TOML file:
//!
//! ```toml
//! server = "https://bastion.example.com/api"
//! token = "f3a1..."
//! timeout_secs = 20
//! delete_concurrency = 4
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{FsError, Result};

const DEFAULT_SERVER: &str = "http://127.0.0.1:8088";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Settings shared by the HTTP client and the browser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the session file API, without a trailing `/sessions`.
    pub server: String,
    /// Auth token sent as `X-Auth-Token` and embedded in download/upload URLs.
    pub token: Option<String>,
    /// Optional HTTP/SOCKS proxy URL.
    pub proxy: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Number of removals a batch delete keeps in flight. 1 means sequential.
    pub delete_concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            token: None,
            proxy: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delete_concurrency: 1,
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at `server` with every other value defaulted.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_delete_concurrency(mut self, concurrency: usize) -> Self {
        self.delete_concurrency = concurrency;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Batch concurrency clamped to at least one in-flight request.
    pub fn effective_delete_concurrency(&self) -> usize {
        self.delete_concurrency.max(1)
    }

    /// Build a config from `SESSIONFS_*` environment variables.
    ///
    /// Unset variables keep their defaults; malformed numbers are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(server) = lookup("SESSIONFS_SERVER") {
            config.server = server;
        }
        config.token = lookup("SESSIONFS_TOKEN").filter(|t| !t.is_empty());
        config.proxy = lookup("SESSIONFS_PROXY").filter(|p| !p.is_empty());
        if let Some(raw) = lookup("SESSIONFS_TIMEOUT_SECS") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                FsError::Config(format!("SESSIONFS_TIMEOUT_SECS is not a number: {raw}"))
            })?;
        }
        if let Some(raw) = lookup("SESSIONFS_DELETE_CONCURRENCY") {
            config.delete_concurrency = raw.trim().parse().map_err(|_| {
                FsError::Config(format!(
                    "SESSIONFS_DELETE_CONCURRENCY is not a number: {raw}"
                ))
            })?;
        }
        Ok(config)
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| FsError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FsError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.effective_delete_concurrency(), 1);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("https://bastion.local")
            .with_token("tok")
            .with_timeout_secs(5)
            .with_delete_concurrency(0);
        assert_eq!(config.server, "https://bastion.local");
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.effective_delete_concurrency(), 1);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("SESSIONFS_SERVER", "https://b.example"),
            ("SESSIONFS_TOKEN", "abc"),
            ("SESSIONFS_PROXY", ""),
            ("SESSIONFS_DELETE_CONCURRENCY", "3"),
        ]
        .into_iter()
        .collect();
        let config =
            ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.server, "https://b.example");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert!(config.proxy.is_none());
        assert_eq!(config.delete_concurrency, 3);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_lookup_rejects_bad_number() {
        let res = ClientConfig::from_lookup(|k| {
            (k == "SESSIONFS_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(res, Err(FsError::Config(_))));
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server = \"https://bastion.example\"").unwrap();
        writeln!(file, "token = \"t0k\"").unwrap();
        writeln!(file, "delete_concurrency = 4").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.server, "https://bastion.example");
        assert_eq!(config.token.as_deref(), Some("t0k"));
        assert_eq!(config.delete_concurrency, 4);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ClientConfig::from_toml_str("server = [").is_err());
    }
}
