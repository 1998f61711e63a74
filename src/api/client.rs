//! Session file API client with request/response handling.

use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use super::response::parse_response;
use crate::config::ClientConfig;
use crate::error::{FsError, Result};
use crate::fs::entry::RemoteEntry;
use crate::fs::path::{join_path, normalize_path};
use crate::fs::{DirectoryEntry, RemoteDirectory, RemoteFuture};
use crate::http::{HttpClient, AUTH_HEADER};

/// Session file API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    server: Url,
}

impl ApiClient {
    /// Create a client for `server` with default settings.
    pub fn new(server: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(server))
    }

    /// Create a client from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let server = Url::parse(&config.server)?;
        if server.cannot_be_a_base() {
            return Err(FsError::Config(format!(
                "Server URL cannot carry a path: {}",
                config.server
            )));
        }
        Ok(Self {
            http: HttpClient::from_config(config)?,
            server,
        })
    }

    pub fn server(&self) -> &Url {
        &self.server
    }

    /// Build `{server}/sessions/{id}/{action}?{params}`.
    pub fn endpoint(&self, session_id: &str, action: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.server.clone();
        url.path_segments_mut()
            .map_err(|_| FsError::Config(format!("Server URL cannot carry a path: {}", self.server)))?
            .pop_if_empty()
            .extend(["sessions", session_id, action]);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Endpoint with the auth token embedded in the query, for URLs handed to
    /// collaborators that cannot set headers.
    fn authorized_endpoint(&self, session_id: &str, action: &str, key: &str, value: &str) -> Result<Url> {
        match self.http.token() {
            Some(token) => self.endpoint(session_id, action, &[(key, value), (AUTH_HEADER, token)]),
            None => self.endpoint(session_id, action, &[(key, value)]),
        }
    }

    /// List the direct children of `path`.
    pub async fn list_entries(&self, session_id: &str, path: &str) -> Result<Vec<DirectoryEntry>> {
        let dir = normalize_path(path);
        let url = self.endpoint(session_id, "ls", &[("dir", dir.as_str())])?;
        debug!(session_id, dir = %dir, "api request ls");

        let body = self.http.get(url).await?;
        let data: Option<Vec<RemoteEntry>> = parse_response(&body)?.into_result()?;
        let entries: Vec<DirectoryEntry> = data
            .unwrap_or_default()
            .into_iter()
            .map(DirectoryEntry::from)
            .collect();

        debug!(session_id, dir = %dir, count = entries.len(), "api response ls");
        Ok(entries)
    }

    /// Create directory `name` under `parent`.
    pub async fn make_dir(&self, session_id: &str, parent: &str, name: &str) -> Result<()> {
        let target = join_path(parent, name);
        self.post_action(session_id, "mkdir", &[("dir", target.as_str())])
            .await
    }

    /// Rename `old_path` to `new_path`. Equal paths succeed without a request.
    pub async fn rename_path(&self, session_id: &str, old_path: &str, new_path: &str) -> Result<()> {
        if old_path == new_path {
            debug!(session_id, path = old_path, "rename to same path, skipping request");
            return Ok(());
        }
        self.post_action(
            session_id,
            "rename",
            &[("oldName", old_path), ("newName", new_path)],
        )
        .await
    }

    /// Remove a single file or directory.
    pub async fn remove_path(&self, session_id: &str, path: &str) -> Result<()> {
        self.post_action(session_id, "rm", &[("key", path)]).await
    }

    async fn post_action(&self, session_id: &str, action: &str, params: &[(&str, &str)]) -> Result<()> {
        let url = self.endpoint(session_id, action, params)?;
        debug!(session_id, action, ?params, "api request");

        let body = self.http.post(url).await?;
        parse_response::<Value>(&body)?.into_result()?;

        debug!(session_id, action, "api response ok");
        Ok(())
    }

    /// Download URL for `path`, authorized through the query string.
    pub fn download_link(&self, session_id: &str, path: &str) -> Result<String> {
        Ok(self
            .authorized_endpoint(session_id, "download", "file", path)?
            .to_string())
    }

    /// Upload endpoint for files going into `dir`.
    pub fn upload_link(&self, session_id: &str, dir: &str) -> Result<String> {
        let dir = normalize_path(dir);
        Ok(self
            .authorized_endpoint(session_id, "upload", "dir", &dir)?
            .to_string())
    }
}

impl RemoteDirectory for ApiClient {
    fn list(&self, session_id: String, path: String) -> RemoteFuture<Vec<DirectoryEntry>> {
        let client = self.clone();
        Box::pin(async move { client.list_entries(&session_id, &path).await })
    }

    fn mkdir(&self, session_id: String, parent: String, name: String) -> RemoteFuture<()> {
        let client = self.clone();
        Box::pin(async move { client.make_dir(&session_id, &parent, &name).await })
    }

    fn rename(&self, session_id: String, old_path: String, new_path: String) -> RemoteFuture<()> {
        let client = self.clone();
        Box::pin(async move { client.rename_path(&session_id, &old_path, &new_path).await })
    }

    fn remove(&self, session_id: String, path: String) -> RemoteFuture<()> {
        let client = self.clone();
        Box::pin(async move { client.remove_path(&session_id, &path).await })
    }

    fn download_url(&self, session_id: &str, path: &str) -> Result<String> {
        self.download_link(session_id, path)
    }

    fn upload_target(&self, session_id: &str, dir: &str) -> Result<String> {
        self.upload_link(session_id, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, answer it with `status` and `body`, and hand
    /// back the raw request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
                if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&buf[..read]).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn test_endpoint_building() {
        let client = ApiClient::new("https://bastion.example/api/").unwrap();
        let url = client.endpoint("s-1", "mkdir", &[("dir", "/a/sub")]).unwrap();
        assert_eq!(url.path(), "/api/sessions/s-1/mkdir");
        assert_eq!(query_of(url.as_str())["dir"], "/a/sub");
    }

    #[test]
    fn test_rejects_non_base_server() {
        assert!(matches!(
            ApiClient::new("mailto:ops@example.com"),
            Err(FsError::Config(_))
        ));
        assert!(ApiClient::new("not a url").is_err());
    }

    #[test]
    fn test_download_link_is_preauthorized() {
        let config = ClientConfig::new("https://bastion.example").with_token("tok");
        let client = ApiClient::from_config(&config).unwrap();
        let link = client.download_link("s1", "/var/log/syslog").unwrap();
        let query = query_of(&link);
        assert!(link.starts_with("https://bastion.example/sessions/s1/download?"));
        assert_eq!(query["file"], "/var/log/syslog");
        assert_eq!(query[AUTH_HEADER], "tok");
    }

    #[test]
    fn test_upload_link_scoped_to_dir() {
        let client = ApiClient::new("https://bastion.example").unwrap();
        let link = client.upload_link("s1", "").unwrap();
        let query = query_of(&link);
        assert_eq!(query["dir"], "/");
        assert!(!query.contains_key(AUTH_HEADER));
    }

    #[tokio::test]
    async fn test_list_entries() {
        let (server, request) = serve_once(
            "200 OK",
            r#"{"code":1,"message":"success","data":[
                {"path":"/home/user","name":"user","isDir":true,"isLink":false,"size":4096,"modTime":"2024-05-01 12:00:00","mode":"drwxr-xr-x"},
                {"path":"/home/notes.txt","name":"notes.txt","isDir":false,"isLink":false,"size":12,"modTime":"2024-05-02 08:30:00","mode":"-rw-r--r--"}
            ]}"#,
        )
        .await;
        let config = ClientConfig::new(server).with_token("tok");
        let client = ApiClient::from_config(&config).unwrap();

        let entries = client.list_entries("s1", "/home/").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "/home/user");
        assert!(entries[0].is_dir);
        assert_eq!(entries[1].size, 12);

        let head = request.await.unwrap();
        assert!(head.starts_with("GET /sessions/s1/ls?dir=%2Fhome HTTP/1.1"), "{}", head);
        assert!(head.to_ascii_lowercase().contains("x-auth-token: tok"));
    }

    #[tokio::test]
    async fn test_list_blank_path_is_root() {
        let (server, request) = serve_once("200 OK", r#"{"code":1,"message":"","data":null}"#).await;
        let client = ApiClient::new(&server).unwrap();

        let entries = client.list_entries("s1", "").await.unwrap();
        assert!(entries.is_empty());
        assert!(request.await.unwrap().starts_with("GET /sessions/s1/ls?dir=%2F HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_mkdir_joins_path() {
        let (server, request) = serve_once("200 OK", r#"{"code":1,"message":"success"}"#).await;
        let client = ApiClient::new(&server).unwrap();

        client.make_dir("s1", "/a", "sub").await.unwrap();
        assert!(request
            .await
            .unwrap()
            .starts_with("POST /sessions/s1/mkdir?dir=%2Fa%2Fsub HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_remote_error_is_verbatim() {
        let (server, _request) =
            serve_once("200 OK", r#"{"code":0,"message":"mkdir /a/sub: file exists"}"#).await;
        let client = ApiClient::new(&server).unwrap();

        let err = client.make_dir("s1", "/a", "sub").await.unwrap_err();
        assert!(err.is_remote());
        assert_eq!(err.to_string(), "mkdir /a/sub: file exists");
    }

    #[tokio::test]
    async fn test_http_status_is_transport_error() {
        let (server, _request) = serve_once("500 Internal Server Error", "").await;
        let client = ApiClient::new(&server).unwrap();

        let err = client.remove_path("s1", "/tmp/x").await.unwrap_err();
        assert!(matches!(err, FsError::HttpError(500)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        });
        let config = ClientConfig::new(format!("http://{}", addr)).with_timeout_secs(1);
        let client = ApiClient::from_config(&config).unwrap();

        let err = client.list_entries("s1", "/").await.unwrap_err();
        assert!(matches!(err, FsError::Timeout));
    }

    #[tokio::test]
    async fn test_rename_same_path_skips_request() {
        // Nothing listens here; any request would fail.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        client.rename_path("s1", "/a/b", "/a/b").await.unwrap();
    }
}
