//! Remote catalog service: the `CatalogService` seam plus the Subsonic HTTP
//! client behind it.
//!
//! Every request is a GET carrying the fixed credential parameters
//! (`f=json&u=&p=&v=&c=`) and an optional `id`.  Responses are envelopes:
//!
//! ```text
//! { "subsonic-response": { "status": "ok" | "failed", "error": {...}, ... } }
//! ```
//!
//! The client returns the whole parsed document; `unwrap_envelope` is applied
//! by the catalog cache so fakes in tests can return raw documents too.

use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::ServerConfig;
use crate::protocol::Operation;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid server url {0:?}")]
    BadUrl(String),
    #[error("server returned status {status:?}: {message}")]
    Status { status: String, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The remote catalog collaborator: given an operation and an optional id,
/// return a parsed document or fail.
#[allow(async_fn_in_trait)]
pub trait CatalogService {
    async fn call(&self, op: Operation, id: Option<&str>) -> Result<Value, CatalogError>;
}

/// Connection parameters shared by the API client and stream URL generation.
#[derive(Debug, Clone)]
pub struct Connection {
    base: String,
    user: String,
    password: String,
    version: String,
    client: String,
}

impl Connection {
    pub fn new(server: &ServerConfig) -> Self {
        let url = server.url.trim_end_matches('/');
        let base = match server.port {
            Some(port) => format!("{}:{}", url, port),
            None => url.to_string(),
        };
        Self {
            base,
            user: server.user.clone(),
            password: server.password.clone(),
            version: server.version.clone(),
            client: server.client.clone(),
        }
    }

    /// `<url>:<port>/<path>?f=json&u=..&p=..&v=..&c=..[&id=..]`
    pub fn url(&self, op: Operation, id: Option<&str>) -> Result<Url, CatalogError> {
        let raw = format!("{}/{}", self.base, op.path());
        let mut url = Url::parse(&raw).map_err(|_| CatalogError::BadUrl(raw.clone()))?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("f", "json")
                .append_pair("u", &self.user)
                .append_pair("p", &self.password)
                .append_pair("v", &self.version)
                .append_pair("c", &self.client);
            if let Some(id) = id {
                q.append_pair("id", id);
            }
        }
        Ok(url)
    }

    pub fn stream_url(&self, song_id: &str) -> Result<Url, CatalogError> {
        self.url(Operation::Stream, Some(song_id))
    }
}

/// Strip the `subsonic-response` envelope, failing on anything but `"ok"`.
pub fn unwrap_envelope(mut doc: Value) -> Result<Value, CatalogError> {
    let body = doc
        .get_mut("subsonic-response")
        .map(Value::take)
        .ok_or_else(|| CatalogError::Malformed("missing subsonic-response".to_string()))?;
    let status = body
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::Malformed("missing status".to_string()))?;
    if status != "ok" {
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("no error message")
            .to_string();
        return Err(CatalogError::Status {
            status: status.to_string(),
            message,
        });
    }
    Ok(body)
}

/// Subsonic REST client.
pub struct SubsonicClient {
    http: reqwest::Client,
    conn: Connection,
}

impl SubsonicClient {
    pub fn new(conn: Connection) -> Self {
        Self {
            http: reqwest::Client::new(),
            conn,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Check credentials and reachability; any non-ok answer is an error.
    pub async fn ping(&self) -> Result<(), CatalogError> {
        let doc = self.call(Operation::Ping, None).await?;
        unwrap_envelope(doc).map(|_| ())
    }
}

impl CatalogService for SubsonicClient {
    async fn call(&self, op: Operation, id: Option<&str>) -> Result<Value, CatalogError> {
        let url = self.conn.url(op, id)?;
        let shown = url.path().to_string();
        debug!("api: GET {} id={:?}", shown, id);
        let transport = |source| CatalogError::Transport {
            url: shown.clone(),
            source,
        };
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?;
        resp.json::<Value>().await.map_err(transport)
    }
}
