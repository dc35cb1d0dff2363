//! Authenticated HTTP client for a Cavemark instance.
//!
//! Async client using `reqwest`. Credential headers are attached to every
//! request when they are configured.

use cavemark_protocol::{API_KEY_HEADER, API_SECRET_KEY_HEADER};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

/// Errors from the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid credential header value")]
    InvalidCredentials,

    #[error("invalid content type: {0}")]
    InvalidContentType(String),
}

/// API credentials. Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub api_secret_key: Option<String>,
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    /// The deploy API acknowledges every upload and control call with 204.
    pub fn is_no_content(&self) -> bool {
        self.status == 204
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client bound to one Cavemark base URL.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Creates a client for `base_url`, attaching `credentials` to every request.
    pub fn new(base_url: &str, credentials: &Credentials) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        insert_credential(&mut headers, API_KEY_HEADER, credentials.api_key.as_deref())?;
        insert_credential(
            &mut headers,
            API_SECRET_KEY_HEADER,
            credentials.api_secret_key.as_deref(),
        )?;

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs a GET request.
    pub async fn get(&self, path: &str) -> Result<Reply, TransportError> {
        self.send(Method::GET, path, cavemark_protocol::constants::TEXT_PLAIN, Vec::new())
            .await
    }

    /// Performs a PUT request with the given body.
    pub async fn put(
        &self,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Reply, TransportError> {
        self.send(Method::PUT, path, content_type, body).await
    }

    /// Performs a POST request with the given body.
    pub async fn post(
        &self,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Reply, TransportError> {
        self.send(Method::POST, path, content_type, body).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Reply, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let content_type = HeaderValue::from_str(content_type)
            .map_err(|_| TransportError::InvalidContentType(content_type.to_string()))?;

        tracing::debug!(%method, %url, bytes = body.len(), "sending request");

        let resp = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();

        tracing::debug!(%url, status, "response received");

        Ok(Reply { status, body })
    }
}

fn insert_credential(
    headers: &mut HeaderMap,
    name: &'static str,
    value: Option<&str>,
) -> Result<(), TransportError> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    let mut value = HeaderValue::from_str(value).map_err(|_| TransportError::InvalidCredentials)?;
    value.set_sensitive(true);
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
