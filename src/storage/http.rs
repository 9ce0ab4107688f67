//! web3.storage backend over HTTP
//!
//! Writes go to the upload API (`POST {api_url}/upload`, multipart form with
//! one file part named after the logical file name, bearer token auth); the
//! response carries the new object's CID. Reads go through an IPFS gateway
//! (`GET {gateway_url}/ipfs/{cid}/{file_name}`), where a 404 means the object
//! or the entry does not exist. Entry bodies larger than
//! [`HttpStoreConfig::max_entry_bytes`] are refused.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, header};
use serde::Deserialize;
use url::Url;

use crate::content_id::ContentId;
use crate::query::validate_file_name;
use crate::{Error, Result};
use super::{ContentStore, RetryPolicy};

/// Default cap on a single gateway response body (64 MiB)
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

/// Connection settings for [`HttpStore`].
///
/// `Debug` redacts the token.
#[derive(Clone)]
pub struct HttpStoreConfig {
    pub api_url: Url,
    pub gateway_url: Url,
    pub token: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub max_entry_bytes: u64,
}

impl std::fmt::Debug for HttpStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStoreConfig")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("max_entry_bytes", &self.max_entry_bytes)
            .finish()
    }
}

/// Failures talking to the remote backend
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("HTTP error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("{endpoint} returned more than {limit} bytes")]
    TooLarge { endpoint: String, limit: u64 },

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl From<HttpError> for Error {
    fn from(e: HttpError) -> Self {
        Error::BackendUnavailable(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
}

/// [`ContentStore`] backed by web3.storage
#[derive(Debug, Clone)]
pub struct HttpStore {
    http: reqwest::Client,
    api_url: Url,
    gateway_url: Url,
    retry: RetryPolicy,
    max_entry_bytes: u64,
}

impl HttpStore {
    pub fn new(config: HttpStoreConfig) -> std::result::Result<Self, HttpError> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| HttpError::Config("token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| HttpError::Transport {
                endpoint: "client_init".to_string(),
                source: e,
            })?;

        Ok(Self {
            http,
            api_url: config.api_url,
            gateway_url: config.gateway_url,
            retry: config.retry,
            max_entry_bytes: config.max_entry_bytes,
        })
    }

    fn upload_url(&self) -> std::result::Result<Url, HttpError> {
        self.api_url
            .join("upload")
            .map_err(|e| HttpError::Config(format!("invalid api url: {}", e)))
    }

    /// Gateway URL of one entry. Names that would resolve to the object root are refused.
    fn entry_url(&self, id: &ContentId, file_name: &str) -> Result<Url> {
        validate_file_name(file_name)?;

        let cid = id.to_string();
        let mut url = self.gateway_url.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::Config("gateway url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["ipfs", cid.as_str(), file_name]);
        Ok(url)
    }
}

async fn read_capped(endpoint: &str, mut response: reqwest::Response, limit: u64) -> Result<Vec<u8>> {
    let too_large = || HttpError::TooLarge {
        endpoint: endpoint.to_string(),
        limit,
    };
    if response.content_length().is_some_and(|len| len > limit) {
        return Err(too_large().into());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| HttpError::Transport {
        endpoint: endpoint.to_string(),
        source: e,
    })? {
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(too_large().into());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn error_status(endpoint: &str, response: reqwest::Response) -> HttpError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    HttpError::Status {
        endpoint: endpoint.to_string(),
        status,
        body,
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    fn name(&self) -> &'static str {
        "web3"
    }

    async fn fetch(&self, id: &ContentId, file_name: &str) -> Result<Option<Vec<u8>>> {
        let endpoint = "GET /ipfs";
        let url = self.entry_url(id, file_name)?;

        let response = self
            .retry
            .send(endpoint, || self.http.get(url.clone()).send())
            .await
            .map_err(|e| HttpError::Transport {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                read_capped(endpoint, response, self.max_entry_bytes).await.map(Some)
            }
            _ => Err(error_status(endpoint, response).await.into()),
        }
    }

    async fn put(&self, file_name: &str, staged: &Path) -> Result<ContentId> {
        let endpoint = "POST /upload";
        validate_file_name(file_name)?;
        let url = self.upload_url()?;
        let content = tokio::fs::read(staged).await?;

        let response = self
            .retry
            .send(endpoint, || {
                let part = Part::bytes(content.clone()).file_name(file_name.to_string());
                let form = Form::new().part("file", part);
                self.http.post(url.clone()).multipart(form).send()
            })
            .await
            .map_err(|e| HttpError::Transport {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(error_status(endpoint, response).await.into());
        }

        let body: UploadResponse = response.json().await.map_err(|e| HttpError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        ContentId::decode(&body.cid).map_err(|e| {
            HttpError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
