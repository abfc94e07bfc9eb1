//! `reqwest` backed transport.

use super::{ClientError, Transport};
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::RequestBuilder;
use serde_json::Value;
use std::path::Path;
use std::pin::pin;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// HTTP transport carrying a single authentication header on every request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
}

impl HttpClient {
    /// Builds a client that sends `auth_header: secret` with each request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidHeader`] if the header name or value is
    /// not valid, or [`ClientError::Http`] if the client cannot be built.
    pub fn new(auth_header: &str, secret: &str) -> Result<Self, ClientError> {
        let invalid = || ClientError::InvalidHeader {
            name: auth_header.to_string(),
        };
        let name = HeaderName::from_bytes(auth_header.as_bytes()).map_err(|_| invalid())?;
        let mut value = HeaderValue::from_str(secret).map_err(|_| invalid())?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(name, value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                "redmine-gitlab-migrator/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { http })
    }

    async fn send_json(
        &self,
        method: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Value, ClientError> {
        debug!(method, url, "Sending request");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Value, ClientError> {
        self.send_json("GET", url, self.http.get(url).query(query)).await
    }

    async fn post(
        &self,
        url: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ClientError> {
        self.send_json("POST", url, self.http.post(url).query(query).json(body)).await
    }

    async fn put(
        &self,
        url: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ClientError> {
        self.send_json("PUT", url, self.http.put(url).query(query).json(body)).await
    }

    async fn download(
        &self,
        url: &str,
        query: &[(String, String)],
        destination: &Path,
    ) -> Result<u64, ClientError> {
        debug!(url, destination = %destination.display(), "Downloading file");
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                method: "GET",
                url: url.to_string(),
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let io_error = |source| ClientError::Io {
            path: destination.display().to_string(),
            source,
        };
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let mut file = File::create(destination).await.map_err(io_error)?;
        let mut body = pin!(response.bytes_stream());
        let mut written = 0u64;
        while let Some(chunk) = body.try_next().await? {
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_error)?;
        Ok(written)
    }
}
