//! Byte fetching for remote backgrounds.
//!
//! DESIGN
//! ======
//! The session never talks to the network directly. It holds an
//! `Arc<dyn ByteFetcher>` and calls it from a spawned task, so tests swap in
//! a scripted fetcher and the owner task stays free of I/O. One attempt per
//! request: a failure is reported to the caller, which degrades it to "no
//! image".
//!
//! `http`/`https` go through `reqwest` with the configured timeouts and a
//! body cap enforced while streaming. `file` URLs are read from disk.

use reqwest::Url;

use crate::config::SessionConfig;

/// Errors produced while fetching background bytes.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The URL did not parse or cannot name a local file.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The URL scheme is neither http(s) nor file.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    /// The HTTP request failed before a complete response arrived.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("response error: status {0}")]
    Status(u16),

    /// The body exceeded the configured byte cap.
    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// Reading a local file failed.
    #[error("io error: {0}")]
    Io(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Fetches the raw bytes behind a background URL.
#[async_trait::async_trait]
pub trait ByteFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Production fetcher: `reqwest` for http(s), `tokio::fs` for file URLs.
pub struct HttpFetcher {
    http: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::HttpClientBuild`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: &SessionConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, max_bytes: config.max_image_bytes })
    }

    async fn fetch_http(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        if response.content_length().is_some_and(|len| exceeds(len, self.max_bytes)) {
            return Err(FetchError::TooLarge { limit: self.max_bytes });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge { limit: self.max_bytes });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn fetch_file(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::InvalidUrl(url.to_string()))?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;
        if exceeds(meta.len(), self.max_bytes) {
            return Err(FetchError::TooLarge { limit: self.max_bytes });
        }
        tokio::fs::read(&path)
            .await
            .map_err(|e| FetchError::Io(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ByteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => self.fetch_http(parsed).await,
            "file" => self.fetch_file(&parsed).await,
            other => Err(FetchError::UnsupportedScheme(other.to_owned())),
        }
    }
}

fn exceeds(len: u64, max_bytes: usize) -> bool {
    u64::try_from(max_bytes).map_or(false, |max| len > max)
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
