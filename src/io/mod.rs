//! Source abstraction for reading bytes from local files or HTTP URLs.

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use std::io::Read;
use std::path::PathBuf;
use url::Url;

use crate::config::DOWNLOAD_TIMEOUT;

/// A parsed data source: local path or remote URL.
#[derive(Debug, Clone)]
pub enum Source {
    Local(PathBuf),
    Http(Url),
}

impl Source {
    /// Parse a source string into a Source.
    pub fn parse(uri: &str) -> Result<Self> {
        // Try parsing as URL first
        if let Ok(url) = Url::parse(uri) {
            match url.scheme() {
                "http" | "https" => Ok(Source::Http(url)),
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|_| anyhow!("Invalid file:// URI: {}", uri))?;
                    Ok(Source::Local(path))
                }
                scheme => Err(anyhow!("Unsupported URI scheme: {}", scheme)),
            }
        } else {
            // Treat as local file path
            Ok(Source::Local(PathBuf::from(uri)))
        }
    }

    /// The name used for extension-based format detection.
    pub fn file_name(&self) -> String {
        match self {
            Source::Local(path) => path.to_string_lossy().into_owned(),
            Source::Http(url) => url.path().to_string(),
        }
    }

    /// Fetch the entire source into memory.
    pub async fn bytes(&self) -> Result<Bytes> {
        match self {
            Source::Local(path) => {
                let data = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Bytes::from(data))
            }
            Source::Http(url) => {
                let client = reqwest::Client::builder()
                    .timeout(DOWNLOAD_TIMEOUT)
                    .build()
                    .context("Failed to build HTTP client")?;
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch {}", url))?
                    .error_for_status()
                    .with_context(|| format!("Server rejected request for {}", url))?;
                response
                    .bytes()
                    .await
                    .context("Failed to download response body")
            }
        }
    }

    /// Open a synchronous reader over the source. Local files are streamed
    /// from disk; remote files are downloaded up front and served from memory.
    pub async fn reader(&self) -> Result<Box<dyn Read + Send>> {
        match self {
            Source::Local(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                Ok(Box::new(file) as Box<dyn Read + Send>)
            }
            Source::Http(_) => {
                let data = self.bytes().await?;
                Ok(Box::new(std::io::Cursor::new(data)) as Box<dyn Read + Send>)
            }
        }
    }
}
