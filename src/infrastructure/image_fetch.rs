use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::domain::WallpaperError;

/// Largest image body accepted from a post's link.
pub const MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;

/// Raw bytes downloaded from a post's link.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedImage {
    /// False when the host declared something other than an image.
    /// A missing content type is left for the decoder to judge.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_none_or(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
    }
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedImage, WallpaperError>;
}

#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: usize,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn too_large(&self, url: &Url) -> WallpaperError {
        WallpaperError::upstream(
            url.as_str(),
            format!("image exceeds {} bytes", self.max_bytes),
        )
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedImage, WallpaperError> {
        debug!(%url, "downloading image");

        let mut response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WallpaperError::upstream(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WallpaperError::upstream(
                url.as_str(),
                format!("image host returned status {status}"),
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(self.too_large(url));
        }

        // Content-Length may be missing, so the cap also applies while reading
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| WallpaperError::upstream(url.as_str(), e))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large(url));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(WallpaperError::upstream(
                url.as_str(),
                "image host returned an empty body",
            ));
        }

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}
