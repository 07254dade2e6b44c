use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use url::Url;

use crate::application::retry::RetryPolicy;
use crate::application::services::WallpaperService;
use crate::infrastructure::USER_AGENT;
use crate::infrastructure::feed::HttpFeedClient;
use crate::infrastructure::image_fetch::HttpImageFetcher;

/// Everything that varies between production and test environments.
pub struct AppStateConfig {
    pub feed_url: Url,
    pub retry: RetryPolicy,
    pub upstream_timeout: Duration,
    pub max_concurrent_transforms: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub wallpaper_service: WallpaperService,
}

impl AppState {
    /// Build the HTTP-backed pipeline. Feed and image requests share one
    /// connection pool.
    pub fn from_config(config: AppStateConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        let feed = Arc::new(HttpFeedClient::new(
            http_client.clone(),
            config.feed_url,
            config.upstream_timeout,
        ));
        let images = Arc::new(HttpImageFetcher::new(http_client, config.upstream_timeout));

        let wallpaper_service = WallpaperService::builder(feed, images)
            .retry(config.retry)
            .max_concurrent_transforms(config.max_concurrent_transforms)
            .build();

        Ok(Self { wallpaper_service })
    }
}
