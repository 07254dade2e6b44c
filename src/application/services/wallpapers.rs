use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info};
use url::Url;

use crate::application::retry::{RetryPolicy, retry};
use crate::domain::posts::{SELECTION_WINDOW, pick_post};
use crate::domain::{CommunityName, Wallpaper, WallpaperError};
use crate::infrastructure::feed::FeedClient;
use crate::infrastructure::image_fetch::ImageFetcher;
use crate::infrastructure::image_processing::render_wallpaper;

/// Default cap on images being decoded and resized at once.
pub const DEFAULT_MAX_CONCURRENT_TRANSFORMS: usize = 4;

/// Turns a community name into a wallpaper: fetch the listing, pick a post,
/// download its image, and render it into the output frame.
///
/// The whole sequence is one retried unit, so a failed attempt re-fetches the
/// listing and re-rolls the post.
#[derive(Clone)]
pub struct WallpaperService {
    feed: Arc<dyn FeedClient>,
    images: Arc<dyn ImageFetcher>,
    retry: RetryPolicy,
    window: usize,
    transform_permits: Arc<Semaphore>,
}

pub struct WallpaperServiceBuilder {
    feed: Arc<dyn FeedClient>,
    images: Arc<dyn ImageFetcher>,
    retry: RetryPolicy,
    window: usize,
    max_concurrent_transforms: usize,
}

impl WallpaperServiceBuilder {
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn without_retry(self) -> Self {
        self.retry(RetryPolicy::disabled())
    }

    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn max_concurrent_transforms(mut self, permits: usize) -> Self {
        self.max_concurrent_transforms = permits;
        self
    }

    pub fn build(self) -> WallpaperService {
        WallpaperService {
            feed: self.feed,
            images: self.images,
            retry: self.retry,
            window: self.window.max(1),
            transform_permits: Arc::new(Semaphore::new(self.max_concurrent_transforms.max(1))),
        }
    }
}

impl WallpaperService {
    pub fn builder(
        feed: Arc<dyn FeedClient>,
        images: Arc<dyn ImageFetcher>,
    ) -> WallpaperServiceBuilder {
        WallpaperServiceBuilder {
            feed,
            images,
            retry: RetryPolicy::default(),
            window: SELECTION_WINDOW,
            max_concurrent_transforms: DEFAULT_MAX_CONCURRENT_TRANSFORMS,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub async fn render(&self, community: &CommunityName) -> Result<Wallpaper, WallpaperError> {
        retry(self.retry, move || self.render_once(community)).await
    }

    async fn render_once(&self, community: &CommunityName) -> Result<Wallpaper, WallpaperError> {
        let posts = self.feed.top_posts(community).await?;

        let post = pick_post(&posts, self.window).ok_or_else(|| WallpaperError::EmptyFeed {
            community: community.to_string(),
        })?;
        let url = post.image_url(community)?;
        info!(
            %community,
            %url,
            title = post.title.as_deref().unwrap_or_default(),
            candidates = posts.len().min(self.window),
            "selected post"
        );

        let image = self.images.fetch(&url).await?;
        if !image.is_image() {
            return Err(WallpaperError::MissingImageUrl {
                community: community.to_string(),
                url: Some(url.to_string()),
            });
        }

        let jpeg = self.transform(&url, image.bytes).await?;
        debug!(%url, bytes = jpeg.len(), "image transformed");

        Ok(Wallpaper {
            jpeg,
            source_url: url,
        })
    }

    async fn transform(&self, url: &Url, bytes: Vec<u8>) -> Result<Vec<u8>, WallpaperError> {
        let _permit = self
            .transform_permits
            .acquire()
            .await
            .map_err(|e| WallpaperError::transform(url.as_str(), e))?;

        match tokio::task::spawn_blocking(move || render_wallpaper(&bytes)).await {
            Ok(Ok(jpeg)) => Ok(jpeg),
            Ok(Err(err)) => Err(WallpaperError::transform(url.as_str(), err)),
            Err(err) => Err(WallpaperError::transform(
                url.as_str(),
                format!("image processing task panicked: {err}"),
            )),
        }
    }
}
