use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::domain::posts::SELECTION_WINDOW;
use crate::domain::{CommunityName, Post, WallpaperError};

pub const FEED_URL: &str = "https://www.reddit.com";

/// Source of ranked posts for a community.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// The community's top posts of the week, best first.
    async fn top_posts(&self, community: &CommunityName) -> Result<Vec<Post>, WallpaperError>;
}

#[derive(Clone)]
pub struct HttpFeedClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpFeedClient {
    pub fn new(client: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            timeout,
        }
    }

    /// `{base}/r/{community}/top.json?show=all&limit=25&sort=top&t=week`
    pub fn listing_url(&self, community: &CommunityName) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}/r/{community}/top.json"));
        url.query_pairs_mut()
            .clear()
            .append_pair("show", "all")
            .append_pair("limit", &SELECTION_WINDOW.to_string())
            .append_pair("sort", "top")
            .append_pair("t", "week");
        url
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn top_posts(&self, community: &CommunityName) -> Result<Vec<Post>, WallpaperError> {
        let url = self.listing_url(community);
        debug!(%url, "fetching feed");

        let response = self
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
                format!("feed returned status {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WallpaperError::upstream(url.as_str(), e))?;

        parse_listing(&body).map_err(|e| {
            WallpaperError::upstream(url.as_str(), format!("unparseable listing: {e}"))
        })
    }
}

/// Flatten a listing document into its posts, preserving rank order.
pub fn parse_listing(body: &str) -> Result<Vec<Post>, serde_json::Error> {
    let listing: Listing = serde_json::from_str(body)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .collect())
}

// --- Listing wire types ---

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}
