use thiserror::Error;

/// Everything that can go wrong while turning a community name into a wallpaper.
///
/// `InvalidRoute` is raised before any upstream work and is never retried.
/// Every other variant is a pipeline failure that the retry loop absorbs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WallpaperError {
    #[error("'{0}' is not a valid community name")]
    InvalidRoute(String),

    #[error("failed to fetch {url}: {reason}")]
    UpstreamFetch { url: String, reason: String },

    #[error("feed for r/{community} returned no posts")]
    EmptyFeed { community: String },

    #[error("post in r/{community} has no fetchable image url (got {url:?})")]
    MissingImageUrl {
        community: String,
        url: Option<String>,
    },

    #[error("failed to transform image from {url}: {reason}")]
    Transform { url: String, reason: String },
}

impl WallpaperError {
    pub fn upstream(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::UpstreamFetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn transform(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transform {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
