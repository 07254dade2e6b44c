use rand::seq::IndexedRandom;
use serde::Deserialize;
use url::Url;

use super::{CommunityName, WallpaperError};

/// Number of top posts a wallpaper is drawn from.
pub const SELECTION_WINDOW: usize = 25;

/// A single entry from a community's top listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Post {
    /// The post's direct link, if it is an absolute http(s) URL.
    pub fn image_url(&self, community: &CommunityName) -> Result<Url, WallpaperError> {
        let missing = || WallpaperError::MissingImageUrl {
            community: community.to_string(),
            url: self.url.clone(),
        };

        let raw = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(missing)?;

        let url = Url::parse(raw).map_err(|_| missing())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(missing()),
        }
    }
}

/// A rendered wallpaper and the image it was cut from.
#[derive(Debug, Clone)]
pub struct Wallpaper {
    pub jpeg: Vec<u8>,
    pub source_url: Url,
}

/// Pick one post uniformly at random from the first `window` entries.
///
/// Returns `None` only when there is nothing to pick from.
pub fn pick_post(posts: &[Post], window: usize) -> Option<&Post> {
    let candidates = &posts[..posts.len().min(window)];
    candidates.choose(&mut rand::rng())
}
