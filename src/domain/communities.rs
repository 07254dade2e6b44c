use std::fmt;

use super::WallpaperError;

/// Community served by `/`.
pub const DEFAULT_COMMUNITY: &str = "EarthPorn";

/// Path segments that browsers and crawlers request on their own.
const RESERVED: [&str; 2] = ["favicon.ico", "robots.txt"];

const MAX_LEN: usize = 21;

/// A validated community (subreddit) name.
///
/// Only ASCII alphanumerics and underscores are accepted, so the name can be
/// spliced into the upstream feed path without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommunityName(String);

impl CommunityName {
    pub fn parse(segment: &str) -> Result<Self, WallpaperError> {
        if RESERVED
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(segment))
        {
            return Err(WallpaperError::InvalidRoute(segment.to_string()));
        }

        let valid = !segment.is_empty()
            && segment.len() <= MAX_LEN
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');

        if valid {
            Ok(Self(segment.to_string()))
        } else {
            Err(WallpaperError::InvalidRoute(segment.to_string()))
        }
    }

    pub fn default_community() -> Self {
        Self(DEFAULT_COMMUNITY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommunityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
