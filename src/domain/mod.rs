pub mod communities;
pub mod errors;
pub mod posts;

// Re-exports
pub use communities::CommunityName;
pub use errors::WallpaperError;
pub use posts::{Post, Wallpaper};
