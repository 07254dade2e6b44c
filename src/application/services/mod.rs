pub mod wallpapers;

pub use wallpapers::{WallpaperService, WallpaperServiceBuilder};
