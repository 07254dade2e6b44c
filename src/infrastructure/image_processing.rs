use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

pub const FRAME_WIDTH: u32 = 1920;
pub const FRAME_HEIGHT: u32 = 1080;
const JPEG_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum ImageProcessingError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("image has no pixels")]
    Empty,
    #[error("failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),
}

/// Decode `bytes`, scale the image so it covers a `FRAME_WIDTH`×`FRAME_HEIGHT`
/// frame, keep the top-left corner, and encode the result as JPEG.
///
/// CPU bound; call from `spawn_blocking`.
pub fn render_wallpaper(bytes: &[u8]) -> Result<Vec<u8>, ImageProcessingError> {
    let img = image::load_from_memory(bytes).map_err(ImageProcessingError::Decode)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ImageProcessingError::Empty);
    }

    // Cropping before scaling gives the same frame as scale-then-crop without
    // materialising the oversized intermediate.
    let (crop_width, crop_height) =
        cover_region(img.width(), img.height(), FRAME_WIDTH, FRAME_HEIGHT);
    let framed = img
        .crop_imm(0, 0, crop_width, crop_height)
        .resize_exact(FRAME_WIDTH, FRAME_HEIGHT, FilterType::Lanczos3)
        .to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .write_image(
            framed.as_raw(),
            framed.width(),
            framed.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(ImageProcessingError::Encode)?;

    Ok(out)
}

/// Size of the origin-anchored region of a `width`×`height` source that,
/// once scaled, exactly fills a `frame_width`×`frame_height` frame.
///
/// The scale factor is the larger of the two axis ratios, so one axis of the
/// region always spans the whole source.
pub fn cover_region(width: u32, height: u32, frame_width: u32, frame_height: u32) -> (u32, u32) {
    let (w, h) = (u64::from(width), u64::from(height));
    let (fw, fh) = (u64::from(frame_width), u64::from(frame_height));

    let (region_w, region_h) = if w * fh >= h * fw {
        // Wider than the frame: full height, trim the right
        (div_round(fw * h, fh).clamp(1, w), h)
    } else {
        // Taller than the frame: full width, trim the bottom
        (w, div_round(fh * w, fw).clamp(1, h))
    };

    (region_w as u32, region_h as u32)
}

fn div_round(numerator: u64, denominator: u64) -> u64 {
    (numerator + denominator / 2) / denominator
}
