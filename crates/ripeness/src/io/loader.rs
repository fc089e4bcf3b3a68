use std::path::Path;

use image::RgbImage;

use crate::error::Result;

/// Raster extensions accepted as analysis input (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn is_supported_image<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Decode an image file into 8-bit RGB
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let image = image::open(path)?;
    Ok(image.to_rgb8())
}

/// Decode an in-memory image into 8-bit RGB
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}
