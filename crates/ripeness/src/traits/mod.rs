use image::{GrayImage, RgbImage};
use crate::{
    error::Result,
    types::{Preprocessed, Regions, RipenessResult, Segmentation},
};

/// Trait for bringing an input image into the canonical working frame
pub trait Preprocessor: Send + Sync {
    /// Resize to the canonical size and compute the gamma-corrected copy
    fn preprocess(&self, image: &RgbImage) -> Result<Preprocessed>;

    /// Gamma this preprocessor would suggest for `image`
    fn suggest_gamma(&self, image: &RgbImage) -> Result<f32> {
        Ok(self.preprocess(image)?.gamma)
    }
}

/// Trait for color-based fruit segmentation
pub trait ColorSegmenter: Send + Sync {
    /// Build the red, combined and cleaned masks for a canonical image
    fn segment(&self, image: &RgbImage) -> Result<Segmentation>;
}

/// Trait for region extraction from a binary mask
pub trait RegionExtractor: Send + Sync {
    /// Find external contours, their summed area and the largest one's box
    fn extract(&self, mask: &GrayImage) -> Result<Regions>;
}

/// Trait for mapping pixel statistics to a ripeness verdict
pub trait RipenessClassifier: Send + Sync {
    fn classify(&self, red_pixel_count: u64, total_contour_area: f64) -> RipenessResult;
}
