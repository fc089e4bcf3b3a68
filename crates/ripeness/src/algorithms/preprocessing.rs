use image::{GrayImage, RgbImage, imageops::FilterType};
use tracing::debug;

use crate::{
    algorithms::color::{LabPlanes, from_lab_planes, to_lab_planes},
    config::{AnalysisConfig, CanonicalSize, GammaMode},
    error::{Result, RipenessError},
    traits::Preprocessor,
    types::Preprocessed,
};

/// Lookup table for `255 * (i/255)^(1/gamma)`.
pub fn gamma_lut(gamma: f32) -> [u8; 256] {
    let inv_gamma = 1.0 / gamma as f64;
    let mut table = [0u8; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let value = (i as f64 / 255.0).powf(inv_gamma) * 255.0;
        *entry = value.round().clamp(0.0, 255.0) as u8;
    }
    table
}

pub fn apply_lut(plane: &GrayImage, table: &[u8; 256]) -> GrayImage {
    let mut out = plane.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = table[pixel.0[0] as usize];
    }
    out
}

/// Gamma that moves the mean lightness towards `target`, clamped to `[min, max]`.
///
/// A completely black image has no usable mean and gets `max`.
pub fn adaptive_gamma(mean_lightness: f64, target: f32, min: f32, max: f32) -> f32 {
    if mean_lightness <= 0.0 {
        return max;
    }
    (target as f64 / mean_lightness).clamp(min as f64, max as f64) as f32
}

/// Resize `image` to the canonical frame, rejecting zero-area input.
pub fn resize_to_canonical(image: &RgbImage, size: CanonicalSize) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RipenessError::EmptyImage { width, height });
    }
    if (width, height) == (size.width, size.height) {
        return Ok(image.clone());
    }
    Ok(image::imageops::resize(
        image,
        size.width,
        size.height,
        FilterType::Triangle,
    ))
}

/// Resizes to the canonical frame and gamma-corrects LAB lightness.
#[derive(Debug, Clone)]
pub struct GammaPreprocessor {
    pub size: CanonicalSize,
    pub mode: GammaMode,
}

impl Default for GammaPreprocessor {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl GammaPreprocessor {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            size: config.canonical_size,
            mode: config.gamma,
        }
    }

    fn gamma_for(&self, mode: GammaMode, planes: &LabPlanes) -> f32 {
        match mode {
            GammaMode::Fixed { gamma } => gamma,
            GammaMode::Adaptive { target, min, max } => {
                adaptive_gamma(planes.mean_lightness(), target, min, max)
            }
        }
    }

}

impl Preprocessor for GammaPreprocessor {
    /// Adaptive gamma for `image` regardless of the configured mode.
    ///
    /// Uses the configured adaptive parameters when present, otherwise
    /// [`GammaMode::DEFAULT_ADAPTIVE`].
    fn suggest_gamma(&self, image: &RgbImage) -> Result<f32> {
        let canonical = resize_to_canonical(image, self.size)?;
        let planes = to_lab_planes(&canonical);
        let mode = match self.mode {
            adaptive @ GammaMode::Adaptive { .. } => adaptive,
            GammaMode::Fixed { .. } => GammaMode::DEFAULT_ADAPTIVE,
        };
        Ok(self.gamma_for(mode, &planes))
    }

    fn preprocess(&self, image: &RgbImage) -> Result<Preprocessed> {
        let canonical = resize_to_canonical(image, self.size)?;
        let planes = to_lab_planes(&canonical);
        let gamma = self.gamma_for(self.mode, &planes);
        let table = gamma_lut(gamma);

        let gamma_corrected = if table.iter().enumerate().all(|(i, &v)| i == v as usize) {
            canonical.clone()
        } else {
            let adjusted = LabPlanes {
                l: apply_lut(&planes.l, &table),
                ..planes
            };
            from_lab_planes(&adjusted)
        };

        debug!(
            "Preprocessed {}x{} -> {}x{}, gamma {:.3}",
            image.width(),
            image.height(),
            canonical.width(),
            canonical.height(),
            gamma
        );

        Ok(Preprocessed {
            canonical,
            gamma_corrected,
            gamma,
        })
    }
}
