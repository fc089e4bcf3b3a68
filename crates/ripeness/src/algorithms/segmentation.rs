use image::{GrayImage, Luma, RgbImage};
use tracing::debug;

use crate::{
    algorithms::{
        color::to_lab_planes,
        morphology::{StructuringElement, close},
    },
    config::{AnalysisConfig, ChannelRange},
    error::Result,
    traits::ColorSegmenter,
    types::{Segmentation, count_nonzero},
};

/// Binary mask of the pixels whose value lies in `range`.
pub fn in_range(plane: &GrayImage, range: ChannelRange) -> GrayImage {
    let mut mask = GrayImage::new(plane.width(), plane.height());
    for (x, y, pixel) in plane.enumerate_pixels() {
        if range.contains(pixel.0[0]) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let on = a.get_pixel(x, y).0[0] != 0 || b.get_pixel(x, y).0[0] != 0;
        Luma([if on { 255 } else { 0 }])
    })
}

/// Thresholds the `a` (red) and `b` (yellow) LAB channels and closes the union.
#[derive(Debug, Clone)]
pub struct LabThresholdSegmenter {
    pub red_range: ChannelRange,
    pub yellow_range: ChannelRange,
    pub element: StructuringElement,
}

impl Default for LabThresholdSegmenter {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl LabThresholdSegmenter {
    pub fn new(red_range: ChannelRange, yellow_range: ChannelRange, kernel_size: u32) -> Self {
        Self {
            red_range,
            yellow_range,
            element: StructuringElement::ellipse(kernel_size, kernel_size),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.red_range, config.yellow_range, config.kernel_size)
    }
}

impl ColorSegmenter for LabThresholdSegmenter {
    fn segment(&self, image: &RgbImage) -> Result<Segmentation> {
        let planes = to_lab_planes(image);
        let red_mask = in_range(&planes.a, self.red_range);
        let yellow_mask = in_range(&planes.b, self.yellow_range);
        let combined_mask = union(&red_mask, &yellow_mask);
        let cleaned_mask = close(&combined_mask, &self.element);

        debug!(
            "Segmented: {} red, {} combined, {} cleaned pixels",
            count_nonzero(&red_mask),
            count_nonzero(&combined_mask),
            count_nonzero(&cleaned_mask)
        );

        Ok(Segmentation {
            red_mask,
            combined_mask,
            cleaned_mask,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_red_pixels_land_in_both_masks() {
        let mut image = RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]));
        for y in 10..30 {
            for x in 10..30 {
                image.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }

        let segmentation = LabThresholdSegmenter::default()
            .segment(&image)
            .expect("Should segment");

        assert_eq!(segmentation.red_pixel_count(), 400);
        assert_eq!(segmentation.red_mask.get_pixel(15, 15).0[0], 255);
        assert_eq!(segmentation.red_mask.get_pixel(5, 5).0[0], 0);
        assert_eq!(segmentation.cleaned_mask.get_pixel(15, 15).0[0], 255);
        assert_eq!(segmentation.cleaned_mask.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn test_neutral_image_yields_empty_masks() {
        let image = RgbImage::from_pixel(20, 20, Rgb([128, 128, 128]));
        let segmentation = LabThresholdSegmenter::default()
            .segment(&image)
            .expect("Should segment");
        assert_eq!(segmentation.red_pixel_count(), 0);
        assert_eq!(count_nonzero(&segmentation.cleaned_mask), 0);
    }

    #[test]
    fn test_union_is_logical_or() {
        let mut a = GrayImage::new(3, 1);
        let mut b = GrayImage::new(3, 1);
        a.put_pixel(0, 0, Luma([255]));
        b.put_pixel(2, 0, Luma([1]));
        let merged = union(&a, &b);
        assert_eq!(merged.as_raw(), &vec![255, 0, 255]);
    }

    #[test]
    fn test_in_range_is_closed() {
        let plane = GrayImage::from_raw(4, 1, vec![139, 140, 210, 211]).unwrap();
        let mask = in_range(&plane, ChannelRange::new(140, 210));
        assert_eq!(mask.as_raw(), &vec![0, 255, 255, 0]);
    }
}
