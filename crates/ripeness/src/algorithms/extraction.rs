use image::GrayImage;
use imageproc::contours::BorderType;
use tracing::debug;

use crate::{
    error::Result,
    traits::RegionExtractor,
    types::{Contour, Regions},
};

/// Imageproc-based extractor keeping only outermost borders.
#[derive(Debug, Clone, Default)]
pub struct ExternalContourExtractor;

impl ExternalContourExtractor {
    pub fn external_contours(&self, mask: &GrayImage) -> Vec<Contour> {
        imageproc::contours::find_contours::<i32>(mask)
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
            .map(|contour| {
                Contour::new(
                    contour
                        .points
                        .iter()
                        .map(|p| [p.x as f32, p.y as f32])
                        .collect(),
                )
            })
            .collect()
    }
}

/// Index of the largest-area contour; ties keep the earliest one.
pub fn largest_contour(contours: &[Contour]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, contour) in contours.iter().enumerate() {
        let area = contour.area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((i, area)),
        }
    }
    best.map(|(i, _)| i)
}

impl RegionExtractor for ExternalContourExtractor {
    fn extract(&self, mask: &GrayImage) -> Result<Regions> {
        let contours = self.external_contours(mask);
        let total_area = contours.iter().map(Contour::area).sum();
        let largest_bbox = largest_contour(&contours).and_then(|i| contours[i].bounding_box());

        debug!(
            "Extracted {} external contours, total area {:.1}",
            contours.len(),
            total_area
        );

        Ok(Regions {
            contours,
            total_area,
            largest_bbox,
        })
    }
}
