//! Overlays and stage dumps for display consumers.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::{
    error::Result,
    pipeline::Analysis,
    types::{BoundingBox, Contour},
};

pub const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const CONTOUR_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Copy of `image` with a 2 px hollow rectangle around `bbox`.
pub fn draw_bounding_box(image: &RgbImage, bbox: BoundingBox) -> RgbImage {
    let mut out = image.clone();
    for inset in 0..2u32 {
        if bbox.width <= 2 * inset || bbox.height <= 2 * inset {
            break;
        }
        let rect = Rect::at((bbox.x + inset) as i32, (bbox.y + inset) as i32)
            .of_size(bbox.width - 2 * inset, bbox.height - 2 * inset);
        draw_hollow_rect_mut(&mut out, rect, BOX_COLOR);
    }
    out
}

/// Copy of `image` with every contour point painted.
pub fn draw_contours(image: &RgbImage, contours: &[Contour]) -> RgbImage {
    let mut out = image.clone();
    let (width, height) = out.dimensions();
    for &[x, y] in contours.iter().flat_map(|contour| contour.points.iter()) {
        let (x, y) = (x as u32, y as u32);
        if x < width && y < height {
            out.put_pixel(x, y, CONTOUR_COLOR);
        }
    }
    out
}

/// Write every stage of `analysis` as PNGs named `<stem>_<stage>.png` into `dir`.
pub fn save_stages(analysis: &Analysis, dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let path = |stage: &str| dir.join(format!("{stem}_{stage}.png"));
    let mut written = Vec::new();

    let color_stages = [
        ("canonical", analysis.canonical().clone()),
        ("gamma", analysis.gamma_corrected().clone()),
        ("contours", draw_contours(analysis.canonical(), analysis.contours())),
    ];
    for (stage, image) in color_stages {
        let target = path(stage);
        image.save(&target)?;
        written.push(target);
    }

    let mask_stages = [
        ("red_mask", analysis.red_mask()),
        ("combined_mask", analysis.combined_mask()),
        ("cleaned_mask", analysis.cleaned_mask()),
        ("edges", &analysis.edges),
    ];
    for (stage, mask) in mask_stages {
        let target = path(stage);
        mask.save(&target)?;
        written.push(target);
    }

    if let Some(bbox) = analysis.bounding_box() {
        let target = path("bbox");
        draw_bounding_box(analysis.canonical(), bbox).save(&target)?;
        written.push(target);
    }

    Ok(written)
}
