use geo_types::{Coord, LineString, Polygon};
use image::{GrayImage, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Boundary of one connected mask region, in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<[f32; 2]>,
}

impl Contour {
    pub fn new(points: Vec<[f32; 2]>) -> Self {
        Self { points }
    }

    /// Convert to geo-types Polygon for geometric operations
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .points
            .iter()
            .map(|&[x, y]| Coord {
                x: x as f64,
                y: y as f64,
            })
            .collect();

        Polygon::new(LineString::new(coords), vec![])
    }

    /// Enclosed area of the boundary polygon (shoelace formula).
    ///
    /// This is the polygon through the boundary pixel centres, so it is
    /// smaller than the region's pixel count.
    pub fn area(&self) -> f64 {
        use geo::Area;
        if self.points.len() < 3 {
            return 0.0;
        }
        self.to_geo_polygon().unsigned_area()
    }

    /// Minimal axis-aligned pixel rectangle enclosing every point.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut points = self.points.iter();
        let &[x0, y0] = points.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);

        for &[x, y] in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        Some(BoundingBox {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x) as u32 + 1,
            height: (max_y - min_y) as u32 + 1,
        })
    }
}

/// Axis-aligned box in pixel units. Extents are inclusive of the edge pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Discrete ripeness verdict.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RipenessClass {
    Unripe,
    Ripe,
    HalfRipe,
}

impl RipenessClass {
    /// Class index used in detection-label lines.
    pub fn class_index(self) -> u8 {
        match self {
            Self::Unripe => 0,
            Self::Ripe => 1,
            Self::HalfRipe => 2,
        }
    }

    pub fn from_class_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Unripe),
            1 => Some(Self::Ripe),
            2 => Some(Self::HalfRipe),
            _ => None,
        }
    }
}

/// Redness percentage and the class it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RipenessResult {
    /// Red pixel count over total contour area, in percent. Not clamped above 100.
    pub ratio: f64,
    pub class: RipenessClass,
}

/// Output of the preprocessing stage.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Input resized to the canonical frame
    pub canonical: RgbImage,
    /// Canonical image with gamma applied to LAB lightness
    pub gamma_corrected: RgbImage,
    pub gamma: f32,
}

/// Output of the color segmentation stage.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Pixels whose `a` channel falls in the red range
    pub red_mask: GrayImage,
    /// Red OR yellow, before closing
    pub combined_mask: GrayImage,
    /// Combined mask after morphological closing
    pub cleaned_mask: GrayImage,
}

impl Segmentation {
    pub fn red_pixel_count(&self) -> u64 {
        count_nonzero(&self.red_mask)
    }
}

/// Output of the region extraction stage.
#[derive(Debug, Clone, Default)]
pub struct Regions {
    /// External contours in raster scan order
    pub contours: Vec<Contour>,
    /// Sum of every contour's area
    pub total_area: f64,
    /// Bounding box of the largest contour; `None` when no region was found
    pub largest_bbox: Option<BoundingBox>,
}

impl Regions {
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

pub(crate) fn count_nonzero(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|p| p.0[0] != 0).count() as u64
}
