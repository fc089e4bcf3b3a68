//! YOLO-style detection labels.
//!
//! One line per object: `class cx cy w h`, with the four box fields
//! normalized by the image dimensions and printed with six decimals.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::RipenessError,
    types::{BoundingBox, RipenessClass},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotationRecord {
    pub class: RipenessClass,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl AnnotationRecord {
    /// Normalize `bbox` against an image of `dimensions` (width, height).
    pub fn from_bbox(dimensions: (u32, u32), bbox: BoundingBox, class: RipenessClass) -> Self {
        let (image_width, image_height) = (dimensions.0 as f64, dimensions.1 as f64);
        let (x, y) = (bbox.x as f64, bbox.y as f64);
        let (w, h) = (bbox.width as f64, bbox.height as f64);

        Self {
            class,
            center_x: (x + w / 2.0) / image_width,
            center_y: (y + h / 2.0) / image_height,
            width: w / image_width,
            height: h / image_height,
        }
    }

    pub fn class_index(&self) -> u8 {
        self.class.class_index()
    }

    /// Box in pixel units for an image of `dimensions`.
    pub fn to_bbox(&self, dimensions: (u32, u32)) -> BoundingBox {
        let (image_width, image_height) = (dimensions.0 as f64, dimensions.1 as f64);
        let w = self.width * image_width;
        let h = self.height * image_height;
        BoundingBox {
            x: (self.center_x * image_width - w / 2.0).round().max(0.0) as u32,
            y: (self.center_y * image_height - h / 2.0).round().max(0.0) as u32,
            width: w.round() as u32,
            height: h.round() as u32,
        }
    }

    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

/// Label line for the largest region, or `None` when no region was found.
pub fn encode(
    dimensions: (u32, u32),
    bbox: Option<BoundingBox>,
    class: RipenessClass,
) -> Option<AnnotationRecord> {
    bbox.map(|bbox| AnnotationRecord::from_bbox(dimensions, bbox, class))
}

impl fmt::Display for AnnotationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_index(),
            self.center_x,
            self.center_y,
            self.width,
            self.height
        )
    }
}

impl FromStr for AnnotationRecord {
    type Err = RipenessError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || RipenessError::MalformedAnnotation(line.to_string());
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [class, cx, cy, w, h] = tokens.as_slice() else {
            return Err(malformed());
        };

        let class = class
            .parse::<u8>()
            .ok()
            .and_then(RipenessClass::from_class_index)
            .ok_or_else(malformed)?;
        let field = |token: &str| token.parse::<f64>().map_err(|_| malformed());

        Ok(Self {
            class,
            center_x: field(*cx)?,
            center_y: field(*cy)?,
            width: field(*w)?,
            height: field(*h)?,
        })
    }
}
