pub mod builder;

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    annotation::{AnnotationRecord, encode},
    config::{AnalysisConfig, EdgeThresholds},
    error::Result,
    io::load_image,
    traits::{ColorSegmenter, Preprocessor, RegionExtractor, RipenessClassifier},
    types::{BoundingBox, Contour, Preprocessed, Regions, RipenessResult, Segmentation},
};

/// Every intermediate and final product of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub preprocessed: Preprocessed,
    pub segmentation: Segmentation,
    /// Canny edges of the gamma-corrected grayscale
    pub edges: GrayImage,
    pub regions: Regions,
    pub red_pixel_count: u64,
    pub ripeness: RipenessResult,
    /// `None` when no region was found
    pub annotation: Option<AnnotationRecord>,
}

impl Analysis {
    pub fn canonical(&self) -> &RgbImage {
        &self.preprocessed.canonical
    }

    pub fn gamma_corrected(&self) -> &RgbImage {
        &self.preprocessed.gamma_corrected
    }

    pub fn gamma(&self) -> f32 {
        self.preprocessed.gamma
    }

    pub fn red_mask(&self) -> &GrayImage {
        &self.segmentation.red_mask
    }

    pub fn combined_mask(&self) -> &GrayImage {
        &self.segmentation.combined_mask
    }

    pub fn cleaned_mask(&self) -> &GrayImage {
        &self.segmentation.cleaned_mask
    }

    pub fn contours(&self) -> &[Contour] {
        &self.regions.contours
    }

    pub fn total_area(&self) -> f64 {
        self.regions.total_area
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.regions.largest_bbox
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.preprocessed.canonical.dimensions()
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            width: self.dimensions().0,
            height: self.dimensions().1,
            gamma: self.gamma(),
            red_pixel_count: self.red_pixel_count,
            total_area: self.total_area(),
            contour_count: self.regions.contours.len(),
            bounding_box: self.bounding_box(),
            ripeness: self.ripeness,
            label: self.annotation.map(|record| record.to_line()),
        }
    }
}

/// Serializable scalar part of an [`Analysis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub width: u32,
    pub height: u32,
    pub gamma: f32,
    pub red_pixel_count: u64,
    pub total_area: f64,
    pub contour_count: usize,
    pub bounding_box: Option<BoundingBox>,
    pub ripeness: RipenessResult,
    pub label: Option<String>,
}

/// The four analysis stages wired together
pub struct Pipeline {
    preprocessor: Box<dyn Preprocessor>,
    segmenter: Box<dyn ColorSegmenter>,
    extractor: Box<dyn RegionExtractor>,
    classifier: Box<dyn RipenessClassifier>,
    edges: EdgeThresholds,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Pipeline with the standard stages configured from `config`
    pub fn from_config(config: &AnalysisConfig) -> Self {
        builder::PipelineBuilder::from_config(config).build()
    }

    pub fn new(
        preprocessor: Box<dyn Preprocessor>,
        segmenter: Box<dyn ColorSegmenter>,
        extractor: Box<dyn RegionExtractor>,
        classifier: Box<dyn RipenessClassifier>,
        edges: EdgeThresholds,
    ) -> Self {
        Self {
            preprocessor,
            segmenter,
            extractor,
            classifier,
            edges,
        }
    }

    /// Run an image through the entire pipeline
    pub fn process(&self, image: &RgbImage) -> Result<Analysis> {
        self.edges.validate()?;

        // Step 1: canonical frame and gamma
        let preprocessed = self.preprocessor.preprocess(image)?;

        // Step 2: colour masks
        let segmentation = self.segmenter.segment(&preprocessed.canonical)?;

        let gray = DynamicImage::ImageRgb8(preprocessed.gamma_corrected.clone()).to_luma8();
        let edges = imageproc::edges::canny(&gray, self.edges.low, self.edges.high);

        // Step 3: regions of the cleaned mask
        let regions = self.extractor.extract(&segmentation.cleaned_mask)?;

        // Step 4: sum of areas for the ratio, largest box for the label
        let red_pixel_count = segmentation.red_pixel_count();
        let ripeness = self.classifier.classify(red_pixel_count, regions.total_area);
        let annotation = encode(
            preprocessed.canonical.dimensions(),
            regions.largest_bbox,
            ripeness.class,
        );

        debug!(
            "Ripeness {:.2}% -> {} ({} red px / {:.1} area)",
            ripeness.ratio, ripeness.class, red_pixel_count, regions.total_area
        );

        Ok(Analysis {
            preprocessed,
            segmentation,
            edges,
            regions,
            red_pixel_count,
            ripeness,
            annotation,
        })
    }

    /// Decode the file at `path` and analyze it
    pub fn process_path<P: AsRef<Path>>(&self, path: P) -> Result<Analysis> {
        let image = load_image(path)?;
        self.process(&image)
    }

    pub fn suggest_gamma(&self, image: &RgbImage) -> Result<f32> {
        self.preprocessor.suggest_gamma(image)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
