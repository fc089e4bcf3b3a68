//! # Strawberry Ripeness Analysis Library
//!
//! A trait-based pipeline that estimates how red a strawberry is from a single
//! photograph and turns the result into a ripeness class and a detection label.
//!
//! ## Stages
//!
//! - **Preprocessing**: resize to a canonical frame, gamma-correct LAB lightness
//! - **Segmentation**: threshold the LAB `a`/`b` channels, close the union
//! - **Extraction**: external contours, summed area, largest bounding box
//! - **Classification**: red pixels over contour area, fixed cut-offs
//! - **Annotation**: normalized `class cx cy w h` label line
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ripeness::Pipeline;
//!
//! let pipeline = Pipeline::default();
//! let analysis = pipeline.process_path("berry.jpg")?;
//!
//! println!("{} ({:.2}%)", analysis.ripeness.class, analysis.ripeness.ratio);
//! if let Some(label) = analysis.annotation {
//!     println!("{label}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Presets
//!
//! ```rust,no_run
//! use ripeness::{PipelineBuilder, Preset};
//!
//! let pipeline = PipelineBuilder::from_preset(Preset::BatchDefault)
//!     .with_edge_thresholds(40.0, 120.0)
//!     .build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod config;
pub mod algorithms;
pub mod annotation;
pub mod pipeline;
pub mod io;
pub mod render;
pub mod session;
pub mod batch;

// Re-exports for convenience
pub use error::{RipenessError, Result};
pub use types::{BoundingBox, Contour, RipenessClass, RipenessResult};
pub use traits::*;
pub use config::{AnalysisConfig, GammaMode, Preset};
pub use annotation::{AnnotationRecord, encode};
pub use pipeline::{Analysis, AnalysisSummary, Pipeline, builder::PipelineBuilder};
pub use session::{AnalysisSession, SessionCommand, SessionOutput};
pub use batch::{BatchOutput, BatchProcessor, BatchReport};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use imageproc::drawing::draw_filled_ellipse_mut;

    fn create_red_ellipse_image() -> RgbImage {
        // radius 120 covers ~50% of a 300x300 frame
        let mut img = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        draw_filled_ellipse_mut(&mut img, (150, 150), 120, 120, Rgb([255u8, 0, 0]));
        img
    }

    #[test]
    fn test_pipeline_red_ellipse_is_ripe() {
        let pipeline = Pipeline::default();
        let analysis = pipeline
            .process(&create_red_ellipse_image())
            .expect("Should process successfully");

        assert_eq!(analysis.dimensions(), (300, 300));
        assert_eq!(analysis.contours().len(), 1);
        let coverage = analysis.red_pixel_count as f64 / (300.0 * 300.0);
        assert!((0.48..0.52).contains(&coverage), "coverage {coverage}");

        // Pixel count over the boundary polygon through pixel centres
        assert!(analysis.ripeness.ratio >= 100.0);
        assert!(analysis.ripeness.ratio < 102.0);
        assert_eq!(analysis.ripeness.class, RipenessClass::Ripe);

        let bbox = analysis.bounding_box().expect("Should box the fruit");
        assert!((29..=31).contains(&bbox.x) && (239..=243).contains(&bbox.width), "{bbox:?}");

        let record = analysis.annotation.expect("Should produce a label");
        assert_eq!(record.class_index(), 1);
        assert!(record.to_line().starts_with("1 0.50"));
    }

    #[test]
    fn test_pipeline_blank_image() {
        let pipeline = Pipeline::default();
        let analysis = pipeline
            .process(&RgbImage::from_pixel(300, 300, Rgb([0, 0, 0])))
            .expect("Should process successfully");

        assert!(analysis.contours().is_empty());
        assert_eq!(analysis.ripeness.ratio, 0.0);
        assert_eq!(analysis.ripeness.class, RipenessClass::Unripe);
        assert!(analysis.annotation.is_none());
        assert!(analysis.bounding_box().is_none());
    }

    #[test]
    fn test_pipeline_exposes_every_stage() {
        let pipeline = PipelineBuilder::from_preset(Preset::BatchDefault).build();
        let analysis = pipeline
            .process(&create_red_ellipse_image())
            .expect("Should process successfully");

        assert_eq!(analysis.dimensions(), (250, 300));
        for mask in [analysis.red_mask(), analysis.combined_mask(), analysis.cleaned_mask(), &analysis.edges] {
            assert_eq!(mask.dimensions(), (250, 300));
        }
        assert_eq!(analysis.gamma(), 1.0);
        assert!(analysis.edges.pixels().any(|p| p.0[0] != 0), "Should find edges");
    }

    #[test]
    fn test_inverted_edge_thresholds_error_instead_of_panic() {
        let pipeline = Pipeline::builder().with_edge_thresholds(200.0, 100.0).build();
        let result = pipeline.process(&create_red_ellipse_image());
        assert!(matches!(result, Err(RipenessError::InvalidConfig(_))));
    }

    #[test]
    fn test_custom_classifier() {
        struct AlwaysRipe;
        impl RipenessClassifier for AlwaysRipe {
            fn classify(&self, _red: u64, _area: f64) -> RipenessResult {
                RipenessResult { ratio: 100.0, class: RipenessClass::Ripe }
            }
        }

        let pipeline = Pipeline::builder().set_classifier(AlwaysRipe).build();
        let analysis = pipeline
            .process(&RgbImage::from_pixel(50, 50, Rgb([0, 0, 0])))
            .expect("Should process successfully");
        assert_eq!(analysis.ripeness.class, RipenessClass::Ripe);
        // Still no region, so still no label
        assert!(analysis.annotation.is_none());
    }

    #[test]
    fn test_summary_serializes() {
        let analysis = Pipeline::default()
            .process(&create_red_ellipse_image())
            .expect("Should process successfully");
        let json = serde_json::to_string(&analysis.summary()).expect("Should serialize");
        assert!(json.contains("\"class\":\"ripe\""));
    }
}
