use crate::{
    config::{AnalysisConfig, Thresholds},
    traits::RipenessClassifier,
    types::{RipenessClass, RipenessResult},
};

/// Red share of the fruit area, in percent; zero when there is no area.
pub fn redness_ratio(red_pixel_count: u64, total_contour_area: f64) -> f64 {
    if total_contour_area > 0.0 {
        red_pixel_count as f64 / total_contour_area * 100.0
    } else {
        0.0
    }
}

/// Maps the redness ratio onto three classes with fixed cut-offs.
///
/// `ratio >= ripe_min` is ripe, `unripe_max < ratio < ripe_min` is half-ripe,
/// everything else (including exactly `unripe_max`) is unripe.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdClassifier {
    pub thresholds: Thresholds,
}

impl Default for ThresholdClassifier {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ThresholdClassifier {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            thresholds: config.thresholds,
        }
    }

    pub fn class_for(&self, ratio: f64) -> RipenessClass {
        let Thresholds { ripe_min, unripe_max } = self.thresholds;
        if ratio >= ripe_min {
            RipenessClass::Ripe
        } else if ratio > unripe_max && ratio < ripe_min {
            RipenessClass::HalfRipe
        } else {
            RipenessClass::Unripe
        }
    }
}

impl RipenessClassifier for ThresholdClassifier {
    fn classify(&self, red_pixel_count: u64, total_contour_area: f64) -> RipenessResult {
        let ratio = redness_ratio(red_pixel_count, total_contour_area);
        RipenessResult {
            ratio,
            class: self.class_for(ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interactive() -> ThresholdClassifier {
        ThresholdClassifier::from_config(&AnalysisConfig::interactive())
    }

    fn batch() -> ThresholdClassifier {
        ThresholdClassifier::from_config(&AnalysisConfig::batch())
    }

    #[test]
    fn test_zero_area_is_unripe() {
        for classifier in [interactive(), batch()] {
            let result = classifier.classify(500, 0.0);
            assert_eq!(result.ratio, 0.0);
            assert_eq!(result.class, RipenessClass::Unripe);
        }
    }

    #[test]
    fn test_ratio_formula() {
        let result = interactive().classify(40, 100.0);
        assert_eq!(result.ratio, 40.0);
        assert_eq!(result.class, RipenessClass::HalfRipe);

        let result = interactive().classify(3, 8.0);
        assert_eq!(result.ratio, 37.5);
    }

    #[test]
    fn test_interactive_regions_and_boundaries() {
        let c = interactive();
        assert_eq!(c.classify(95, 100.0).class, RipenessClass::Ripe);
        assert_eq!(c.classify(80, 100.0).class, RipenessClass::Ripe);
        assert_eq!(c.classify(79, 100.0).class, RipenessClass::HalfRipe);
        assert_eq!(c.classify(21, 100.0).class, RipenessClass::HalfRipe);
        assert_eq!(c.classify(20, 100.0).class, RipenessClass::Unripe);
        assert_eq!(c.classify(5, 100.0).class, RipenessClass::Unripe);
    }

    #[test]
    fn test_batch_regions_and_boundaries() {
        let c = batch();
        assert_eq!(c.classify(85, 100.0).class, RipenessClass::Ripe);
        assert_eq!(c.classify(84, 100.0).class, RipenessClass::HalfRipe);
        assert_eq!(c.classify(80, 100.0).class, RipenessClass::HalfRipe);
        assert_eq!(c.classify(20, 100.0).class, RipenessClass::Unripe);
    }

    #[test]
    fn test_ratio_is_not_clamped() {
        let result = interactive().classify(150, 100.0);
        assert_eq!(result.ratio, 150.0);
        assert_eq!(result.class, RipenessClass::Ripe);
    }
}
