use crate::{
    algorithms::{
        ExternalContourExtractor, GammaPreprocessor, LabThresholdSegmenter, ThresholdClassifier,
    },
    config::{AnalysisConfig, EdgeThresholds, Preset},
    pipeline::Pipeline,
    traits::{ColorSegmenter, Preprocessor, RegionExtractor, RipenessClassifier},
};

/// Builder for creating analysis pipelines with a fluent API
pub struct PipelineBuilder {
    config: AnalysisConfig,
    preprocessor: Option<Box<dyn Preprocessor>>,
    segmenter: Option<Box<dyn ColorSegmenter>>,
    extractor: Option<Box<dyn RegionExtractor>>,
    classifier: Option<Box<dyn RipenessClassifier>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder using the interactive preset
    pub fn new() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }

    /// Builder whose default stages follow `config`
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
            preprocessor: None,
            segmenter: None,
            extractor: None,
            classifier: None,
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self::from_config(&preset.config())
    }

    /// Set the preprocessor (replaces the configured one)
    pub fn set_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: Preprocessor + 'static,
    {
        self.preprocessor = Some(Box::new(preprocessor));
        self
    }

    /// Set the colour segmenter (replaces the configured one)
    pub fn set_segmenter<S>(mut self, segmenter: S) -> Self
    where
        S: ColorSegmenter + 'static,
    {
        self.segmenter = Some(Box::new(segmenter));
        self
    }

    /// Set the region extractor (replaces the default one)
    pub fn set_extractor<E>(mut self, extractor: E) -> Self
    where
        E: RegionExtractor + 'static,
    {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Set the classifier (replaces the configured one)
    pub fn set_classifier<C>(mut self, classifier: C) -> Self
    where
        C: RipenessClassifier + 'static,
    {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Canny thresholds for the edge map. Values with `low > high` or
    /// `low < 0` make [`Pipeline::process`] return `InvalidConfig`.
    pub fn with_edge_thresholds(mut self, low: f32, high: f32) -> Self {
        self.config.edges = EdgeThresholds { low, high };
        self
    }

    /// Build the pipeline, filling unset stages from the configuration
    pub fn build(self) -> Pipeline {
        let config = self.config;

        let preprocessor = self
            .preprocessor
            .unwrap_or_else(|| Box::new(GammaPreprocessor::from_config(&config)));
        let segmenter = self
            .segmenter
            .unwrap_or_else(|| Box::new(LabThresholdSegmenter::from_config(&config)));
        let extractor = self
            .extractor
            .unwrap_or_else(|| Box::new(ExternalContourExtractor));
        let classifier = self
            .classifier
            .unwrap_or_else(|| Box::new(ThresholdClassifier::from_config(&config)));

        Pipeline::new(preprocessor, segmenter, extractor, classifier, config.edges)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
