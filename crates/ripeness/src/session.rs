use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use tracing::info;

use crate::{
    annotation::AnnotationRecord,
    config::AnalysisConfig,
    error::{Result, RipenessError},
    io::{load_image, load_image_from_bytes},
    pipeline::{Analysis, AnalysisSummary, Pipeline},
};

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(tag = "type")]
#[strum(serialize_all = "snake_case")]
pub enum SessionCommand {
    /// Run the full analysis on the loaded image
    #[serde(rename = "analyze")]
    Analyze,

    /// Suggest a gamma value for the loaded image
    #[serde(rename = "suggest_gamma")]
    SuggestGamma,

    /// Label line of the last analysis (runs one if needed)
    #[serde(rename = "annotation")]
    Annotation,
}

impl SessionCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SessionCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Get a description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Self::Analyze => "Classify the loaded image and keep every intermediate stage",
            Self::SuggestGamma => "Gamma that brings the mean lightness towards the target",
            Self::Annotation => "Detection-label line for the largest fruit region",
        }
    }
}

/// What a [`SessionCommand`] produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SessionOutput {
    Analysis(AnalysisSummary),
    Gamma(f32),
    Annotation(Option<AnnotationRecord>),
}

/// Explicit state of an interactive session: the loaded image and the last result.
#[derive(Clone)]
pub struct AnalysisSession {
    image_path: Option<PathBuf>,
    image: Option<RgbImage>,
    pipeline: Arc<Pipeline>,
    last: Option<Arc<Analysis>>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::with_pipeline(Pipeline::default())
    }

    pub fn with_config(config: &AnalysisConfig) -> Self {
        Self::with_pipeline(Pipeline::from_config(config))
    }

    /// Create a new session with a custom pipeline
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            image_path: None,
            image: None,
            pipeline: Arc::new(pipeline),
            last: None,
        }
    }

    /// Load an image from file, clearing any previous result
    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let image = load_image(path)?;
        info!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
        self.image_path = Some(path.to_path_buf());
        self.set_loaded(image);
        Ok(())
    }

    /// Load an image from memory
    pub fn load_image_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let image = load_image_from_bytes(bytes)?;
        self.image_path = None;
        self.set_loaded(image);
        Ok(())
    }

    /// Set the image directly
    pub fn set_image(&mut self, image: RgbImage) {
        self.image_path = None;
        self.set_loaded(image);
    }

    fn set_loaded(&mut self, image: RgbImage) {
        self.image = Some(image);
        self.last = None;
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    pub fn last_analysis(&self) -> Option<&Analysis> {
        self.last.as_deref()
    }

    /// Analyze the loaded image, reusing the cached result when there is one
    pub fn analyze(&mut self) -> Result<Arc<Analysis>> {
        if let Some(last) = &self.last {
            return Ok(Arc::clone(last));
        }
        let image = self.image.as_ref().ok_or(RipenessError::NoImageLoaded)?;
        let analysis = Arc::new(self.pipeline.process(image)?);
        self.last = Some(Arc::clone(&analysis));
        Ok(analysis)
    }

    pub fn execute(&mut self, command: SessionCommand) -> Result<SessionOutput> {
        match command {
            SessionCommand::Analyze => Ok(SessionOutput::Analysis(self.analyze()?.summary())),
            SessionCommand::SuggestGamma => {
                let image = self.image.as_ref().ok_or(RipenessError::NoImageLoaded)?;
                Ok(SessionOutput::Gamma(self.pipeline.suggest_gamma(image)?))
            }
            SessionCommand::Annotation => Ok(SessionOutput::Annotation(self.analyze()?.annotation)),
        }
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RipenessClass;
    use image::Rgb;

    #[test]
    fn test_commands_need_an_image() {
        let mut session = AnalysisSession::new();
        for command in [SessionCommand::Analyze, SessionCommand::SuggestGamma, SessionCommand::Annotation] {
            assert!(matches!(
                session.execute(command),
                Err(RipenessError::NoImageLoaded)
            ));
        }
    }

    #[test]
    fn test_blank_image_has_no_annotation() {
        let mut session = AnalysisSession::new();
        session.set_image(RgbImage::from_pixel(300, 300, Rgb([0, 0, 0])));

        let output = session.execute(SessionCommand::Analyze).expect("Should analyze");
        let SessionOutput::Analysis(summary) = output else {
            panic!("Expected an analysis summary");
        };
        assert_eq!(summary.ripeness.ratio, 0.0);
        assert_eq!(summary.ripeness.class, RipenessClass::Unripe);
        assert!(summary.label.is_none());

        assert_eq!(
            session.execute(SessionCommand::Annotation).expect("Should run"),
            SessionOutput::Annotation(None)
        );
    }

    #[test]
    fn test_new_image_clears_last_result() {
        let mut session = AnalysisSession::new();
        session.set_image(RgbImage::from_pixel(30, 30, Rgb([0, 0, 0])));
        session.analyze().expect("Should analyze");
        assert!(session.last_analysis().is_some());

        session.set_image(RgbImage::from_pixel(30, 30, Rgb([255, 0, 0])));
        assert!(session.last_analysis().is_none());
    }

    #[test]
    fn test_command_names() {
        assert_eq!(
            SessionCommand::command_names(),
            &["analyze", "suggest_gamma", "annotation"]
        );
        let json = serde_json::to_string(&SessionCommand::SuggestGamma).unwrap();
        assert_eq!(json, r#"{"type":"suggest_gamma"}"#);
    }
}
