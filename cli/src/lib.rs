use ripeness::{AnalysisConfig, BatchOutput, Preset, RipenessError, io::is_supported_image};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Ripeness(#[from] RipenessError),
    #[error("Input directory does not exist: {0}")]
    MissingInputDir(PathBuf),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

fn default_true() -> bool {
    true
}

/// A dataset sorting run described in a job file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BatchJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default = "batch_preset")]
    pub preset: Preset,
    /// Full config file, takes precedence over `preset`
    #[serde(default)]
    pub config: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub write_labels: bool,
    #[serde(default)]
    pub copy_classified: bool,
    /// Descend into subdirectories
    #[serde(default)]
    pub recursive: bool,
}

fn batch_preset() -> Preset {
    Preset::BatchDefault
}

impl BatchJob {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input_dir: P, output_dir: Q) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            preset: batch_preset(),
            config: None,
            write_labels: true,
            copy_classified: false,
            recursive: false,
        }
    }

    /// Load BatchJob from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load BatchJob from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load the job
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Preset, or the config file when one is named
    pub fn analysis_config(&self) -> Result<AnalysisConfig, CliError> {
        resolve_config(self.preset, self.config.as_deref())
    }

    pub fn output(&self) -> BatchOutput {
        BatchOutput {
            output_dir: self.output_dir.clone(),
            write_labels: self.write_labels,
            copy_classified: self.copy_classified,
        }
    }

    pub fn discover(&self) -> Result<Vec<PathBuf>, CliError> {
        discover_images(&self.input_dir, self.recursive)
    }
}

pub fn resolve_config(preset: Preset, config: Option<&Path>) -> Result<AnalysisConfig, CliError> {
    match config {
        Some(path) => Ok(AnalysisConfig::from_file(path)?),
        None => Ok(preset.config()),
    }
}

/// Supported image files under `dir`, sorted by path
pub fn discover_images<P: AsRef<Path>>(dir: P, recursive: bool) -> Result<Vec<PathBuf>, CliError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(CliError::MissingInputDir(dir.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_supported_image(path))
        .collect();
    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_defaults_from_toml() {
        let job = BatchJob::from_toml(
            r#"
            input_dir = "photos"
            output_dir = "labels"
            "#,
        )
        .expect("Should parse");

        assert_eq!(job, BatchJob::new("photos", "labels"));
        assert_eq!(job.preset, Preset::BatchDefault);
        assert!(job.write_labels);
        assert!(!job.copy_classified);
    }

    #[test]
    fn test_job_json_with_preset() {
        let job = BatchJob::from_json(
            r#"{"input_dir": "in", "output_dir": "out", "preset": "interactive-default", "copy_classified": true}"#,
        )
        .expect("Should parse");

        assert_eq!(job.preset, Preset::InteractiveDefault);
        assert_eq!(job.analysis_config().unwrap(), AnalysisConfig::interactive());
        assert!(job.output().copy_classified);
        assert_eq!(BatchJob::from_json(&job.to_json().unwrap()).unwrap(), job);
    }

    #[test]
    fn test_job_file_extension() {
        assert!(matches!(
            BatchJob::from_file("job.yaml"),
            Err(CliError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "notes.txt", "c.jpeg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("d.png"), b"").unwrap();

        let names = |paths: Vec<PathBuf>| -> Vec<String> {
            paths
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };

        let flat = discover_images(dir.path(), false).unwrap();
        assert_eq!(names(flat), ["a.JPG", "b.png", "c.jpeg"]);

        let deep = discover_images(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 4);
    }

    #[test]
    fn test_discover_missing_dir() {
        assert!(matches!(
            discover_images("/definitely/not/here", false),
            Err(CliError::MissingInputDir(_))
        ));
    }
}
