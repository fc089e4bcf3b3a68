use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    annotation::AnnotationRecord,
    config::AnalysisConfig,
    error::Result,
    io::{copy_classified, label_path, remove_annotation, write_annotation},
    pipeline::{AnalysisSummary, Pipeline},
    types::RipenessClass,
};

/// Where batch results go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutput {
    pub output_dir: PathBuf,
    /// Write `<stem>.txt` label files
    pub write_labels: bool,
    /// Copy each original into `<output_dir>/<class>/`
    pub copy_classified: bool,
}

impl BatchOutput {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            write_labels: true,
            copy_classified: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedImage {
    pub path: PathBuf,
    pub summary: AnalysisSummary,
    pub label_path: Option<PathBuf>,
    pub copied_to: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub processed: Vec<ProcessedImage>,
    pub skipped: Vec<SkippedImage>,
}

impl BatchReport {
    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for image in &self.processed {
            *counts.entry(image.summary.ripeness.class.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, class: RipenessClass) -> usize {
        self.processed
            .iter()
            .filter(|image| image.summary.ripeness.class == class)
            .count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Pairs of input images that map to the same `<stem>.txt` in `output_dir`,
/// each paired with the first image that claimed the file.
pub fn label_collisions<P: AsRef<Path>>(output_dir: &Path, paths: &[P]) -> Vec<(PathBuf, PathBuf)> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut collisions = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let label = label_path(output_dir, path);
        match claimed.get(&label) {
            Some(first) => collisions.push((first.to_path_buf(), path.to_path_buf())),
            None => {
                claimed.insert(label, path);
            }
        }
    }
    collisions
}

/// Runs a pipeline over an ordered list of image paths.
///
/// A failing image is logged and recorded as skipped; the run continues.
pub struct BatchProcessor {
    pipeline: Pipeline,
    output: BatchOutput,
}

impl BatchProcessor {
    pub fn new(pipeline: Pipeline, output: BatchOutput) -> Self {
        Self { pipeline, output }
    }

    pub fn from_config(config: &AnalysisConfig, output: BatchOutput) -> Self {
        Self::new(Pipeline::from_config(config), output)
    }

    pub fn output(&self) -> &BatchOutput {
        &self.output
    }

    /// Analyze one image and write its outputs.
    ///
    /// The class copy is made before the label; if the label cannot be
    /// written the copy is removed again, so a failed image leaves nothing
    /// behind. A run that finds no region deletes any earlier label.
    pub fn process_one(&self, path: &Path) -> Result<ProcessedImage> {
        let analysis = self.pipeline.process_path(path)?;
        let summary = analysis.summary();
        let output_dir = &self.output.output_dir;

        let copied_to = if self.output.copy_classified {
            Some(copy_classified(output_dir, path, summary.ripeness.class)?)
        } else {
            None
        };

        let label_path = if self.output.write_labels {
            match self.write_label(path, analysis.annotation.as_ref()) {
                Ok(label_path) => label_path,
                Err(e) => {
                    if let Some(copy) = &copied_to {
                        if let Err(cleanup) = fs::remove_file(copy) {
                            warn!("Could not remove {}: {}", copy.display(), cleanup);
                        }
                    }
                    return Err(e);
                }
            }
        } else {
            None
        };

        info!(
            "{}: {} ({:.2}%)",
            path.display(),
            summary.ripeness.class,
            summary.ripeness.ratio
        );

        Ok(ProcessedImage {
            path: path.to_path_buf(),
            summary,
            label_path,
            copied_to,
        })
    }

    fn write_label(&self, path: &Path, record: Option<&AnnotationRecord>) -> Result<Option<PathBuf>> {
        let output_dir = &self.output.output_dir;
        match record {
            Some(record) => Ok(Some(write_annotation(output_dir, path, record)?)),
            None => {
                if remove_annotation(output_dir, path)? {
                    debug!("Removed stale label for {}", path.display());
                }
                Ok(None)
            }
        }
    }

    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> BatchReport {
        let mut report = BatchReport::default();

        if self.output.write_labels {
            for (first, second) in label_collisions(&self.output.output_dir, paths) {
                warn!(
                    "{} and {} share a label file; the later one wins",
                    first.display(),
                    second.display()
                );
            }
        }

        for path in paths {
            let path = path.as_ref();
            match self.process_one(path) {
                Ok(processed) => report.processed.push(processed),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.skipped.push(SkippedImage {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Batch finished: {} processed, {} skipped",
            report.processed.len(),
            report.skipped.len()
        );
        report
    }
}
