use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    annotation::AnnotationRecord,
    error::Result,
    types::RipenessClass,
};

/// Extension of annotation files written next to each other in the output directory.
pub const LABEL_EXTENSION: &str = "txt";

/// `<output_dir>/<image stem>.txt`
pub fn label_path(output_dir: &Path, image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{stem}.{LABEL_EXTENSION}"))
}

/// Write `record` as the single line of the image's label file.
///
/// The output directory is created on first use.
pub fn write_annotation(
    output_dir: &Path,
    image_path: &Path,
    record: &AnnotationRecord,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = label_path(output_dir, image_path);
    fs::write(&path, record.to_line())?;
    Ok(path)
}

/// Delete the image's label file left by an earlier run, if any.
///
/// Returns whether a file was removed.
pub fn remove_annotation(output_dir: &Path, image_path: &Path) -> Result<bool> {
    let path = label_path(output_dir, image_path);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Read a label file back; an empty file means no region.
pub fn read_annotation(path: &Path) -> Result<Option<AnnotationRecord>> {
    let content = fs::read_to_string(path)?;
    match content.lines().find(|line| !line.trim().is_empty()) {
        Some(line) => Ok(Some(line.parse()?)),
        None => Ok(None),
    }
}

/// Copy the original image bytes into `<output_dir>/<class>/`.
pub fn copy_classified(
    output_dir: &Path,
    image_path: &Path,
    class: RipenessClass,
) -> Result<PathBuf> {
    let class_dir = output_dir.join(class.to_string());
    fs::create_dir_all(&class_dir)?;
    let file_name = image_path.file_name().unwrap_or(image_path.as_os_str());
    let destination = class_dir.join(file_name);
    fs::copy(image_path, &destination)?;
    Ok(destination)
}
