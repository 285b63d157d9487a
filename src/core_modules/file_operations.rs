// THEORY:
// `file_operations` is the thin file-system edge of the engine. Everything here
// is glue the vision core calls into: listing the batch, naming things, making
// the result folder and writing the summary. None of it knows about pixels.

use crate::core_modules::eye_record::EyeImageRecord;
use crate::error::{VisionError, VisionResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE_NAME: &str = "result.json";
const FALLBACK_EXTENSION: &str = ".png";

/// Lists the regular files directly inside `folder` whose names do not end with
/// any of `excluded`. Sub-folders are not entered. The list is sorted by path.
pub fn list_image_files(folder: &Path, excluded: &[String]) -> VisionResult<Vec<PathBuf>> {
    let entries = fs::read_dir(folder).map_err(|e| VisionError::io(folder, e))?;
    let mut files = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| VisionError::io(folder, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = file_name_of(&path);
        if excluded.iter().any(|suffix| name.ends_with(suffix.as_str())) {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// Returns the tail of `path` that starts right after the `depth`-th
/// `delimiter` counted from the end. With fewer delimiters the whole path is returned.
pub fn directory_label(path: &str, delimiter: char, depth: usize) -> String {
    let mut end = path.len();
    for _ in 0..depth {
        match path[..end].rfind(delimiter) {
            Some(pos) => end = pos,
            None => return path.to_string(),
        }
    }
    path[end + delimiter.len_utf8()..].to_string()
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The extension of `path` including the leading dot.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Creates `path` and its parents. A folder that already exists is fine.
pub fn create_directory(path: &Path) -> VisionResult<()> {
    fs::create_dir_all(path).map_err(|e| VisionError::io(path, e))
}

/// Writes the records as a JSON array to `<folder>/result.json`.
pub fn save_summary(records: &[EyeImageRecord], folder: &Path) -> VisionResult<PathBuf> {
    let mut json = serde_json::to_string(records)?;
    json.push('\n');
    let path = folder.join(SUMMARY_FILE_NAME);
    fs::write(&path, json).map_err(|e| VisionError::io(&path, e))?;
    tracing::info!("Done. Result was saved to {}", path.display());
    Ok(path)
}
