//! Directory scanning for upload.
//!
//! Recursively walks a directory and produces the files to upload with
//! relative paths normalized to forward slashes.

use std::path::{Path, PathBuf};

use crate::error::AssetError;
use crate::sniff::detect_content_type;

/// A file ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Path on the local filesystem.
    pub source_path: PathBuf,
    /// Path relative to the scanned root, `/`-separated, no leading separator.
    pub relative_path: String,
    pub contents: Vec<u8>,
    /// Content type sniffed from the leading bytes.
    pub content_type: &'static str,
}

/// Collects every non-hidden file below `root`.
///
/// Directories are walked depth-first and never emitted themselves. Any
/// file or directory whose name starts with `.` is skipped along with
/// everything below it. Files are read fully; callers must not rely on
/// the order of the result.
pub fn collect(root: &Path) -> Result<Vec<AssetFile>, AssetError> {
    let paths = list_files(root)?;
    let mut assets = Vec::with_capacity(paths.len());

    for path in paths {
        let contents = std::fs::read(&path).map_err(|source| AssetError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let relative_path = relative_upload_path(root, &path);
        let content_type = detect_content_type(&contents);

        assets.push(AssetFile {
            source_path: path,
            relative_path,
            contents,
            content_type,
        });
    }

    tracing::debug!(root = %root.display(), files = assets.len(), "assets collected");
    Ok(assets)
}

/// Returns whether `root` contains at least one file [`collect`] would emit.
pub fn has_assets(root: &Path) -> Result<bool, AssetError> {
    Ok(!list_files(root)?.is_empty())
}

fn list_files(root: &Path) -> Result<Vec<PathBuf>, AssetError> {
    let mut files = Vec::new();
    walk_dir(root, &mut files)?;
    Ok(files)
}

fn walk_dir(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), AssetError> {
    let read_dir_err = |source| AssetError::ReadDir {
        path: current.to_path_buf(),
        source,
    };

    let mut entries = std::fs::read_dir(current)
        .map_err(read_dir_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_dir_err)?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        if is_hidden(&entry.file_name()) {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| AssetError::ReadDir {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            walk_dir(&path, files)?;
        } else {
            files.push(path);
        }
    }

    Ok(())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Strips `root` from `path` and normalizes separators to `/`.
fn relative_upload_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = rel.to_string_lossy().replace('\\', "/");
    rel.trim_start_matches('/').to_string()
}
