// ABOUTME: Utility functions for the rockslide application
// ABOUTME: Provides path validation, absolute path resolution and file:// URL helpers

use crate::errors::{RockslideError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Validate that a path (file or directory) exists
pub fn validate_path_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(RockslideError::PathNotFoundError(path.to_path_buf()));
    }
    Ok(())
}

/// Validate that a destination is either missing or a regular file
pub fn validate_destination(path: &Path) -> Result<()> {
    if path.exists() && !path.is_file() {
        return Err(RockslideError::ValidationError(format!(
            "Destination {:?} exists and is not a file",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(RockslideError::FileReadError)?;
    } else if !path.is_dir() {
        return Err(RockslideError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory_exists(parent),
        _ => Ok(()),
    }
}

/// Get the absolute path
pub fn get_absolute_path(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| {
        RockslideError::ValidationError(format!("Failed to get absolute path for {:?}: {}", path, e))
    })
}

/// Absolute `file://` URL of an existing path
pub fn path_url(path: &Path) -> Result<String> {
    let absolute = get_absolute_path(path)?;
    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .map_err(|_| {
            RockslideError::InvalidResourcePath(format!(
                "Cannot build a file URL for {:?}",
                absolute
            ))
        })
}

/// Whether a reference points outside the local filesystem
pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Lowercased extension of a path including the leading dot, or an empty string
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
