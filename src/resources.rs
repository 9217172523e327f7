// ABOUTME: Resource handling for the rockslide application
// ABOUTME: Loads user CSS/JS files, local or remote, into assets the HTML renderer can link or inline

use crate::errors::{RockslideError, Result};
use crate::utils;
use log::info;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// A stylesheet or script ready for rendering.
///
/// `path_url` is used when linking, `contents` when inlining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path_url: String,
    pub contents: String,
}

/// Represents a resource file that can be either local or remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    pub path: String,
    pub is_remote: bool,
}

impl ResourceFile {
    /// Create a new ResourceFile from a path string.
    /// The path can be either a local file path or a URL.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            is_remote: utils::is_remote(path),
        }
    }

    /// Local resources must exist when the presentation is configured.
    pub fn validate(&self) -> Result<()> {
        if self.is_remote {
            return Ok(());
        }
        let path = Path::new(&self.path);
        if !path.is_file() {
            return Err(RockslideError::PathNotFoundError(path.to_path_buf()));
        }
        Ok(())
    }

    /// URL used to link the resource from the generated document.
    pub fn path_url(&self) -> Result<String> {
        if self.is_remote {
            Ok(self.path.clone())
        } else {
            utils::path_url(Path::new(&self.path))
        }
    }

    /// Get the content of the resource file.
    /// If the file is remote, it will be fetched from the URL.
    /// If the file is local, it will be read from the filesystem.
    pub fn content(&self) -> Result<String> {
        if self.is_remote {
            self.fetch_remote_content()
        } else {
            self.read_local_content()
        }
    }

    /// Load the resource; remote contents are only fetched when embedding.
    pub fn load(&self, embed: bool) -> Result<Asset> {
        let contents = if self.is_remote && !embed {
            String::new()
        } else {
            self.content()?
        };
        Ok(Asset {
            path_url: self.path_url()?,
            contents,
        })
    }

    fn fetch_remote_content(&self) -> Result<String> {
        info!("Fetching remote resource: {}", self.path);

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(RockslideError::FetchError)?;

        let response = client.get(&self.path).send()?;
        if !response.status().is_success() {
            return Err(RockslideError::ValidationError(format!(
                "HTTP error {} fetching {}",
                response.status(),
                self.path
            )));
        }
        response.text().map_err(RockslideError::FetchError)
    }

    fn read_local_content(&self) -> Result<String> {
        info!("Reading local resource: {}", self.path);
        if !Path::new(&self.path).exists() {
            return Err(RockslideError::PathNotFoundError(
                Path::new(&self.path).to_path_buf(),
            ));
        }

        fs::read_to_string(&self.path).map_err(RockslideError::FileReadError)
    }
}

/// Turn user supplied paths into validated resources, dropping duplicates.
pub fn collect_resources<S: AsRef<str>>(paths: &[S]) -> Result<Vec<ResourceFile>> {
    let mut resources: Vec<ResourceFile> = Vec::new();
    for path in paths.iter().map(AsRef::as_ref).map(str::trim) {
        if path.is_empty() || resources.iter().any(|r| r.path == path) {
            continue;
        }
        let resource = ResourceFile::new(path);
        resource.validate()?;
        resources.push(resource);
    }
    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resource_file_remote() {
        let resource = ResourceFile::new("https://example.com/style.css");
        assert!(resource.is_remote);
        assert!(resource.validate().is_ok());

        let asset = resource.load(false).expect("Failed to load");
        assert_eq!(asset.path_url, "https://example.com/style.css");
        assert!(asset.contents.is_empty());
    }

    #[test]
    fn test_local_resource_is_read() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let css = dir.path().join("extra.css");
        fs::write(&css, "h1 { color: red; }").expect("Failed to write css");

        let resource = ResourceFile::new(css.to_str().unwrap());
        let asset = resource.load(false).expect("Failed to load");
        assert_eq!(asset.contents, "h1 { color: red; }");
        assert!(asset.path_url.starts_with("file://"));
    }

    #[test]
    fn test_collect_resources_dedupes_and_validates() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let css = dir.path().join("extra.css");
        fs::write(&css, "").expect("Failed to write css");
        let css = css.to_str().unwrap().to_string();

        let resources =
            collect_resources(&[css.clone(), css.clone(), String::new()]).expect("collect failed");
        assert_eq!(resources.len(), 1);

        let missing = dir.path().join("missing.css");
        let result = collect_resources(&[missing.to_str().unwrap()]);
        assert!(matches!(result, Err(RockslideError::PathNotFoundError(_))));
    }
}
