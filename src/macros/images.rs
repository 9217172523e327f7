// ABOUTME: Image macros for the rockslide application
// ABOUTME: Inlines local images as data URIs in embed mode, or rewrites them to file:// URLs

use super::{Macro, MacroContext};
use crate::errors::{RockslideError, Result};
use crate::logging::Logger;
use crate::utils;
use base64::Engine;
use image::ImageFormat;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use url::Url;

static IMG_SRC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)(<img\s[^>]*?src=")([^"]+)(")"#).unwrap());

/// Whether an image reference should be left as it is.
fn is_absolute_reference(src: &str) -> bool {
    utils::is_remote(src)
        || src.starts_with("data:")
        || src.starts_with("file:")
        || src.starts_with("//")
        || Path::new(src).is_absolute()
}

fn source_dir(source: Option<&Path>) -> Option<&Path> {
    source.and_then(Path::parent)
}

fn mime_type(path: &Path, bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Some("image/png"),
        Ok(ImageFormat::Jpeg) => Some("image/jpeg"),
        Ok(ImageFormat::Gif) => Some("image/gif"),
        Ok(ImageFormat::WebP) => Some("image/webp"),
        Ok(ImageFormat::Bmp) => Some("image/bmp"),
        Ok(ImageFormat::Ico) => Some("image/x-icon"),
        Ok(ImageFormat::Tiff) => Some("image/tiff"),
        _ => match utils::dotted_extension(path).as_str() {
            ".svg" => Some("image/svg+xml"),
            _ => None,
        },
    }
}

/// Replaces local images by base64 data URIs when embedding.
pub struct EmbedImagesMacro {
    embed: bool,
    logger: Logger,
}

impl EmbedImagesMacro {
    pub fn new(context: &MacroContext) -> Self {
        Self {
            embed: context.embed,
            logger: context.logger.clone(),
        }
    }

    fn encode(path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;
        let mime = mime_type(path, &bytes).ok_or_else(|| {
            RockslideError::InvalidResourcePath(format!("Unknown image type: {:?}", path))
        })?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(format!("data:{};base64,{}", mime, encoded))
    }

    fn resolve(src: &str, source: Option<&Path>) -> PathBuf {
        match source_dir(source) {
            Some(dir) => dir.join(src),
            None => PathBuf::from(src),
        }
    }
}

impl Macro for EmbedImagesMacro {
    fn name(&self) -> &'static str {
        "embed_images"
    }

    fn process(&self, content: &str, source: Option<&Path>) -> Result<(String, Vec<String>)> {
        if !self.embed {
            return Ok((content.to_string(), Vec::new()));
        }

        let new_content = IMG_SRC_REGEX.replace_all(content, |caps: &Captures| {
            let src = &caps[2];
            if src.starts_with("data:") {
                return caps[0].to_string();
            }
            if utils::is_remote(src) {
                self.logger
                    .warning(&format!("Remote image \"{}\" is not embedded", src));
                return caps[0].to_string();
            }
            let path = Self::resolve(src, source);
            match Self::encode(&path) {
                Ok(data_uri) => {
                    self.logger.notice(&format!("Embedded image {}", src));
                    format!("{}{}{}", &caps[1], data_uri, &caps[3])
                }
                Err(e) => {
                    self.logger
                        .warning(&format!("Failed to embed image \"{}\": {}", src, e));
                    caps[0].to_string()
                }
            }
        });

        Ok((new_content.into_owned(), Vec::new()))
    }
}

/// Rewrites relative image paths to absolute `file://` URLs when not embedding.
pub struct FixImagePathsMacro {
    embed: bool,
}

impl FixImagePathsMacro {
    pub fn new(context: &MacroContext) -> Self {
        Self {
            embed: context.embed,
        }
    }
}

impl Macro for FixImagePathsMacro {
    fn name(&self) -> &'static str {
        "fix_image_paths"
    }

    fn process(&self, content: &str, source: Option<&Path>) -> Result<(String, Vec<String>)> {
        if self.embed {
            return Ok((content.to_string(), Vec::new()));
        }
        let Some(dir) = source_dir(source) else {
            return Ok((content.to_string(), Vec::new()));
        };

        let base = Url::from_directory_path(dir).map_err(|_| {
            RockslideError::macro_error(
                self.name(),
                format!("source directory {:?} is not absolute", dir),
            )
        })?;

        let mut failure = None;
        let new_content = IMG_SRC_REGEX.replace_all(content, |caps: &Captures| {
            let src = &caps[2];
            if is_absolute_reference(src) {
                return caps[0].to_string();
            }
            match base.join(src) {
                Ok(url) => format!("{}{}{}", &caps[1], url, &caps[3]),
                Err(e) => {
                    failure.get_or_insert_with(|| format!("cannot resolve {}: {}", src, e));
                    caps[0].to_string()
                }
            }
        });

        match failure {
            Some(message) => Err(RockslideError::macro_error(self.name(), message)),
            None => Ok((new_content.into_owned(), Vec::new())),
        }
    }
}
