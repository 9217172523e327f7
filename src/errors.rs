// ABOUTME: Error types for the rockslide application
// ABOUTME: Separates fatal configuration/output errors from per-file and per-macro soft failures

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RockslideError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to fetch remote resource: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Invalid resource path: {0}")]
    InvalidResourcePath(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(
        "This program can only write html or pdf files, please use one of these \
         extensions in the destination: {0}"
    )]
    UnsupportedDestination(PathBuf),

    #[error("Theme {0} not found or invalid")]
    ThemeNotFound(String),

    #[error("Couldn't register macro: {0}")]
    InvalidMacro(String),

    // Soft failure: the walker skips the file.
    #[error("Format not supported: {0}")]
    UnsupportedFormat(String),

    // Soft failure: the walker skips the file.
    #[error("Unable to decode {path:?} as {encoding}")]
    DecodeError { path: PathBuf, encoding: String },

    // Soft failure: the macro stage discards that macro's output for one slide.
    #[error("{name} processing failed: {message}")]
    MacroError { name: String, message: String },

    #[error("Unable to create temporary file: {0}")]
    TempFileError(String),

    #[error("Headless browser error: {message}")]
    BrowserError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Browser not found. Make sure Chrome/Chromium is installed to export PDF files.")]
    BrowserNotFound,

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl RockslideError {
    /// Shorthand used by macros to report a failure on the current slide.
    pub fn macro_error(name: &str, message: impl Into<String>) -> Self {
        RockslideError::MacroError {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

// Implement conversion from anyhow::Error to our RockslideError
impl From<anyhow::Error> for RockslideError {
    fn from(err: anyhow::Error) -> Self {
        RockslideError::UnknownError(err.to_string())
    }
}

impl From<toml::de::Error> for RockslideError {
    fn from(err: toml::de::Error) -> Self {
        RockslideError::ConfigError(format!("Invalid configuration file: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, RockslideError>;
