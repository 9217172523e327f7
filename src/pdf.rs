// ABOUTME: PDF export module for the rockslide application
// ABOUTME: Prints a rendered slideshow to PDF through a headless Chrome/Chromium browser

use crate::errors::{RockslideError, Result};
use crate::utils;
use headless_chrome::{Browser, LaunchOptionsBuilder};
use log::{info, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for PDF export
#[derive(Debug, Clone)]
pub struct PdfConfig {
    pub browser_path: Option<String>,
    pub timeout_ms: u64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            browser_path: None,
            timeout_ms: 30000, // 30 seconds
        }
    }
}

/// Temporary HTML file removed when dropped
struct TempHtml {
    path: PathBuf,
}

impl TempHtml {
    fn create(html: &str) -> Result<Self> {
        let path = env::temp_dir().join(format!("rockslide_{}.html", uuid::Uuid::new_v4()));
        fs::write(&path, html).map_err(|e| {
            RockslideError::TempFileError(format!("{:?}: {}", path, e))
        })?;
        Ok(Self { path })
    }
}

impl Drop for TempHtml {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to clean up temporary file {:?}: {}", self.path, e);
        }
    }
}

fn browser_error(message: String) -> RockslideError {
    RockslideError::BrowserError {
        message,
        source: None,
    }
}

fn launch_browser(config: &PdfConfig) -> Result<Browser> {
    let mut launch_options_builder = LaunchOptionsBuilder::default();
    launch_options_builder.headless(true);
    launch_options_builder.idle_browser_timeout(Duration::from_millis(config.timeout_ms));

    // Use custom browser path if specified
    let browser_path = config
        .browser_path
        .clone()
        .or_else(|| env::var("BROWSER_PATH").ok())
        .filter(|path| !path.is_empty());
    if let Some(path) = browser_path {
        if !Path::new(&path).exists() {
            return Err(RockslideError::BrowserNotFound);
        }
        launch_options_builder.path(Some(PathBuf::from(path)));
    }

    let launch_options = launch_options_builder
        .build()
        .map_err(|e| browser_error(format!("Failed to build browser options: {:?}", e)))?;

    info!("Launching headless browser");
    Browser::new(launch_options).map_err(|e| {
        let message = e.to_string();
        if message.contains("auto detect") || message.contains("No such file") {
            RockslideError::BrowserNotFound
        } else {
            browser_error(format!("Failed to launch browser: {}", message))
        }
    })
}

/// Write `html` to a temporary file, print it and store the PDF at `destination`
pub fn write_pdf(html: &str, destination: &Path, config: &PdfConfig) -> Result<()> {
    info!("Exporting PDF to {:?}", destination);

    let temp = TempHtml::create(html)?;
    let url = url::Url::from_file_path(&temp.path)
        .map_err(|_| browser_error(format!("Invalid temporary path {:?}", temp.path)))?;

    let browser = launch_browser(config)?;
    let tab = browser
        .new_tab()
        .map_err(|e| browser_error(format!("Failed to create new tab: {}", e)))?;
    tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

    tab.navigate_to(url.as_str())
        .map_err(|e| browser_error(format!("Failed to navigate to HTML: {}", e)))?;
    tab.wait_until_navigated()
        .map_err(|e| browser_error(format!("Navigation failed: {}", e)))?;

    let pdf = tab
        .print_to_pdf(None)
        .map_err(|e| browser_error(format!("Failed to print PDF: {}", e)))?;

    utils::ensure_parent_directory_exists(destination)?;
    fs::write(destination, pdf).map_err(RockslideError::FileReadError)?;

    info!("PDF written to {:?}", destination);
    Ok(())
}
