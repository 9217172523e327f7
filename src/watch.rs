// ABOUTME: Watch module for monitoring source changes and regenerating the presentation
// ABOUTME: Provides debounced file watching and an optional local HTTP server for the output

use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};
use notify_debouncer_full::new_debouncer;
use tiny_http::{Header, Response, Server, StatusCode};

use crate::config::{Config, CONFIG_EXTENSIONS};
use crate::errors::{RockslideError, Result};
use crate::generator::Generator;
use crate::logging::LogSink;
use crate::parser::MARKDOWN_EXTENSIONS;
use crate::utils;

const ASSET_EXTENSIONS: &[&str] = &[".css", ".js", ".png", ".jpg", ".jpeg", ".gif", ".svg"];

/// Rebuilds the run configuration from its sources after a change.
pub type ConfigLoader = Box<dyn Fn() -> Result<Config>>;

/// Configuration for watch mode
pub struct WatchConfig {
    /// Presentation configuration used for the first build
    pub config: Config,

    /// Presentation file the configuration was loaded from, if any
    pub config_file: Option<PathBuf>,

    /// Replays every configuration layer on rebuild; without it the first
    /// configuration is reused as is
    pub loader: Option<ConfigLoader>,

    /// Debounce time in milliseconds
    pub debounce_ms: u64,

    /// Whether to serve the output using a local web server
    pub serve: bool,

    /// Port for local web server
    pub port: u16,
}

impl WatchConfig {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            config_file: None,
            loader: None,
            debounce_ms: 500,
            serve: false,
            port: 8080,
        }
    }

    /// Configuration for the next rebuild
    fn reload(&self) -> Result<Config> {
        match &self.loader {
            Some(loader) => loader(),
            None => Ok(self.config.clone()),
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    match utils::dotted_extension(path).as_str() {
        ".html" => "text/html; charset=utf-8",
        ".css" => "text/css",
        ".js" => "application/javascript",
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".svg" => "image/svg+xml",
        ".pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Start a simple HTTP server to serve the generated presentation
fn start_server(output_path: PathBuf, port: u16) -> Result<()> {
    let server = Server::http(format!("127.0.0.1:{}", port))
        .map_err(|e| RockslideError::WatchError(format!("Failed to start HTTP server: {}", e)))?;

    let output_dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let output_name = output_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    thread::spawn(move || {
        info!("HTTP server listening on http://localhost:{}", port);
        println!("HTTP server listening on http://localhost:{}", port);

        for request in server.incoming_requests() {
            let url_path = request.url().split('?').next().unwrap_or("/").to_string();

            let file_path = if url_path == "/" {
                output_dir.join(&output_name)
            } else {
                output_dir.join(url_path.trim_start_matches('/'))
            };

            debug!("Request for {:?} -> {:?}", url_path, file_path);

            // Never serve anything outside of the output directory
            let inside = url_path.split('/').all(|segment| segment != "..");
            if !inside || !file_path.is_file() {
                let response =
                    Response::from_string("404 Not Found").with_status_code(StatusCode(404));
                let _ = request.respond(response);
                continue;
            }

            match fs::read(&file_path) {
                Ok(content) => {
                    let response = match Header::from_bytes("Content-Type", content_type(&file_path)) {
                        Ok(header) => Response::from_data(content).with_header(header),
                        Err(_) => Response::from_data(content),
                    };
                    if let Err(e) = request.respond(response) {
                        error!("Failed to send response: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to read file {:?}: {}", file_path, e);
                    let response = Response::from_string(format!("Failed to read file: {}", e))
                        .with_status_code(StatusCode(500));
                    let _ = request.respond(response);
                }
            }
        }
    });

    Ok(())
}

/// Checks if a changed path can affect the presentation
fn is_relevant_path(path: &Path, config: &WatchConfig) -> bool {
    if config.config_file.as_deref() == Some(path) {
        return true;
    }

    // .html and .pdf are not listed, so writing the destination never loops
    let extension = utils::dotted_extension(path);
    MARKDOWN_EXTENSIONS.contains(&extension.as_str())
        || ASSET_EXTENSIONS.contains(&extension.as_str())
        || CONFIG_EXTENSIONS.contains(&extension.as_str())
}

/// Paths to watch, with their recursion mode
fn watch_targets(config: &WatchConfig, generator: &Generator) -> Vec<(PathBuf, RecursiveMode)> {
    let mut targets: Vec<(PathBuf, RecursiveMode)> = Vec::new();
    let mut add = |path: &Path| {
        let target = if path.is_dir() {
            (path.to_path_buf(), RecursiveMode::Recursive)
        } else {
            let parent = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            (parent, RecursiveMode::NonRecursive)
        };
        if !targets.iter().any(|(p, _)| *p == target.0) {
            targets.push(target);
        }
    };

    for source in generator.sources() {
        add(source);
    }
    if let Some(theme_dir) = generator.theme().watch_dir() {
        add(theme_dir);
    }
    if let Some(config_file) = &config.config_file {
        add(config_file);
    }
    targets
}

/// Build a fresh generator and write the presentation
fn regenerate(config: &Config, sink: Option<LogSink>) -> Result<Generator> {
    info!("Regenerating presentation...");
    let generator = Generator::new(config.clone(), sink)?;
    generator.write()?;
    info!("Presentation regenerated: {:?}", generator.destination());
    Ok(generator)
}

/// Generate once, then regenerate whenever a relevant source changes
pub fn watch_sources(config: WatchConfig, sink: Option<LogSink>) -> Result<()> {
    // The initial build must succeed: it validates the whole configuration
    let generator = regenerate(&config.config, sink.clone())?;

    if config.serve {
        start_server(generator.destination().to_path_buf(), config.port)?;
    }

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(config.debounce_ms), None, tx)
        .map_err(|e| RockslideError::WatchError(format!("Failed to create file watcher: {}", e)))?;

    for (path, mode) in watch_targets(&config, &generator) {
        let abs_path = utils::get_absolute_path(&path)?;
        debug!("Watching absolute path: {:?}", abs_path);
        debouncer.watcher().watch(&abs_path, mode).map_err(|e| {
            RockslideError::WatchError(format!("Failed to watch {:?}: {}", abs_path, e))
        })?;
        println!("Watching for changes in {:?} (Press Ctrl+C to stop)", path);
    }

    let mut last_processed = Instant::now();

    for result in rx {
        match result {
            Ok(events) => {
                let relevant_changes = events.iter().any(|event| {
                    event.paths.iter().any(|path| {
                        let is_relevant = is_relevant_path(path, &config);
                        if is_relevant {
                            debug!("Detected relevant change in {:?}", path);
                        }
                        is_relevant
                    })
                });

                let now = Instant::now();
                if relevant_changes
                    && now.duration_since(last_processed) > Duration::from_millis(config.debounce_ms)
                {
                    let current = match config.reload() {
                        Ok(current) => current,
                        Err(e) => {
                            error!("Failed to reload configuration: {}", e);
                            continue;
                        }
                    };
                    match regenerate(&current, sink.clone()) {
                        Ok(generator) => {
                            println!("Regenerated {:?}", generator.destination());
                            last_processed = now;
                        }
                        Err(e) => error!("Failed to regenerate presentation: {}", e),
                    }
                }
            }
            Err(errors) => error!("Watch error: {:?}", errors),
        }
    }

    Ok(())
}
