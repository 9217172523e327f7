// ABOUTME: Configuration module for the rockslide application
// ABOUTME: Merges defaults, environment variables and TOML presentation files into one run configuration

use crate::errors::{RockslideError, Result};
use crate::theme::DEFAULT_THEME;
use crate::utils;
use log::debug;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DESTINATION: &str = "presentation.html";
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Extensions recognised as presentation configuration files
pub const CONFIG_EXTENSIONS: &[&str] = &[".cfg", ".toml"];

/// Everything needed to build one presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
    pub theme: String,
    pub embed: bool,
    /// Print the HTML to stdout instead of writing the destination
    pub direct: bool,
    pub verbose: bool,
    pub encoding: String,
    /// Markdown extensions to enable on top of the defaults
    pub extensions: Vec<String>,
    pub css: Vec<String>,
    pub js: Vec<String>,
    /// Macro names in application order; `None` keeps the default set
    pub macros: Option<Vec<String>>,
    pub browser_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            theme: DEFAULT_THEME.to_string(),
            embed: false,
            direct: false,
            verbose: false,
            encoding: DEFAULT_ENCODING.to_string(),
            extensions: Vec::new(),
            css: Vec::new(),
            js: Vec::new(),
            macros: None,
            browser_path: None,
        }
    }
}

/// One string, or a list of strings; a string is split on newlines
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            OneOrMany::One(value) => value.lines().map(str::to_string).collect(),
            OneOrMany::Many(values) => values,
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    rockslide: Option<FileSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSection {
    source: Option<OneOrMany>,
    theme: Option<String>,
    destination: Option<String>,
    embed: Option<bool>,
    css: Option<OneOrMany>,
    js: Option<OneOrMany>,
    macros: Option<Vec<String>>,
    extensions: Option<OneOrMany>,
    encoding: Option<String>,
}

fn resolve(base_dir: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn resolve_resource(base_dir: &Path, value: &str) -> String {
    if utils::is_remote(value) {
        value.to_string()
    } else {
        resolve(base_dir, value).to_string_lossy().into_owned()
    }
}

impl Config {
    /// Configuration for a single source file or directory
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            sources: vec![source.into()],
            ..Self::default()
        }
    }

    /// Defaults overridden by environment variables
    pub fn from_env(source: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(source);
        if let Ok(theme) = env::var("ROCKSLIDE_THEME") {
            config.theme = theme;
        }
        if let Ok(encoding) = env::var("ROCKSLIDE_ENCODING") {
            config.encoding = encoding;
        }
        config.embed = env::var("ROCKSLIDE_EMBED")
            .ok()
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);
        config.browser_path = env::var("BROWSER_PATH").ok().filter(|p| !p.is_empty());
        config
    }

    pub fn is_config_file(path: &Path) -> bool {
        CONFIG_EXTENSIONS.contains(&utils::dotted_extension(path).as_str())
    }

    /// Environment defaults, plus the presentation file when `source` is one
    pub fn load(source: &Path) -> Result<Self> {
        let mut config = Self::from_env(source);
        if Self::is_config_file(source) {
            utils::validate_path_exists(source)?;
            config.apply_file(source)?;
        }
        Ok(config)
    }

    /// Read a presentation file and merge it into this configuration.
    ///
    /// Relative paths inside the file are relative to the file itself.
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        debug!("Reading configuration file {:?}", path);
        let raw = fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        self.apply_str(&raw, &base_dir)
    }

    fn apply_str(&mut self, raw: &str, base_dir: &Path) -> Result<()> {
        let file: ConfigFile = toml::from_str(raw)?;
        let section = file.rockslide.ok_or_else(|| {
            RockslideError::ConfigError("missing [rockslide] section".to_string())
        })?;

        let sources = section.source.map(OneOrMany::into_vec).unwrap_or_default();
        if sources.is_empty() {
            return Err(RockslideError::ConfigError(
                "unable to fetch a valid source from config".to_string(),
            ));
        }
        self.sources = sources.iter().map(|s| resolve(base_dir, s)).collect();

        if let Some(theme) = section.theme {
            let local = base_dir.join(&theme);
            self.theme = if local.is_dir() {
                local.to_string_lossy().into_owned()
            } else {
                theme
            };
        }
        if let Some(destination) = section.destination {
            self.destination = resolve(base_dir, &destination);
        }
        if let Some(embed) = section.embed {
            self.embed = embed;
        }
        if let Some(css) = section.css {
            self.css = css.into_vec().iter().map(|c| resolve_resource(base_dir, c)).collect();
        }
        if let Some(js) = section.js {
            self.js = js.into_vec().iter().map(|j| resolve_resource(base_dir, j)).collect();
        }
        if let Some(macros) = section.macros {
            self.macros = Some(macros);
        }
        if let Some(extensions) = section.extensions {
            self.extensions = extensions.into_vec();
        }
        if let Some(encoding) = section.encoding {
            self.encoding = encoding;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_full_config_file() {
        let mut config = Config::default();
        config
            .apply_str(
                r#"
[rockslide]
source = ["intro.md", "chapters/"]
theme = "light"
destination = "out/deck.html"
embed = true
css = "extra.css\nhttps://example.com/remote.css"
js = ["nav.js"]
macros = ["fx", "notes"]
extensions = ["footnotes"]
"#,
                Path::new("/talk"),
            )
            .expect("Failed to parse config");

        assert_eq!(
            config.sources,
            vec![PathBuf::from("/talk/intro.md"), PathBuf::from("/talk/chapters/")]
        );
        assert_eq!(config.theme, "light");
        assert_eq!(config.destination, PathBuf::from("/talk/out/deck.html"));
        assert!(config.embed);
        assert_eq!(
            config.css,
            vec!["/talk/extra.css".to_string(), "https://example.com/remote.css".to_string()]
        );
        assert_eq!(config.js, vec!["/talk/nav.js".to_string()]);
        assert_eq!(config.macros, Some(vec!["fx".to_string(), "notes".to_string()]));
        assert_eq!(config.extensions, vec!["footnotes".to_string()]);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_str("[rockslide]\ntheme = \"light\"\n", Path::new("."));
        assert!(matches!(result, Err(RockslideError::ConfigError(_))));

        let result = config.apply_str("[rockslide]\nsource = []\n", Path::new("."));
        assert!(matches!(result, Err(RockslideError::ConfigError(_))));

        let result = config.apply_str("[other]\nsource = \"a.md\"\n", Path::new("."));
        assert!(matches!(result, Err(RockslideError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_str("[rockslide\nsource = ", Path::new("."));
        assert!(matches!(result, Err(RockslideError::ConfigError(_))));

        let result = config.apply_str("[rockslide]\nsource = \"a.md\"\ncolour = 1\n", Path::new("."));
        assert!(matches!(result, Err(RockslideError::ConfigError(_))));
    }

    #[test]
    fn test_load_reads_presentation_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = dir.path().join("talk.cfg");
        fs::write(&cfg, "[rockslide]\nsource = \"slides\"\ndestination = \"talk.html\"\n")
            .expect("Failed to write config");

        let config = Config::load(&cfg).expect("Failed to load config");
        assert_eq!(config.sources, vec![dir.path().join("slides")]);
        assert_eq!(config.destination, dir.path().join("talk.html"));
    }

    #[test]
    fn test_load_plain_source() {
        let config = Config::load(Path::new("slides.md")).expect("Failed to load config");
        assert_eq!(config.sources, vec![PathBuf::from("slides.md")]);
        assert_eq!(config.destination, PathBuf::from(DEFAULT_DESTINATION));
    }

    #[test]
    fn test_is_config_file() {
        assert!(Config::is_config_file(Path::new("talk.cfg")));
        assert!(Config::is_config_file(Path::new("talk.TOML")));
        assert!(!Config::is_config_file(Path::new("talk.md")));
    }
}
