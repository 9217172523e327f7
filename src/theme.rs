// ABOUTME: Theme lookup for the rockslide application
// ABOUTME: Resolves a theme directory and its stylesheets/scripts, falling back to the built-in default theme

use crate::errors::{RockslideError, Result};
use crate::logging::Logger;
use crate::resources::Asset;
use crate::utils;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the themes shipped with rockslide.
pub const THEMES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/themes");

pub const DEFAULT_THEME: &str = "default";

const PRINT_CSS: &str = "css/print.css";
const SCREEN_CSS: &str = "css/screen.css";
const SLIDES_JS: &str = "js/slides.js";

// Compiled in so a relocated binary still renders
const DEFAULT_PRINT_CSS: &str = include_str!("../themes/default/css/print.css");
const DEFAULT_SCREEN_CSS: &str = include_str!("../themes/default/css/screen.css");
const DEFAULT_SLIDES_JS: &str = include_str!("../themes/default/js/slides.js");

/// Stylesheets of a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCss {
    pub print: Asset,
    pub screen: Option<Asset>,
}

/// A resolved theme. `dir` is `None` for the built-in default theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub dir: Option<PathBuf>,
}

impl Theme {
    /// Find a theme by path or by name among the bundled themes.
    pub fn find(theme: &str) -> Result<Self> {
        let as_path = Path::new(theme);
        let bundled = Path::new(THEMES_DIR).join(theme);

        let dir = if !theme.is_empty() && as_path.is_dir() {
            Some(as_path.to_path_buf())
        } else if !theme.is_empty() && bundled.is_dir() {
            Some(bundled)
        } else if theme == DEFAULT_THEME {
            None
        } else {
            return Err(RockslideError::ThemeNotFound(theme.to_string()));
        };

        Ok(Self {
            name: theme.to_string(),
            dir,
        })
    }

    fn theme_file(&self, relative: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(relative))
            .filter(|path| path.is_file())
    }

    pub fn css(&self, logger: &Logger) -> Result<ThemeCss> {
        let print = match self.theme_file(PRINT_CSS) {
            Some(path) => read_asset(&path)?,
            None => default_asset(PRINT_CSS, DEFAULT_PRINT_CSS),
        };

        let screen = match (&self.dir, self.theme_file(SCREEN_CSS)) {
            (_, Some(path)) => Some(read_asset(&path)?),
            (None, None) => Some(default_asset(SCREEN_CSS, DEFAULT_SCREEN_CSS)),
            (Some(_), None) => {
                logger.warning("No screen stylesheet provided in current theme");
                None
            }
        };

        Ok(ThemeCss { print, screen })
    }

    pub fn js(&self) -> Result<Asset> {
        match self.theme_file(SLIDES_JS) {
            Some(path) => read_asset(&path),
            None => Ok(default_asset(SLIDES_JS, DEFAULT_SLIDES_JS)),
        }
    }

    /// Directory to watch for theme changes, if the theme lives on disk.
    pub fn watch_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

fn read_asset(path: &Path) -> Result<Asset> {
    Ok(Asset {
        path_url: utils::path_url(path)?,
        contents: fs::read_to_string(path)?,
    })
}

fn default_asset(relative: &str, contents: &str) -> Asset {
    let on_disk = Path::new(THEMES_DIR).join(DEFAULT_THEME).join(relative);
    Asset {
        // Empty when the source tree is gone; the renderer then inlines
        path_url: utils::path_url(&on_disk).unwrap_or_default(),
        contents: contents.to_string(),
    }
}
