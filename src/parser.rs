// ABOUTME: Markup parsers for the rockslide application
// ABOUTME: Resolves a parser by file extension and turns raw source text into HTML

use crate::errors::{RockslideError, Result};
use comrak::{markdown_to_html, ComrakOptions};

/// File extensions handled by the Markdown parser.
pub const MARKDOWN_EXTENSIONS: &[&str] = &[".md", ".markdown", ".mdown", ".mkd", ".mkdn"];

/// A markup dialect able to turn one source file into HTML.
pub trait Parser {
    /// Human readable name of the format, used in progress logs.
    fn format(&self) -> &'static str;

    /// Parse the full text of a source file.
    fn parse(&self, text: &str) -> Result<String>;
}

/// Optional Markdown syntax extensions, toggled with a comma separated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownExtensions {
    pub tables: bool,
    pub strikethrough: bool,
    pub autolink: bool,
    pub tasklist: bool,
    pub footnotes: bool,
    pub superscript: bool,
    pub description_lists: bool,
    pub header_ids: bool,
}

impl Default for MarkdownExtensions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: false,
            footnotes: false,
            superscript: false,
            description_lists: false,
            header_ids: false,
        }
    }
}

impl MarkdownExtensions {
    /// Enable the named extensions on top of the defaults.
    ///
    /// Each item may itself be a comma separated list.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut extensions = Self::default();
        for name in names
            .iter()
            .flat_map(|item| item.as_ref().split(','))
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            extensions.enable(name)?;
        }
        Ok(extensions)
    }

    pub fn enable(&mut self, name: &str) -> Result<()> {
        match name.to_lowercase().as_str() {
            "tables" | "table" => self.tables = true,
            "strikethrough" => self.strikethrough = true,
            "autolink" => self.autolink = true,
            "tasklist" => self.tasklist = true,
            "footnotes" => self.footnotes = true,
            "superscript" => self.superscript = true,
            "description_lists" | "def_list" => self.description_lists = true,
            "header_ids" | "toc" => self.header_ids = true,
            other => {
                return Err(RockslideError::ConfigError(format!(
                    "Unknown markdown extension: {}",
                    other
                )))
            }
        }
        Ok(())
    }

    fn comrak_options(&self) -> ComrakOptions {
        let mut options = ComrakOptions::default();
        options.render.unsafe_ = true; // Allow raw HTML
        options.extension.table = self.tables;
        options.extension.strikethrough = self.strikethrough;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.footnotes = self.footnotes;
        options.extension.superscript = self.superscript;
        options.extension.description_lists = self.description_lists;
        if self.header_ids {
            options.extension.header_ids = Some(String::new());
        }
        options
    }
}

/// CommonMark parser backed by comrak.
pub struct MarkdownParser {
    options: ComrakOptions,
}

impl MarkdownParser {
    pub fn new(extensions: &MarkdownExtensions) -> Self {
        Self {
            options: extensions.comrak_options(),
        }
    }
}

impl Parser for MarkdownParser {
    fn format(&self) -> &'static str {
        "markdown"
    }

    fn parse(&self, text: &str) -> Result<String> {
        Ok(markdown_to_html(text, &self.options))
    }
}

/// Resolve the parser for a dotted file extension such as `.md`.
///
/// Unknown extensions yield [`RockslideError::UnsupportedFormat`], which
/// callers walking a source tree treat as "skip this file".
pub fn parser_for(extension: &str, extensions: &MarkdownExtensions) -> Result<Box<dyn Parser>> {
    let extension = extension.to_lowercase();
    if MARKDOWN_EXTENSIONS.contains(&extension.as_str()) {
        Ok(Box::new(MarkdownParser::new(extensions)))
    } else {
        Err(RockslideError::UnsupportedFormat(extension))
    }
}
