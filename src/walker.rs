// ABOUTME: Source walker for the rockslide application
// ABOUTME: Recursively visits files and directories in sorted order and yields slide records

use crate::errors::{RockslideError, Result};
use crate::logging::Logger;
use crate::macros::{MacroContext, MacroStage};
use crate::parser::{self, MarkdownExtensions};
use crate::slide::{self, Slide, SlideSource};
use crate::utils;
use encoding_rs::Encoding;
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Walks source trees and turns every supported file into slide records.
///
/// The returned sequence keeps one entry per fragment, `None` for fragments
/// that produced nothing, so callers see the exact traversal order.
pub struct ContentWalker<'a> {
    encoding: &'static Encoding,
    extensions: &'a MarkdownExtensions,
    macros: &'a MacroStage,
    context: &'a MacroContext,
}

impl<'a> ContentWalker<'a> {
    pub fn new(
        encoding: &'static Encoding,
        extensions: &'a MarkdownExtensions,
        macros: &'a MacroStage,
        context: &'a MacroContext,
    ) -> Self {
        Self {
            encoding,
            extensions,
            macros,
            context,
        }
    }

    fn logger(&self) -> &Logger {
        &self.context.logger
    }

    /// Walk several sources, concatenating their slides in the given order.
    pub fn walk_all<P: AsRef<Path>>(&self, sources: &[P]) -> Result<Vec<Option<Slide>>> {
        let mut slides = Vec::new();
        for source in sources {
            slides.extend(self.walk(source.as_ref())?);
        }
        Ok(slides)
    }

    /// Walk a single file or directory.
    pub fn walk(&self, source: &Path) -> Result<Vec<Option<Slide>>> {
        self.visit(source, &mut HashSet::new())
    }

    // `seen` holds the canonical directories on the current walk, so a
    // symlink pointing back up the tree is entered only once
    fn visit(&self, source: &Path, seen: &mut HashSet<PathBuf>) -> Result<Vec<Option<Slide>>> {
        let slides = if source.is_dir() {
            let canonical = utils::get_absolute_path(source)?;
            if !seen.insert(canonical) {
                self.logger().warning(&format!(
                    "Skipping {}: directory already visited",
                    source.display()
                ));
                return Ok(Vec::new());
            }
            self.walk_directory(source, seen)?
        } else {
            self.walk_file(source)?
        };

        if slides.is_empty() {
            self.logger()
                .notice(&format!("Exiting  {}: no contents found", source.display()));
        }
        Ok(slides)
    }

    fn walk_directory(
        &self,
        dir: &Path,
        seen: &mut HashSet<PathBuf>,
    ) -> Result<Vec<Option<Slide>>> {
        self.logger()
            .notice(&format!("Entering {}", dir.display()));

        let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut slides = Vec::new();
        for entry in entries {
            slides.extend(self.visit(&entry, seen)?);
        }
        Ok(slides)
    }

    fn walk_file(&self, path: &Path) -> Result<Vec<Option<Slide>>> {
        let parser = match parser::parser_for(&utils::dotted_extension(path), self.extensions) {
            Ok(parser) => parser,
            Err(RockslideError::UnsupportedFormat(ext)) => {
                debug!("Skipping {:?}: unsupported format {:?}", path, ext);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        self.logger()
            .notice(&format!("Adding   {} ({})", path.display(), parser.format()));

        let text = match self.read_source(path) {
            Ok(text) => text,
            Err(e @ RockslideError::DecodeError { .. }) => {
                self.logger()
                    .warning(&format!("{}: skipping", e));
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let html = parser.parse(&text)?;
        let source = SlideSource {
            rel_path: path.to_path_buf(),
            abs_path: utils::get_absolute_path(path)?,
        };

        Ok(slide::split_fragments(&html)
            .into_iter()
            .map(|fragment| slide::extract_slide(fragment, Some(&source), self.macros, self.context))
            .collect())
    }

    fn read_source(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;
        let (encoding, body) = match Encoding::for_bom(&bytes) {
            Some((encoding, bom_length)) => (encoding, &bytes[bom_length..]),
            None => (self.encoding, &bytes[..]),
        };

        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| text.into_owned())
            .ok_or_else(|| RockslideError::DecodeError {
                path: path.to_path_buf(),
                encoding: encoding.name().to_string(),
            })
    }
}
