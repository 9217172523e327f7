// ABOUTME: Slide extraction for the rockslide application
// ABOUTME: Splits parsed HTML on <hr> boundaries and decomposes each fragment into a slide record

use crate::macros::{MacroContext, MacroStage};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static BOUNDARY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<hr(?:\s[^>]*)?/?>").unwrap());

static HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(<h([1-6])(?:\s[^>]*)?>(.+?)</h[1-6]>)\s?(.+)?").unwrap()
});

/// Where a slide came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSource {
    /// Path as reached while walking the sources
    pub rel_path: PathBuf,
    pub abs_path: PathBuf,
}

/// One slide of the presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// Raw heading markup found at the start of the fragment
    pub header: Option<String>,
    pub title: Option<String>,
    pub level: Option<u32>,
    /// Body after the heading, after macro processing. Empty when absent.
    pub content: String,
    pub classes: Vec<String>,
    pub source: Option<SlideSource>,
    /// 1-based position, set by the numbering pass
    pub number: Option<usize>,
}

impl Slide {
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

/// Split a parsed document on its horizontal rules.
///
/// A document without any rule is returned as a single fragment.
pub fn split_fragments(html: &str) -> Vec<&str> {
    BOUNDARY_REGEX.split(html).collect()
}

/// Turn one fragment into a slide record.
///
/// Returns `None` when the fragment has neither a heading nor any content,
/// which is the case for whitespace between two rules.
pub fn extract_slide(
    fragment: &str,
    source: Option<&SlideSource>,
    macros: &MacroStage,
    context: &MacroContext,
) -> Option<Slide> {
    let (header, level, title, content) = match HEADING_REGEX.captures(fragment) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_string()),
            caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()),
            caps.get(3).map(|m| m.as_str().to_string()),
            caps.get(4)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
        ),
        None => (None, None, None, fragment.trim().to_string()),
    };

    // Empty and absent content are the same thing: macros never see it
    let (content, classes) = if content.is_empty() {
        (content, Vec::new())
    } else {
        let abs_path = source.map(|s| s.abs_path.as_path());
        macros.process(&content, abs_path, context)
    };

    if header.is_none() && content.is_empty() {
        return None;
    }

    Some(Slide {
        header,
        title,
        level,
        content,
        classes,
        source: source.cloned(),
        number: None,
    })
}
