// ABOUTME: Code highlighting macro for the rockslide application
// ABOUTME: Highlights `<pre><code>` blocks tagged with a language using comrak's syntect adapter

use super::{Macro, MacroContext};
use crate::errors::{RockslideError, Result};
use crate::logging::Logger;
use comrak::adapters::SyntaxHighlighterAdapter;
use comrak::plugins::syntect::{SyntectAdapter, SyntectAdapterBuilder};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static CODE_BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre(?:\s[^>]*)?>\s?<code(?:\s+class="language-([^"\s]+)")?[^>]*>(.*?)</code>\s?</pre>"#)
        .unwrap()
});

// `!lang` on the first line of an untagged block
static BANG_LANG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s?!(\S+?)\r?\n").unwrap());

static HTML_ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|\w+);").unwrap());

const HIGHLIGHT_THEME: &str = "InspiredGitHub";

/// Undo the entity escaping done by the markup parser.
fn unescape_html(code: &str) -> String {
    HTML_ENTITY_REGEX
        .replace_all(code, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if entity.starts_with("#x") => u32::from_str_radix(&entity[2..], 16)
                    .ok()
                    .and_then(char::from_u32),
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Syntax highlighting for code blocks.
///
/// A block is highlighted when its `<code>` tag has a `language-*` class, or
/// when the code starts with a `!lang` line (which is then dropped).
/// Blocks without a language are left alone.
pub struct CodeHighlightingMacro {
    logger: Logger,
}

impl CodeHighlightingMacro {
    pub fn new(context: &MacroContext) -> Self {
        Self {
            logger: context.logger.clone(),
        }
    }

    fn adapter() -> SyntectAdapter {
        SyntectAdapterBuilder::new().theme(HIGHLIGHT_THEME).build()
    }

    fn highlight(&self, adapter: &SyntectAdapter, lang: &str, code: &str) -> Result<String> {
        let mut output: Vec<u8> = Vec::new();
        let mut attributes = HashMap::new();
        attributes.insert("class".to_string(), format!("language-{}", lang));

        adapter.write_pre_tag(&mut output, HashMap::new())?;
        adapter.write_code_tag(&mut output, attributes)?;
        adapter.write_highlighted(&mut output, Some(lang), code)?;
        output.extend_from_slice(b"</code></pre>");

        String::from_utf8(output)
            .map_err(|e| RockslideError::macro_error(self.name(), e.to_string()))
    }
}

impl Macro for CodeHighlightingMacro {
    fn name(&self) -> &'static str {
        "code"
    }

    fn process(&self, content: &str, source: Option<&Path>) -> Result<(String, Vec<String>)> {
        if !CODE_BLOCK_REGEX.is_match(content) {
            return Ok((content.to_string(), Vec::new()));
        }

        let adapter = Self::adapter();
        let mut new_content = String::with_capacity(content.len());
        let mut last = 0;
        let mut highlighted = 0;

        for caps in CODE_BLOCK_REGEX.captures_iter(content) {
            let Some(block) = caps.get(0) else { continue };
            let raw_code = &caps[2];

            let (lang, code) = match caps.get(1) {
                Some(lang) => (lang.as_str().to_string(), raw_code),
                None => match BANG_LANG_REGEX.captures(raw_code) {
                    Some(bang) => {
                        let skip = bang.get(0).map(|m| m.end()).unwrap_or(0);
                        (bang[1].to_string(), &raw_code[skip..])
                    }
                    None => continue,
                },
            };

            let pretty = self.highlight(&adapter, &lang, &unescape_html(code))?;
            new_content.push_str(&content[last..block.start()]);
            new_content.push_str(&pretty);
            last = block.end();
            highlighted += 1;
        }

        if highlighted == 0 {
            return Ok((content.to_string(), Vec::new()));
        }
        new_content.push_str(&content[last..]);

        self.logger.notice(&format!(
            "Highlighted {} code block(s) in {}",
            highlighted,
            source
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<unknown source>".to_string())
        ));
        Ok((new_content, vec!["has_code".to_string()]))
    }
}
