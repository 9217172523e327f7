// ABOUTME: Paragraph marker macros: `.fx:`, `.notes:` and `.qr:`
// ABOUTME: Turn marker paragraphs into slide classes, speaker notes and QR code images

use super::Macro;
use crate::errors::Result;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;
use url::form_urlencoded;

static FX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p>\.fx:\s?(.*?)</p>\n?").unwrap());

static NOTES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p>\.notes:\s?(.*?)</p>").unwrap());

static QR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p>\.qr:\s?(\d*?)\|(.*?)</p>").unwrap());

const QR_SERVICE_URL: &str = "https://chart.googleapis.com/chart";
const QR_DEFAULT_SIZE: &str = "200";

/// Moves the first `.fx:` paragraph into the slide's classes.
pub struct FxMacro;

impl Macro for FxMacro {
    fn name(&self) -> &'static str {
        "fx"
    }

    fn process(&self, content: &str, _source: Option<&Path>) -> Result<(String, Vec<String>)> {
        let Some(found) = FX_REGEX.captures(content) else {
            return Ok((content.to_string(), Vec::new()));
        };

        let classes = found[1].split_whitespace().map(str::to_string).collect();
        let whole = found.get(0).map(|m| m.range()).unwrap_or(0..0);

        let mut new_content = String::with_capacity(content.len());
        new_content.push_str(&content[..whole.start]);
        new_content.push_str(&content[whole.end..]);
        Ok((new_content, classes))
    }
}

/// Marks `.notes:` paragraphs as speaker notes.
pub struct NotesMacro;

impl Macro for NotesMacro {
    fn name(&self) -> &'static str {
        "notes"
    }

    fn process(&self, content: &str, _source: Option<&Path>) -> Result<(String, Vec<String>)> {
        if !NOTES_REGEX.is_match(content) {
            return Ok((content.to_string(), Vec::new()));
        }
        let new_content = NOTES_REGEX
            .replace_all(content, r#"<p class="notes">$1</p>"#)
            .into_owned();
        Ok((new_content, vec!["has_notes".to_string()]))
    }
}

/// Renders `.qr: SIZE|DATA` paragraphs as QR code images.
pub struct QrMacro;

impl QrMacro {
    fn image_paragraph(caps: &Captures) -> String {
        let size = match &caps[1] {
            "" => QR_DEFAULT_SIZE,
            size => size,
        };
        let data: String = form_urlencoded::byte_serialize(caps[2].trim().as_bytes()).collect();
        format!(
            r#"<p class="qr"><img src="{url}?chs={size}x{size}&amp;cht=qr&amp;chl={data}&amp;chf=bg,s,00000000&amp;choe=UTF-8" alt="QR Code" /></p>"#,
            url = QR_SERVICE_URL,
            size = size,
            data = data
        )
    }
}

impl Macro for QrMacro {
    fn name(&self) -> &'static str {
        "qr"
    }

    fn process(&self, content: &str, _source: Option<&Path>) -> Result<(String, Vec<String>)> {
        if !QR_REGEX.is_match(content) {
            return Ok((content.to_string(), Vec::new()));
        }
        let new_content = QR_REGEX
            .replace_all(content, |caps: &Captures| Self::image_paragraph(caps))
            .into_owned();
        Ok((new_content, vec!["has_qr".to_string()]))
    }
}
