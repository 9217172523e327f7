// ABOUTME: HTML rendering module for the rockslide application
// ABOUTME: Renders the template variables into a standalone or linked slideshow document

use crate::errors::{RockslideError, Result};
use crate::generator::TemplateVars;
use crate::resources::Asset;
use crate::slide::Slide;
use crate::toc::{Toc, TocEntry};
use crate::utils;
use log::info;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Escape text for use in element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Plain text of an HTML snippet, e.g. a heading used as the page title
pub fn strip_tags(html: &str) -> String {
    TAG_REGEX.replace_all(html, "").trim().to_string()
}

fn push_css(html_doc: &mut String, asset: &Asset, media: Option<&str>, embed: bool) {
    let media = media
        .map(|m| format!(" media=\"{}\"", m))
        .unwrap_or_default();
    if embed || asset.path_url.is_empty() {
        html_doc.push_str(&format!("<style{}>\n{}\n</style>\n", media, asset.contents));
    } else {
        html_doc.push_str(&format!(
            "<link rel=\"stylesheet\"{} href=\"{}\">\n",
            media,
            escape_html(&asset.path_url)
        ));
    }
}

fn push_js(html_doc: &mut String, asset: &Asset, embed: bool) {
    if embed || asset.path_url.is_empty() {
        html_doc.push_str(&format!("<script>\n{}\n</script>\n", asset.contents));
    } else {
        html_doc.push_str(&format!(
            "<script src=\"{}\"></script>\n",
            escape_html(&asset.path_url)
        ));
    }
}

fn push_toc_entries(html_doc: &mut String, entries: &[TocEntry]) {
    html_doc.push_str("<ul>\n");
    for entry in entries {
        html_doc.push_str("<li>");
        if let Some(number) = entry.number {
            html_doc.push_str(&format!(
                "<a href=\"#slide{}\" title=\"{}\">{}</a>",
                number,
                escape_html(&strip_tags(&entry.title)),
                entry.title
            ));
        }
        if !entry.sub.is_empty() {
            html_doc.push('\n');
            push_toc_entries(html_doc, &entry.sub);
        }
        html_doc.push_str("</li>\n");
    }
    html_doc.push_str("</ul>\n");
}

fn push_toc(html_doc: &mut String, toc: &Toc) {
    if toc.is_empty() {
        return;
    }
    html_doc.push_str("<nav id=\"toc\">\n<h2>Table of Contents</h2>\n");
    push_toc_entries(html_doc, toc.entries());
    html_doc.push_str("</nav>\n");
}

fn push_slide(html_doc: &mut String, slide: &Slide, num_slides: usize, embed: bool) {
    let number = slide.number.unwrap_or_default();
    let mut classes = vec!["slide".to_string()];
    classes.extend(slide.classes.iter().cloned());

    html_doc.push_str(&format!(
        "<div class=\"{}\" id=\"slide{}\">\n<div class=\"inner\">\n",
        escape_html(&classes.join(" ")),
        number
    ));
    if let Some(header) = &slide.header {
        html_doc.push_str(&format!("<header>{}</header>\n", header));
    }
    if slide.has_content() {
        html_doc.push_str(&format!("<section>\n{}\n</section>\n", slide.content));
    }
    html_doc.push_str("</div>\n<aside class=\"source\">");

    // Absolute local paths are meaningless once the document is standalone
    if let Some(source) = &slide.source {
        let rel = escape_html(&source.rel_path.display().to_string());
        if embed {
            html_doc.push_str(&format!("<span class=\"path\">{}</span>", rel));
        } else {
            let href = url::Url::from_file_path(&source.abs_path)
                .map(|u| u.to_string())
                .unwrap_or_default();
            html_doc.push_str(&format!(
                "<a class=\"path\" href=\"{}\">{}</a>",
                escape_html(&href),
                rel
            ));
        }
    }
    html_doc.push_str(&format!(
        "<span class=\"page_number\">{}/{}</span></aside>\n</div>\n",
        number, num_slides
    ));
}

/// Render the complete slideshow document
pub fn render_html(vars: &TemplateVars) -> String {
    let mut html_doc = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html_doc.push_str("<meta charset=\"UTF-8\">\n");
    html_doc.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html_doc.push_str(&format!(
        "<title>{}</title>\n",
        escape_html(&strip_tags(&vars.head_title))
    ));

    push_css(&mut html_doc, &vars.css.print, Some("print"), vars.embed);
    if let Some(screen) = &vars.css.screen {
        push_css(&mut html_doc, screen, Some("screen, projection"), vars.embed);
    }
    for css in &vars.user_css {
        push_css(&mut html_doc, css, None, vars.embed);
    }

    html_doc.push_str("</head>\n<body>\n");
    push_toc(&mut html_doc, &vars.toc);

    html_doc.push_str(&format!(
        "<div class=\"slides\" data-count=\"{}\">\n",
        vars.num_slides
    ));
    for slide in &vars.slides {
        push_slide(&mut html_doc, slide, vars.num_slides, vars.embed);
    }
    html_doc.push_str("</div>\n");

    push_js(&mut html_doc, &vars.js, vars.embed);
    for js in &vars.user_js {
        push_js(&mut html_doc, js, vars.embed);
    }

    html_doc.push_str("</body>\n</html>\n");
    html_doc
}

/// Utility function to write HTML content to a file
pub fn write_html_to_file(html_content: &str, output_path: &Path) -> Result<()> {
    info!("Writing HTML to file: {:?}", output_path);

    // Ensure parent directory exists
    utils::ensure_parent_directory_exists(output_path)?;

    // Rust strings are UTF-8 already
    fs::write(output_path, html_content).map_err(RockslideError::FileReadError)?;

    Ok(())
}
