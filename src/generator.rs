// ABOUTME: Presentation generator for the rockslide application
// ABOUTME: Wires walker, extractor, macros, numbering and TOC into template variables and output files

use crate::config::Config;
use crate::errors::{RockslideError, Result};
use crate::html;
use crate::logging::{LogSink, Logger};
use crate::macros::{Macro, MacroContext, MacroStage};
use crate::parser::MarkdownExtensions;
use crate::pdf::{self, PdfConfig};
use crate::resources::{self, Asset, ResourceFile};
use crate::slide::Slide;
use crate::theme::{Theme, ThemeCss};
use crate::toc::{Toc, TocBuilder, TOC_MAX_LEVEL};
use crate::utils;
use crate::walker::ContentWalker;
use encoding_rs::Encoding;
use std::path::{Path, PathBuf};

/// Page title used when the first slide has no title
pub const UNTITLED: &str = "Untitled Presentation";

/// Output format, chosen by the destination extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Html,
    Pdf,
}

impl FileType {
    pub fn from_destination(destination: &Path) -> Result<Self> {
        match utils::dotted_extension(destination).as_str() {
            ".html" => Ok(FileType::Html),
            ".pdf" => Ok(FileType::Pdf),
            _ => Err(RockslideError::UnsupportedDestination(
                destination.to_path_buf(),
            )),
        }
    }
}

/// Variables handed to the HTML renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub head_title: String,
    pub num_slides: usize,
    pub slides: Vec<Slide>,
    pub toc: Toc,
    pub embed: bool,
    pub css: ThemeCss,
    pub js: Asset,
    pub user_css: Vec<Asset>,
    pub user_js: Vec<Asset>,
}

/// Numbered slides with their outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSlides {
    pub head_title: String,
    pub slides: Vec<Slide>,
    pub toc: Toc,
}

/// Number present slides from 1 in order and build the table of contents.
///
/// Absent records are dropped without consuming a number. Slides with a
/// heading level up to [`TOC_MAX_LEVEL`] get a TOC entry.
pub fn assign_and_index(records: Vec<Option<Slide>>) -> IndexedSlides {
    let mut toc = TocBuilder::new();
    let mut slides = Vec::with_capacity(records.len());

    for mut slide in records.into_iter().flatten() {
        let number = slides.len() + 1;
        slide.number = Some(number);
        if let (Some(level), Some(title)) = (slide.level, slide.title.as_deref()) {
            if level <= TOC_MAX_LEVEL {
                toc.record(title, level, number);
            }
        }
        slides.push(slide);
    }

    let head_title = slides
        .first()
        .and_then(|slide| slide.title.clone())
        .unwrap_or_else(|| UNTITLED.to_string());

    IndexedSlides {
        head_title,
        slides,
        toc: toc.build(),
    }
}

/// Builds one presentation from a validated configuration.
///
/// Construction performs every configuration check, so any error it returns
/// happens before a single source file is read.
pub struct Generator {
    sources: Vec<PathBuf>,
    destination: PathBuf,
    file_type: FileType,
    direct: bool,
    encoding: &'static Encoding,
    extensions: MarkdownExtensions,
    theme: Theme,
    macros: MacroStage,
    macro_context: MacroContext,
    user_css: Vec<ResourceFile>,
    user_js: Vec<ResourceFile>,
    pdf_config: PdfConfig,
}

impl Generator {
    pub fn new(config: Config, sink: Option<LogSink>) -> Result<Self> {
        if config.sources.is_empty() {
            return Err(RockslideError::ConfigError(
                "no source file or directory given".to_string(),
            ));
        }
        for source in &config.sources {
            if !source.exists() {
                return Err(RockslideError::ConfigError(format!(
                    "Source file/directory {:?} does not exist",
                    source
                )));
            }
        }

        utils::validate_destination(&config.destination)?;
        let file_type = FileType::from_destination(&config.destination)?;
        if config.direct && file_type == FileType::Pdf {
            return Err(RockslideError::ConfigError(
                "Direct output mode is not available for PDF export".to_string(),
            ));
        }

        let encoding = Encoding::for_label(config.encoding.trim().as_bytes()).ok_or_else(|| {
            RockslideError::ConfigError(format!("Unknown encoding: {}", config.encoding))
        })?;

        let extensions = MarkdownExtensions::from_names(&config.extensions)?;

        let theme = Theme::find(&config.theme)?;

        let macros = match &config.macros {
            Some(names) => MacroStage::with_names(names)?,
            None => MacroStage::with_defaults(),
        };

        let user_css = resources::collect_resources(&config.css)?;
        let user_js = resources::collect_resources(&config.js)?;

        let verbose = config.verbose || config.direct;
        let embed = config.embed || file_type == FileType::Pdf;

        Ok(Self {
            sources: config.sources,
            destination: config.destination,
            file_type,
            direct: config.direct,
            encoding,
            extensions,
            theme,
            macros,
            macro_context: MacroContext {
                logger: Logger::new(sink, verbose),
                embed,
            },
            user_css,
            user_js,
            pdf_config: PdfConfig {
                browser_path: config.browser_path,
                ..PdfConfig::default()
            },
        })
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn embed(&self) -> bool {
        self.macro_context.embed
    }

    fn logger(&self) -> &Logger {
        &self.macro_context.logger
    }

    /// Append a custom macro after the configured ones
    pub fn register_macro<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn(&MacroContext) -> Box<dyn Macro> + 'static,
    {
        self.macros.register(name, factory)
    }

    /// Walk every source and return one entry per slide fragment
    pub fn fetch_contents(&self) -> Result<Vec<Option<Slide>>> {
        ContentWalker::new(
            self.encoding,
            &self.extensions,
            &self.macros,
            &self.macro_context,
        )
        .walk_all(&self.sources)
    }

    /// Number the slides, build the TOC and load every asset
    pub fn template_vars(&self, records: Vec<Option<Slide>>) -> Result<TemplateVars> {
        let IndexedSlides {
            head_title,
            slides,
            toc,
        } = assign_and_index(records);
        let embed = self.embed();

        Ok(TemplateVars {
            head_title,
            num_slides: slides.len(),
            slides,
            toc,
            embed,
            css: self.theme.css(self.logger())?,
            js: self.theme.js()?,
            user_css: self
                .user_css
                .iter()
                .map(|r| r.load(embed))
                .collect::<Result<_>>()?,
            user_js: self
                .user_js
                .iter()
                .map(|r| r.load(embed))
                .collect::<Result<_>>()?,
        })
    }

    /// Render the whole presentation to HTML
    pub fn render(&self) -> Result<String> {
        let records = self.fetch_contents()?;
        let vars = self.template_vars(records)?;
        Ok(html::render_html(&vars))
    }

    /// Render and write the destination file
    pub fn write(&self) -> Result<()> {
        let html = self.render()?;
        match self.file_type {
            FileType::Html => html::write_html_to_file(&html, &self.destination),
            FileType::Pdf => pdf::write_pdf(&html, &self.destination, &self.pdf_config),
        }
    }

    /// Write the destination, or print the HTML in direct mode
    pub fn execute(&self) -> Result<()> {
        if self.direct {
            println!("{}", self.render()?);
        } else {
            self.write()?;
            self.logger().notice(&format!(
                "Generated file: {}",
                self.destination.display()
            ));
        }
        Ok(())
    }
}
