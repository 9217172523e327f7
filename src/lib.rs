// ABOUTME: Library module for the rockslide program.
// ABOUTME: Turns trees of Markdown files into numbered slides, a table of contents and HTML/PDF output.

// Reexport modules
pub mod config;
pub mod errors;
pub mod generator;
pub mod html;
pub mod logging;
pub mod macros;
pub mod parser;
pub mod pdf;
pub mod resources;
pub mod slide;
pub mod theme;
pub mod toc;
pub mod utils;
pub mod walker;
pub mod watch;

// Reexport common types and functions
pub use config::Config;
pub use errors::{Result, RockslideError};
pub use generator::{assign_and_index, FileType, Generator, IndexedSlides, TemplateVars};
pub use html::{render_html, write_html_to_file};
pub use logging::{LogSink, Logger};
pub use macros::{BuiltinMacro, Macro, MacroContext, MacroStage};
pub use parser::{parser_for, MarkdownExtensions, Parser};
pub use resources::{Asset, ResourceFile};
pub use slide::{extract_slide, split_fragments, Slide, SlideSource};
pub use theme::Theme;
pub use toc::{Toc, TocBuilder, TocEntry, TOC_MAX_LEVEL};
pub use walker::ContentWalker;
pub use watch::{watch_sources, ConfigLoader, WatchConfig};
