// ABOUTME: Main entry point for the rockslide program.
// ABOUTME: Provides the CLI interface and runs the generator or watch mode from the library.

use clap::Parser;
use rockslide::logging::{stderr_sink, LogSink};
use rockslide::{Config, Generator, WatchConfig};
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source file, directory or presentation file (.cfg/.toml)
    source: PathBuf,

    /// Path to the output file (.html or .pdf)
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Theme name or path to a theme directory
    #[arg(short, long)]
    theme: Option<String>,

    /// Embed stylesheets, scripts and images into a standalone document
    #[arg(short = 'i', long)]
    embed: bool,

    /// Encoding of the source files
    #[arg(short, long)]
    encoding: Option<String>,

    /// Comma separated list of Markdown extensions to enable
    #[arg(short = 'x', long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Print the generated HTML to stdout instead of writing a file
    #[arg(short = 'o', long)]
    direct: bool,

    /// Report progress while generating
    #[arg(short, long)]
    verbose: bool,

    /// Show debug diagnostics
    #[arg(long)]
    debug: bool,

    /// Additional CSS files to include (local paths or URLs)
    #[arg(long, value_delimiter = ',')]
    css: Option<Vec<String>>,

    /// Additional JavaScript files to include (local paths or URLs)
    #[arg(long, value_delimiter = ',')]
    js: Option<Vec<String>>,

    /// Macros to apply, in order (code, embed_images, fix_image_paths, fx, notes, qr)
    #[arg(long, value_delimiter = ',')]
    macros: Option<Vec<String>>,

    /// Regenerate the presentation when sources change
    #[arg(short, long)]
    watch: bool,

    /// Serve the generated presentation while watching
    #[arg(long, requires = "watch")]
    serve: bool,

    /// Port for the local web server
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl Cli {
    /// Command line flags override the presentation file and environment
    fn apply(&self, config: &mut Config) {
        if let Some(destination) = &self.destination {
            config.destination = destination.clone();
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(encoding) = &self.encoding {
            config.encoding = encoding.clone();
        }
        if let Some(extensions) = &self.extensions {
            config.extensions = extensions.clone();
        }
        if let Some(css) = &self.css {
            config.css.extend(css.iter().cloned());
        }
        if let Some(js) = &self.js {
            config.js.extend(js.iter().cloned());
        }
        if let Some(macros) = &self.macros {
            config.macros = Some(macros.clone());
        }
        config.embed |= self.embed;
        config.direct = self.direct;
        config.verbose |= self.verbose;
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.debug {
        log::LevelFilter::Debug
    } else if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

/// Defaults, environment and presentation file, then the command line
fn load_config(cli: &Cli) -> rockslide::Result<Config> {
    let mut config = Config::load(&cli.source)?;
    cli.apply(&mut config);
    Ok(config)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let sink: Option<LogSink> = Some(stderr_sink());

    if cli.watch {
        let mut watch_config = WatchConfig::new(config);
        watch_config.serve = cli.serve;
        watch_config.port = cli.port;
        if Config::is_config_file(&cli.source) {
            watch_config.config_file = Some(cli.source.clone());
        }
        let reload_cli = cli.clone();
        watch_config.loader = Some(Box::new(move || load_config(&reload_cli)));
        rockslide::watch_sources(watch_config, sink)?;
    } else {
        Generator::new(config, sink)?.execute()?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
