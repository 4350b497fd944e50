//! Boxwire CLI
//!
//! Usage:
//!   boxwire [OPTIONS] [FILE]
//!
//! Options:
//!   -o, --output <FILE>      Write SVG here instead of stdout
//!   -s, --stylesheet <FILE>  Stylesheet with font, spacing and colours (TOML)
//!   --title <TEXT>           Title embedded in the SVG
//!   --log-level <LEVEL>      off, error, warn, info, debug or trace
//!   --check                  Only parse and validate
//!   -h, --help               Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::Parser;
use log::{debug, info, LevelFilter};

use boxwire::{parse, render_with_config, Diagnostic, RenderConfig, Stylesheet, SvgConfig};

#[derive(Parser, Debug)]
#[command(name = "boxwire", version)]
#[command(about = "Nested box diagrams with routed connectors, from plain text")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Output SVG file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stylesheet file for font, spacing and colours (TOML format)
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Title embedded in the SVG document
    #[arg(long)]
    title: Option<String>,

    /// Only parse and validate; exit with an error status if anything is wrong
    #[arg(long)]
    check: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!(cli:?; "Parsed arguments");

    let filename = cli
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    if cli.check {
        let parsed = parse(&source);
        report(&parsed.diagnostics, &source, &filename);
        if parsed.has_errors() {
            process::exit(1);
        }
        info!(file = filename; "No problems found");
        return;
    }

    let stylesheet = match &cli.stylesheet {
        Some(path) => match Stylesheet::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Stylesheet::default(),
    };

    let mut svg = SvgConfig::default();
    if let Some(title) = &cli.title {
        svg = svg.with_title(title.as_str());
    }
    let config = RenderConfig::new().with_stylesheet(stylesheet).with_svg(svg);
    let rendered = render_with_config(&source, config);
    report(&rendered.diagnostics, &source, &filename);

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &rendered.svg) {
                eprintln!("Error writing '{}': {}", path.display(), e);
                process::exit(1);
            }
            info!(output_file = path.display().to_string(); "SVG written");
        }
        None => println!("{}", rendered.svg),
    }
}

/// Print diagnostics with source context to stderr
fn report(diagnostics: &[Diagnostic], source: &str, filename: &str) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic.format(source, filename));
    }
}
