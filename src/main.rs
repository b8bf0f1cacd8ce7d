use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use datafinder::config::Config;
use datafinder::logging::init_logging;
use datafinder::positions::{parse_classifier_arg, parse_pattern_arg};
use datafinder::{DataFinder, PositionRule, RegexPositions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, Level};

/// datafinder - find files and extract metadata from their paths
#[derive(Parser, Debug)]
#[command(name = "datafinder")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Glob pattern applied at every depth below each folder (e.g. "*.tif")
    pattern: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root candidate (can be repeated; first existing directory wins)
    #[arg(short, long = "root", value_name = "PATH")]
    roots: Vec<String>,

    /// Folder to search, relative to the root or absolute (can be repeated)
    #[arg(short, long = "folder", value_name = "PATH")]
    folders: Vec<String>,

    /// Fail when a folder does not exist instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Extraction rule POS=REGEX; named groups become columns (can be repeated)
    #[arg(short = 'x', long = "extract", value_name = "POS=REGEX")]
    extract: Vec<String>,

    /// Classifier candidate POS:LABEL=REGEX, sets the info column (can be repeated)
    #[arg(long = "classify", value_name = "POS:LABEL=REGEX")]
    classify: Vec<String>,

    /// Keep files whose extraction rules do not match
    #[arg(long)]
    keep_unmatched: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Enable verbose logging and query narration
    #[arg(short, long)]
    verbose: bool,

    /// Generate a template configuration file and exit
    #[arg(long, value_name = "FILE")]
    init: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Tab-separated values with a header row
    Table,
    /// JSON array of row objects
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_logging(log_level)?;

    if let Some(init_path) = args.init {
        let path = if init_path.as_os_str().is_empty() {
            PathBuf::from("datafinder.toml")
        } else {
            init_path
        };

        if path.exists() {
            anyhow::bail!(
                "Config file already exists: {}\nRemove it first or choose a different path.",
                path.display()
            );
        }

        Config::write_template(&path)?;
        println!("Generated config file: {}", path.display());
        return Ok(());
    }

    let config = load_config(&args)?;

    let pattern = config
        .query
        .pattern
        .clone()
        .context("No search pattern given on the command line or in the config file")?;

    let mut finder = DataFinder::with_root(config.finder.root_candidates())?;
    let strict = args.strict || config.finder.strict;
    finder.add_folders(&config.finder.folders, None, strict)?;

    info!(
        root = %finder.root().display(),
        folders_count = finder.folders().len(),
        "Configuration loaded"
    );

    let mut options = config.query.options(args.verbose)?;
    options.positions.extend(cli_positions(&args)?);
    if args.keep_unmatched {
        options.require_match = false;
    }

    let table = finder.query(&pattern, &options)?;
    info!(rows = table.len(), "Query complete");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Table => table.write_tsv(&mut out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &table)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let base_config = if let Some(ref config_path) = args.config {
        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found: {}\nUse --init {} to generate a template.",
                config_path.display(),
                config_path.display()
            );
        }
        info!(path = %config_path.display(), "Loading config from file");
        Config::from_file(config_path)?
    } else {
        match Config::from_default_locations()? {
            Some((config, path)) => {
                info!(path = %path.display(), "Loading config from default location");
                config
            }
            None => Config::default(),
        }
    };

    Ok(base_config.with_overrides(
        args.roots.clone(),
        args.folders.clone(),
        args.pattern.clone(),
    ))
}

/// Position rules from `--extract` and `--classify`. Classifier candidates
/// for the same position are grouped in argument order.
fn cli_positions(args: &Args) -> Result<RegexPositions> {
    let mut positions = RegexPositions::new();

    for arg in &args.extract {
        let (position, pattern) = parse_pattern_arg(arg)?;
        positions.insert(position, PositionRule::Pattern(pattern));
    }

    for arg in &args.classify {
        let (position, label, pattern) = parse_classifier_arg(arg)?;
        positions.push_class(position, label, pattern);
    }

    Ok(positions)
}
