//! Command-line interface for codescan.

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use tracing::info;

use crate::config::AnalyzerConfig;
use crate::report::{self, OutputFormat};
use crate::scan::Analyzer;
use crate::summary::summarize;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Source-code intelligence for Go trees.
///
/// Codescan extracts functions, types, globals and imports from every Go
/// file under a directory, builds the call graph, and reports complexity,
/// maintainability, recursion, duplicates and dead code.
#[derive(Parser)]
#[command(name = "codescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a source tree
    Analyze(AnalyzeArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Root directory to analyze
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover in the root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Emit the aggregate summary instead of the full report
    #[arg(short, long)]
    pub summary: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether debug logging was requested.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Analyze(args) => args.verbose,
        }
    }
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    // Validate format
    let Some(format) = OutputFormat::parse(&args.format) else {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    };

    // Resolve path
    let root = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };
    if !root.is_dir() {
        eprintln!("Error: not a directory: {}", root.display());
        return Ok(EXIT_ERROR);
    }

    // Load config, or discover one in the root
    let config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => match AnalyzerConfig::discover(&root)? {
            Some((config, path)) => {
                info!(config = %path.display(), "using discovered config");
                config
            }
            None => AnalyzerConfig::default(),
        },
    };

    let analyzer = Analyzer::new(config)?;
    let report = analyzer.analyze(&root)?;

    let path_str = args.path.to_string_lossy().to_string();
    match (format, args.summary) {
        (OutputFormat::Json, true) => report::write_json(&summarize(&report))?,
        (OutputFormat::Json, false) => report::write_json(&report)?,
        (OutputFormat::Pretty, summary_only) => {
            report::write_pretty(&mut io::stdout().lock(), &path_str, &report, summary_only)?
        }
    }

    Ok(EXIT_SUCCESS)
}
