//! samefile - find duplicate files by content.
//!
//! Usage:
//!   samefile [PATH]                          Scan PATH (default: current directory)
//!   samefile --ext-sensitive false [PATH]    Let files of any allowed extension match
//!   samefile --extensions png,gif [PATH]     Override the extension allow-list
//!   samefile --format json [PATH]            Print the report as JSON
//!   samefile --help                          Show help

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use samefile_analyze::{DuplicateFinder, DuplicateReport, FinderConfig};

#[derive(Parser)]
#[command(
    name = "samefile",
    version,
    about = "Find duplicate files by content",
    long_about = "samefile finds files with identical content under a directory tree.\n\n\
                  Files are first grouped by size (and, by default, extension); only \
                  files sharing that trait with another file are read and hashed with SHA-256."
)]
struct Cli {
    /// Directory to scan (defaults to the current directory)
    path: Option<PathBuf>,

    /// Comma-separated extension allow-list (default: common JPEG and RAW suffixes)
    #[arg(short, long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Whether the extension must match for files to be considered duplicates
    #[arg(long, env = "SAMEFILE_EXT_SENSITIVE")]
    ext_sensitive: Option<bool>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Follow symbolic links while walking
    #[arg(long)]
    follow_symlinks: bool,

    /// Threads used for directory walking (0 = auto)
    #[arg(long)]
    threads: Option<usize>,

    /// Maximum number of files read at the same time
    #[arg(long)]
    max_concurrent_hashes: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Merge the optional config file with command-line overrides.
    fn finder_config(&self) -> Result<FinderConfig> {
        let mut config = match &self.config {
            Some(path) => FinderConfig::from_toml_file(path)
                .wrap_err_with(|| format!("Failed to load {}", path.display()))?,
            None => FinderConfig::new(std::env::current_dir().context("No current directory")?),
        };

        if let Some(path) = &self.path {
            config.root = path.clone();
        }
        if let Some(extensions) = &self.extensions {
            config.extensions = extensions.clone();
        }
        if let Some(sensitive) = self.ext_sensitive {
            config.extension_sensitive = sensitive;
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(max) = self.max_concurrent_hashes {
            config.max_concurrent_hashes = max;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();
    let config = cli.finder_config()?;

    let finder = DuplicateFinder::new(config);
    let report = finder.run().await.context("Duplicate search failed")?;

    match cli.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_report(report: &DuplicateReport) {
    println!();
    println!("{}", "─".repeat(70));
    println!(" Duplicate File Report");
    println!("{}", "─".repeat(70));
    println!();

    println!(
        " Scanned {} files, hashed {} ({} unreadable)",
        report.files_scanned, report.hash_requests, report.hash_failures
    );

    if !report.has_duplicates() {
        println!(" No duplicate files found.");
        return;
    }

    println!(
        " Found {} duplicate groups ({} files)",
        report.group_count(),
        report.duplicated_files()
    );
    println!(
        " Total wasted space: {}",
        format_size(report.total_wasted_space())
    );
    println!();

    for (i, group) in report.groups.iter().enumerate() {
        println!(
            " Group {} ({} files, {} each) {}",
            i + 1,
            group.count(),
            format_size(group.size),
            group.digest
        );
        for path in group.paths() {
            println!("   {}", path.display());
        }
        println!();
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
