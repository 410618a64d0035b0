//! POD5 CLI - Command-line tool for Terminal Reality POD5 archives.
//!
//! This is the main entry point for the `pod5` command-line application.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use pod5::prelude::*;

/// POD5 - Terminal Reality game archive extraction and re-packing tool
#[derive(Parser)]
#[command(name = "pod5")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every entry and write a manifest
    Extract {
        /// Path to the POD5 file
        #[arg(short, long, env = "POD5_ARCHIVE")]
        archive: PathBuf,

        /// Output directory [default: <archive>_extracted]
        #[arg(short, long, env = "POD5_EXTRACTED_DIR")]
        output: Option<PathBuf>,
    },

    /// Re-pack edited files into <archive>_new.pod
    Import {
        #[command(flatten)]
        paths: WorkspaceArgs,
    },

    /// List contents of a POD5 archive
    List {
        /// Path to the POD5 file
        #[arg(short, long, env = "POD5_ARCHIVE")]
        archive: PathBuf,

        /// Show sizes, offsets and compression
        #[arg(short, long)]
        detailed: bool,

        /// Print the listing as JSON
        #[arg(long, conflicts_with = "detailed")]
        json: bool,
    },

    /// Show which extracted files differ from the manifest
    Status {
        #[command(flatten)]
        paths: WorkspaceArgs,
    },
}

/// Paths shared by the commands that work on an extraction directory.
#[derive(Args)]
struct WorkspaceArgs {
    /// Path to the original POD5 file
    #[arg(short, long, env = "POD5_ARCHIVE")]
    archive: PathBuf,

    /// Extraction directory [default: <archive>_extracted]
    #[arg(short, long, env = "POD5_EXTRACTED_DIR")]
    extracted: Option<PathBuf>,

    /// Manifest file [default: <extracted>/_manifest.json]
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

/// Resolved paths for one import or status run.
#[derive(Debug)]
struct Config {
    archive: PathBuf,
    extracted_dir: PathBuf,
    manifest: PathBuf,
}

impl From<WorkspaceArgs> for Config {
    fn from(args: WorkspaceArgs) -> Self {
        let extracted_dir = args
            .extracted
            .unwrap_or_else(|| default_extract_dir(&args.archive));
        let manifest = args
            .manifest
            .unwrap_or_else(|| extracted_dir.join(MANIFEST_FILE_NAME));

        Self {
            archive: args.archive,
            extracted_dir,
            manifest,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Extract { archive, output } => {
            let output = output.unwrap_or_else(|| default_extract_dir(&archive));
            cmd_extract(&archive, &output)?;
        }
        Commands::Import { paths } => {
            cmd_import(&Config::from(paths))?;
        }
        Commands::List {
            archive,
            detailed,
            json,
        } => {
            cmd_list(&archive, detailed, json)?;
        }
        Commands::Status { paths } => {
            cmd_status(&Config::from(paths))?;
        }
    }

    Ok(())
}

fn cmd_extract(archive_path: &Path, output: &Path) -> Result<()> {
    println!("Opening POD5 archive: {}", archive_path.display());

    let start = Instant::now();
    let archive = PodArchive::open(archive_path).context("Failed to open POD5 archive")?;

    println!("Loaded {} entries in {:?}", archive.entry_count(), start.elapsed());
    println!("Extracting to {}...", output.display());

    let start = Instant::now();
    let manifest = pod5::archive::export_archive(&archive, output)
        .with_context(|| format!("Failed to extract {}", archive_path.display()))?;

    println!(
        "Extracted {} entries in {:?}",
        manifest.len(),
        start.elapsed()
    );

    Ok(())
}

fn cmd_import(config: &Config) -> Result<()> {
    debug!("{:?}", config);
    println!(
        "Importing {} into {}",
        config.extracted_dir.display(),
        config.archive.display()
    );

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {wide_msg}")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut on_progress = |percent: f32, label: &str| {
        pb.set_position(percent.round() as u64);
        pb.set_message(label.to_string());
    };

    let changed = import(
        &config.archive,
        &config.extracted_dir,
        &config.manifest,
        Some(&mut on_progress),
    )
    .context("Failed to import extracted files")?;

    if changed {
        pb.finish_with_message("Done");
        println!(
            "Wrote {} in {:?}",
            rebuilt_archive_path(&config.archive).display(),
            start.elapsed()
        );
    } else {
        pb.finish_and_clear();
        println!("No modified files, nothing written");
    }

    Ok(())
}

fn cmd_list(archive_path: &Path, detailed: bool, json: bool) -> Result<()> {
    let entries = list(archive_path).context("Failed to open POD5 archive")?;

    if json {
        let text = serde_json::to_string_pretty(&entries).context("Failed to encode listing")?;
        println!("{}", text);
        return Ok(());
    }

    for entry in &entries {
        if detailed {
            println!(
                "{:>6} {:>12} {:>12} {:#010x} {} {}",
                entry.index,
                entry.stored_size,
                entry.uncompressed_size,
                entry.data_offset,
                if entry.compressed { "Z" } else { " " },
                entry.name
            );
        } else {
            println!("{}", entry.name);
        }
    }

    println!("\nTotal: {} entries", entries.len());

    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    debug!("{:?}", config);

    let modified = status(&config.extracted_dir, &config.manifest)
        .context("Failed to compare extracted files")?;

    if modified.is_empty() {
        println!("No modified files");
        return Ok(());
    }

    for entry in &modified {
        println!("{:>6} {:>12} {}", entry.index, entry.data.len(), entry.name);
    }
    println!("\nModified: {} entries", modified.len());

    Ok(())
}
