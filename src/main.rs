//! Sarc CLI - Command-line tool for SARC bundle archives.
//!
//! This is the main entry point for the sarc command-line application.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sarc::prelude::*;

/// Sarc - SARC bundle archive tool
#[derive(Parser)]
#[command(name = "sarc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of an archive
    List {
        /// Path to the archive
        #[arg(env = "SARC_INPUT")]
        archive: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show sizes and offsets
        #[arg(short, long)]
        detailed: bool,

        /// Print entries as JSON
        #[arg(long, conflicts_with = "detailed")]
        json: bool,
    },

    /// Show header information
    Info {
        /// Path to the archive
        #[arg(env = "SARC_INPUT")]
        archive: PathBuf,

        /// Accept signature mismatches
        #[arg(long)]
        permissive: bool,
    },

    /// Extract all entries
    Extract {
        /// Path to the archive
        #[arg(env = "SARC_INPUT")]
        archive: PathBuf,

        /// Output root directory (defaults to the archive's directory)
        #[arg(short, long, env = "SARC_OUTPUT")]
        output: Option<PathBuf>,

        /// Dump folder name (defaults to the archive's file stem)
        #[arg(long)]
        folder: Option<String>,

        /// Continue past entries that fail to export
        #[arg(short, long)]
        keep_going: bool,

        /// Accept signature mismatches
        #[arg(long)]
        permissive: bool,
    },

    /// Write a single entry to stdout
    Cat {
        /// Path to the archive
        #[arg(env = "SARC_INPUT")]
        archive: PathBuf,

        /// Entry name
        name: String,

        /// Decompress Zstandard payloads
        #[arg(short, long)]
        decompress: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List {
            archive,
            filter,
            detailed,
            json,
        } => {
            cmd_list(&archive, filter.as_deref(), detailed, json)?;
        }
        Commands::Info {
            archive,
            permissive,
        } => {
            cmd_info(&archive, permissive)?;
        }
        Commands::Extract {
            archive,
            output,
            folder,
            keep_going,
            permissive,
        } => {
            cmd_extract(&archive, output, folder, keep_going, permissive)?;
        }
        Commands::Cat {
            archive,
            name,
            decompress,
        } => {
            cmd_cat(&archive, &name, decompress)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_archive(path: &Path, permissive: bool) -> Result<SarcArchive> {
    let policy = if permissive {
        MagicPolicy::Permissive
    } else {
        MagicPolicy::Strict
    };

    OpenOptions::new()
        .magic_policy(policy)
        .open(path)
        .with_context(|| format!("Failed to open archive {}", path.display()))
}

fn cmd_list(path: &Path, filter: Option<&str>, detailed: bool, json: bool) -> Result<()> {
    let archive = open_archive(path, false)?;
    let data_offset = archive.header().data_offset;

    let mut rows = Vec::new();
    let mut count = 0;
    for item in archive.iter()? {
        let (name, entry) = item?;
        if let Some(pattern) = filter {
            if !glob_match(pattern, &name) {
                continue;
            }
        }

        if json {
            rows.push(serde_json::json!({ "name": name, "entry": entry }));
        } else if detailed {
            println!(
                "{:>10} {:#010x} {:#010x} {}",
                entry.data_length(),
                u64::from(data_offset) + u64::from(entry.data_start()),
                entry.name_hash(),
                name
            );
        } else {
            println!("{}", name);
        }
        count += 1;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("\nTotal: {} entries", count);
    }

    Ok(())
}

fn cmd_info(path: &Path, permissive: bool) -> Result<()> {
    let archive = open_archive(path, permissive)?;
    let header = archive.header();

    println!("Magic:        {}", String::from_utf8_lossy(&header.magic));
    println!("Header size:  {:#x}", header.header_size);
    println!("Byte order:   {} ({:#06x})", header.endian, header.bom);
    println!("File size:    {}", header.file_size);
    println!("Data offset:  {:#x}", header.data_offset);
    println!("Reserved:     {:#x}", header.reserved);
    println!("Entries:      {}", archive.entry_count());
    println!("Hash key:     {:#x}", archive.sfat().hash_key());
    println!("Names at:     {:#x}", archive.sfnt().string_start());
    println!("Valid:        {}", archive.is_valid());

    Ok(())
}

fn cmd_extract(
    path: &Path,
    output: Option<PathBuf>,
    folder: Option<String>,
    keep_going: bool,
    permissive: bool,
) -> Result<()> {
    println!("Opening archive: {}", path.display());

    let start = Instant::now();
    let archive = open_archive(path, permissive)?;

    println!("Loaded {} entries in {:?}", archive.entry_count(), start.elapsed());

    let mut options = ExportOptions::new().error_policy(if keep_going {
        ErrorPolicy::Skip
    } else {
        ErrorPolicy::Abort
    });
    options.folder = folder;

    let export = archive
        .export_all(output.as_deref(), &options)
        .context("Failed to prepare dump directory")?;
    println!("Extracting to {}...", export.dir().display());
    debug!(keep_going, dir = %export.dir().display(), "starting export");

    let pb = ProgressBar::new(archive.entry_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut exported = 0;
    let mut errors = 0;

    for result in export {
        match result {
            Ok(_) => exported += 1,
            Err(e) if keep_going => {
                pb.suspend(|| eprintln!("Error exporting entry: {}", e));
                errors += 1;
            }
            Err(e) => {
                pb.abandon();
                return Err(e).context("Extraction aborted");
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "Exported {} entries in {:?} ({} errors)",
        exported,
        start.elapsed(),
        errors
    );

    Ok(())
}

fn cmd_cat(path: &Path, name: &str, decompress: bool) -> Result<()> {
    let archive = open_archive(path, false)?;
    let entry = archive
        .find(name)
        .with_context(|| format!("No entry named {}", name))?;
    let raw = archive.data_of(&entry)?;

    let mut stdout = io::stdout().lock();
    if decompress && is_zstd(raw) {
        let data = Zstd.decompress(raw).context("Failed to decompress entry")?;
        stdout.write_all(&data)?;
    } else {
        stdout.write_all(raw)?;
    }
    stdout.flush()?;

    Ok(())
}

/// Simple glob matching for filtering.
fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern_lower = pattern.to_lowercase();
    let name_lower = name.to_lowercase();

    if pattern_lower.contains('*') {
        let parts: Vec<&str> = pattern_lower.split('*').collect();
        let mut pos = 0;

        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }

            if let Some(found) = name_lower[pos..].find(part) {
                if i == 0 && found != 0 {
                    // First part must match at start if no leading *
                    return false;
                }
                pos += found + part.len();
            } else {
                return false;
            }
        }

        // A trailing * accepts any remainder; otherwise the name must be consumed
        parts.last().map_or(true, |p| p.is_empty()) || pos == name_lower.len()
    } else {
        name_lower.contains(&pattern_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.bntx", "timg/icon.bntx"));
        assert!(glob_match("timg/*", "timg/icon.bntx"));
        assert!(glob_match("ICON", "timg/icon.bntx"));
        assert!(!glob_match("*.bfres", "timg/icon.bntx"));
        assert!(!glob_match("icon*", "timg/icon.bntx"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["sarc", "-vv", "extract", "a.sarc", "--keep-going"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Extract {
                keep_going: true,
                ..
            }
        ));
    }
}
