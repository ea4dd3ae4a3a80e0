//! `tomltidy`: rewrite TOML files in canonical form.
//!
//! ## Usage
//!
//! ```sh
//! # Rewrite files in place
//! tomltidy Cargo.toml config.toml
//!
//! # Every *.toml under a directory, sorted keys, 4-space indentation
//! tomltidy -r --sort-keys --indent 4 configs/
//!
//! # Only report files that are not canonical (exit status 1 if any)
//! tomltidy --check -r .
//!
//! # Log every file handled
//! RUST_LOG=info tomltidy -r .
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tidy_toml::EncodeOptions;

#[derive(Parser)]
#[command(
    name = "tomltidy",
    version,
    about = "Rewrite TOML files in canonical, pretty-printed form"
)]
struct Cli {
    /// Files to rewrite, or directories to search for *.toml files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Search directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Report files that would change instead of rewriting them
    #[arg(long)]
    check: bool,

    /// Sort keys alphabetically at every level
    #[arg(long)]
    sort_keys: bool,

    /// Spaces per nesting level
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Column at which long strings and arrays are wrapped
    #[arg(long, default_value_t = 120)]
    wrap: usize,
}

/// What happened to one file.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Unchanged,
    Rewritten,
    WouldChange,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let options = EncodeOptions::new()
        .with_sort_keys(cli.sort_keys)
        .with_indent(cli.indent)
        .with_wrap(cli.wrap);

    let files = match collect_files(&cli.paths, cli.recursive) {
        Ok(files) => files,
        Err(e) => {
            error!("{:#}", e);
            process::exit(2);
        }
    };

    let mut failed = 0;
    let mut pending = 0;

    for path in &files {
        match tidy_file(path, &options, cli.check) {
            Ok(Outcome::Unchanged) => info!("{} is already tidy", path.display()),
            Ok(Outcome::Rewritten) => info!("rewrote {}", path.display()),
            Ok(Outcome::WouldChange) => {
                pending += 1;
                warn!("{} is not tidy", path.display());
                println!("{}", path.display());
            }
            Err(e) => {
                failed += 1;
                error!("{:#}", e);
            }
        }
    }

    if failed > 0 || pending > 0 {
        process::exit(1);
    }
}

/// Expands directories into the `*.toml` files they contain.
///
/// Paths naming files are kept as given, whatever their extension.
fn collect_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            search_dir(path, recursive, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

fn search_dir(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?
            .path();
        found.push(path);
    }
    found.sort();

    for path in found {
        if path.is_dir() {
            if recursive {
                search_dir(&path, recursive, files)?;
            }
        } else if path.extension().map_or(false, |ext| ext == "toml") {
            files.push(path);
        }
    }

    Ok(())
}

fn tidy_file(path: &Path, options: &EncodeOptions, check: bool) -> Result<Outcome> {
    let original = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let document = tidy_toml::decode(&original)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let tidy = tidy_toml::encode_with_options(&document, options)
        .with_context(|| format!("Failed to encode {}", path.display()))?;

    if tidy == original {
        return Ok(Outcome::Unchanged);
    }
    if check {
        return Ok(Outcome::WouldChange);
    }

    fs::write(path, tidy).with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(Outcome::Rewritten)
}
