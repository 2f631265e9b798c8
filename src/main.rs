//! # randpick - Random picks from your music library
//!
//! ## Usage
//!
//! ```bash
//! # Build the library from a music directory
//! randpick init-db /path/to/music
//!
//! # One random track
//! randpick random
//!
//! # Five albums, every artist equally likely
//! randpick random -a -n 5 -e
//!
//! # Paths of three random jazz tracks
//! randpick random -p -n 3 jazz
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::{debug, info};
use randpick::cli::{self, Command};
use randpick::config::RuntimeConfig;
use randpick::db::Library;
use randpick::selector::SelectionConfig;
use randpick::{commands, completion};
use std::io;
use std::path::PathBuf;

/// Main entry point.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug randpick random` - Enable debug logging
/// - `RUST_LOG=randpick::selector=trace randpick random -e` - Per-draw detail
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let stdout = io::stdout();

    match args.command {
        Command::InitDb { path, force, scan_depth } => {
            let (_, mut library) = open_library(args.library)?;
            info!("Initializing library from: {}", path.display());
            let added = commands::init_db(&mut library, &path, force, scan_depth)?;
            println!("Catalogued {added} tracks");
        }
        Command::Update { path, scan_depth, remove_missing } => {
            let (_, mut library) = open_library(args.library)?;
            info!("Updating library from: {}", path.display());
            let (added, removed) =
                commands::update(&mut library, &path, scan_depth, remove_missing)?;
            println!("Added {added} tracks, removed {removed}");
        }
        Command::List { output, query } => {
            let (config, library) = open_library(args.library)?;
            commands::list(&library, &config, &output, &query, &mut stdout.lock())?;
        }
        Command::Random { output, number, equal_chance, query } => {
            let (config, library) = open_library(args.library)?;
            let selection = SelectionConfig::new(number, equal_chance);
            commands::random(&library, &config, &output, &selection, &query, &mut stdout.lock())?;
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(
                completion::shell_to_completion_shell(shell),
                &mut cmd,
                &mut stdout.lock(),
            );
        }
    }

    Ok(())
}

/// Resolve configuration (with the `--library` override) and open the library.
fn open_library(library_override: Option<PathBuf>) -> Result<(RuntimeConfig, Library)> {
    let mut config = RuntimeConfig::load()?;
    if let Some(path) = library_override {
        config = config.with_db_path(path);
    }
    let db_path = config.resolve_db_path()?;
    debug!("Using library {}", db_path.display());

    let library = Library::open(&db_path)?;
    Ok((config, library))
}
