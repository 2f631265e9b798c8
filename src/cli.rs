//! # Command-Line Interface Module
//!
//! Clap derive definitions for `randpick`.
//!
//! ## Commands
//!
//! - `init-db`: Scan a music directory into a fresh library
//! - `update`: Add new files from a music directory
//! - `list`: Print every entry matching a query
//! - `random`: Print random entries matching a query
//! - `completion`: Generate shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! randpick init-db ~/Music
//! randpick random -n 5 -e genre
//! randpick random -a -p artist:davis
//! ```

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "randpick")]
#[command(about = "Pick random tracks or albums from your music library")]
#[command(version)]
pub struct Args {
    /// Library database to use instead of the configured one
    #[arg(long, global = true, env = "RANDPICK_LIBRARY", value_hint = clap::ValueHint::FilePath)]
    pub library: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the library from a music directory (full scan)
    ///
    /// Expects the layout `<artist>/<album>/<NN - title>.<ext>`.
    /// Supported formats: FLAC, MP3, OGG, OPUS, M4A, WAV
    InitDb {
        /// Path to the music directory to scan
        #[arg(value_hint = clap::ValueHint::DirPath)]
        path: PathBuf,

        /// Replace the contents of a non-empty library
        #[arg(long)]
        force: bool,

        /// Maximum scan depth
        #[arg(long, default_value = "10")]
        scan_depth: usize,
    },

    /// Add new files from a music directory (incremental)
    Update {
        /// Path to the music directory to scan
        #[arg(value_hint = clap::ValueHint::DirPath)]
        path: PathBuf,

        /// Maximum scan depth
        #[arg(long, default_value = "10")]
        scan_depth: usize,

        /// Remove entries for files that no longer exist
        #[arg(long)]
        remove_missing: bool,
    },

    /// List entries matching a query
    List {
        #[command(flatten)]
        output: OutputArgs,

        /// Query terms, e.g. `artist:davis blue`
        query: Vec<String>,
    },

    /// Choose random tracks or albums
    Random {
        #[command(flatten)]
        output: OutputArgs,

        /// Number of objects to choose
        #[arg(short, long, default_value_t = 1)]
        number: usize,

        /// Each artist has the same chance
        #[arg(short, long)]
        equal_chance: bool,

        /// Query terms, e.g. `artist:davis blue`
        query: Vec<String>,
    },

    /// Generate shell completions
    ///
    /// Usage: randpick completion bash > ~/.local/share/bash-completion/completions/randpick
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// What to print, shared by `list` and `random`.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Choose albums instead of tracks
    #[arg(short, long)]
    pub album: bool,

    /// Print the path of the matched entry
    #[arg(short, long)]
    pub path: bool,

    /// Print with a custom format, e.g. `$artist: $title`
    #[arg(short, long, conflicts_with = "path")]
    pub format: Option<String>,
}

impl OutputArgs {
    /// Template source from the flags, or `None` to use the configured one.
    #[must_use]
    pub fn template_source(&self) -> Option<&str> {
        if self.path {
            Some("$path")
        } else {
            self.format.as_deref()
        }
    }
}
