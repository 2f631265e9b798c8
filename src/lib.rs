//! Pick random tracks or albums from a music library.
//!
//! Core module:
//! - [`selector`] - Uniform and artist-balanced random selection
//!
//! ### Supporting Modules
//!
//! - [`entry`] - Tracks, albums, and the traits the selector and renderer use
//! - [`db`] - SQLite library storage and query execution
//! - [`scan`] - Music directory scanning
//! - [`query`] - Free-form query parsing
//! - [`template`] - `$field` output templates
//! - [`config`] - Data directory and configuration file handling
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`commands`] - Subcommand implementations
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use randpick::db::Library;
//! use randpick::query::Query;
//! use randpick::selector::{select, SelectionConfig};
//! use randpick::template::Template;
//!
//! let library = Library::open(&randpick::config::get_db_path()?)?;
//! let tracks = library.items(&Query::parse(&["artist:davis"]))?;
//!
//! // Three tracks, every artist equally likely
//! let picked = select(&tracks, &SelectionConfig::new(3, true));
//!
//! let template = Template::parse("$artist - $title");
//! for track in &picked {
//!     println!("{}", template.render(track));
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Selection Strategies
//!
//! ### Uniform
//! Every subset of the requested size is equally likely. A prolific artist
//! shows up in proportion to how many tracks they have.
//!
//! ### Equal chance per artist
//! Each draw picks an artist first, then one of their entries. No artist is
//! picked twice before every remaining artist has been picked once, so a
//! single-album artist is as likely to appear as one with a hundred albums.
//!
//! ## Error Handling
//!
//! Selection itself never fails. Everything around it (database, scanning,
//! configuration, output) returns `Result<T, anyhow::Error>` with context.

pub mod cli;
pub mod commands;
pub mod completion;
pub mod config;
pub mod db;
pub mod entry;
pub mod query;
pub mod scan;
pub mod selector;
pub mod template;
