//! Command implementations, one function per subcommand.
//!
//! `main` only parses arguments and resolves configuration; everything
//! observable happens here so it can be exercised against a temporary
//! library and an in-memory writer.

use crate::cli::OutputArgs;
use crate::config::RuntimeConfig;
use crate::db::Library;
use crate::entry::{Fields, GroupKey};
use crate::query::Query;
use crate::scan;
use crate::selector::{self, SelectionConfig};
use crate::template::{print_entries, Template};
use anyhow::{bail, Result};
use log::info;
use std::io::Write;
use std::path::Path;

/// Scan `music_dir` into the library. A library that already has items is
/// only replaced with `force`. Returns the number of items added.
///
/// # Errors
///
/// Fails if the library is not empty and `force` is unset, or if scanning
/// or importing fails.
pub fn init_db(
    library: &mut Library,
    music_dir: &Path,
    force: bool,
    scan_depth: usize,
) -> Result<usize> {
    let (items, albums) = library.counts()?;
    if items > 0 || albums > 0 {
        if !force {
            bail!(
                "Library already holds {items} tracks in {albums} albums; use --force to replace it"
            );
        }
        info!("Clearing existing library ({items} tracks, {albums} albums)");
        library.clear()?;
    }

    let scanned = scan::scan_directory(music_dir, scan_depth)?;
    library.add_items(&scanned)
}

/// Import files under `music_dir` not yet in the library, optionally dropping
/// entries whose files are gone. Returns `(added, removed)`.
///
/// # Errors
///
/// Fails if scanning, importing or removal fails.
pub fn update(
    library: &mut Library,
    music_dir: &Path,
    scan_depth: usize,
    remove_missing: bool,
) -> Result<(usize, usize)> {
    let removed = if remove_missing {
        library.remove_missing()?
    } else {
        0
    };

    let scanned = scan::scan_directory(music_dir, scan_depth)?;
    let added = library.add_items(&scanned)?;
    Ok((added, removed))
}

/// Print every entry matching `query`.
///
/// # Errors
///
/// Fails on an invalid query, a database error, or a write error.
pub fn list<W: Write>(
    library: &Library,
    config: &RuntimeConfig,
    output: &OutputArgs,
    query: &[String],
    out: &mut W,
) -> Result<()> {
    let query = Query::parse(query);
    let template = resolve_template(config, output);

    if output.album {
        print_entries(&library.albums(&query)?, &template, out)
    } else {
        print_entries(&library.items(&query)?, &template, out)
    }
}

/// Print `selection.count` random entries matching `query`.
///
/// # Errors
///
/// Fails on an invalid query, a database error, or a write error. An empty
/// match set is not an error; nothing is printed.
pub fn random<W: Write>(
    library: &Library,
    config: &RuntimeConfig,
    output: &OutputArgs,
    selection: &SelectionConfig,
    query: &[String],
    out: &mut W,
) -> Result<()> {
    let query = Query::parse(query);
    let template = resolve_template(config, output);

    if output.album {
        pick_and_print(&library.albums(&query)?, selection, &template, out)
    } else {
        pick_and_print(&library.items(&query)?, selection, &template, out)
    }
}

fn pick_and_print<E, W>(
    entries: &[E],
    selection: &SelectionConfig,
    template: &Template,
    out: &mut W,
) -> Result<()>
where
    E: Clone + GroupKey + Fields,
    W: Write,
{
    info!("Choosing {} of {} matching entries", selection.count, entries.len());
    let chosen = selector::select(entries, selection);
    print_entries(&chosen, template, out)
}

fn resolve_template(config: &RuntimeConfig, output: &OutputArgs) -> Template {
    let source = output
        .template_source()
        .unwrap_or_else(|| config.format_for(output.album));
    Template::parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NewItem;

    fn config() -> RuntimeConfig {
        RuntimeConfig::default()
    }

    fn library() -> Library {
        let mut library = Library::open_in_memory().unwrap();
        let items: Vec<NewItem> = [("A", "One", 3), ("B", "Two", 1), ("C", "Three", 2)]
            .iter()
            .flat_map(|&(artist, album, n)| {
                (0..n).map(move |i| NewItem {
                    path: format!("/m/{artist}/{album}/{i}.flac"),
                    title: format!("{artist}{i}"),
                    artist: artist.to_string(),
                    albumartist: artist.to_string(),
                    album: album.to_string(),
                })
            })
            .collect();
        library.add_items(&items).unwrap();
        library
    }

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_random_balanced_tracks_cover_every_artist() {
        let library = library();
        let output = OutputArgs {
            format: Some("$artist".to_string()),
            ..OutputArgs::default()
        };
        let mut out = Vec::new();

        random(&library, &config(), &output, &SelectionConfig::new(3, true), &[], &mut out).unwrap();

        let mut artists = lines(out);
        artists.sort();
        assert_eq!(artists, ["A", "B", "C"]);
    }

    #[test]
    fn test_random_albums_print_paths() {
        let library = library();
        let output = OutputArgs {
            album: true,
            path: true,
            format: None,
        };
        let mut out = Vec::new();

        random(&library, &config(), &output, &SelectionConfig::new(10, false), &[], &mut out).unwrap();

        let mut paths = lines(out);
        paths.sort();
        assert_eq!(paths, ["/m/A/One", "/m/B/Two", "/m/C/Three"]);
    }

    #[test]
    fn test_random_respects_query() {
        let library = library();
        let output = OutputArgs {
            format: Some("$title".to_string()),
            ..OutputArgs::default()
        };
        let mut out = Vec::new();
        let query = vec!["artist:c".to_string()];

        random(&library, &config(), &output, &SelectionConfig::new(5, false), &query, &mut out).unwrap();

        let mut titles = lines(out);
        titles.sort();
        assert_eq!(titles, ["C0", "C1"]);
    }

    #[test]
    fn test_random_with_no_matches_prints_nothing() {
        let library = library();
        let mut out = Vec::new();
        let query = vec!["nothing-matches-this".to_string()];

        random(
            &library,
            &config(),
            &OutputArgs::default(),
            &SelectionConfig::new(3, true),
            &query,
            &mut out,
        )
        .unwrap();

        assert!(out.is_empty());
    }

    #[test]
    fn test_list_uses_configured_format() {
        let library = library();
        let config = RuntimeConfig {
            format_item: "$title@$album".to_string(),
            ..config()
        };
        let mut out = Vec::new();

        list(&library, &config, &OutputArgs::default(), &["B".to_string()], &mut out).unwrap();

        assert_eq!(lines(out), ["B0@Two"]);
    }

    #[test]
    fn test_init_db_refuses_non_empty_library() {
        let mut library = library();
        let err = init_db(&mut library, Path::new("/nonexistent"), false, 10).unwrap_err();
        assert!(err.to_string().contains("--force"));
    }
}
