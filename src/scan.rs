//! Music directory scanning.
//!
//! Metadata comes from the directory layout rather than from tags:
//!
//! ```text
//! <root>/<artist>/<album>/<NN - title>.<ext>
//! ```
//!
//! The album artist is the artist directory. Leading track numbers and their
//! separator are stripped from the title.

use crate::entry::NewItem;
use anyhow::{ensure, Context, Result};
use log::{debug, info, warn};
use path_absolutize::Absolutize;
use std::path::Path;
use walkdir::WalkDir;

/// File extensions treated as audio, compared case-insensitively.
pub const AUDIO_EXTENSIONS: &[&str] = &["flac", "mp3", "ogg", "opus", "m4a", "wav"];

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Walk `root` (at most `max_depth` levels deep) and describe every audio
/// file found.
///
/// # Errors
///
/// Fails if `root` does not exist or is not a directory.
pub fn scan_directory(root: &Path, max_depth: usize) -> Result<Vec<NewItem>> {
    let root = root
        .absolutize()
        .with_context(|| format!("Failed to resolve music directory {}", root.display()))?;
    ensure!(root.exists(), "Music directory {} does not exist", root.display());
    ensure!(root.is_dir(), "{} is not a directory", root.display());

    info!("Scanning {} (max depth {max_depth})", root.display());

    let mut items = Vec::new();
    let walker = WalkDir::new(&root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {err}");
                continue;
            }
        };

        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            items.push(describe(&root, entry.path()));
        }
    }

    debug!("Found {} audio files under {}", items.len(), root.display());
    Ok(items)
}

/// Derive item metadata from a file's position under `root`.
#[must_use]
pub fn describe(root: &Path, path: &Path) -> NewItem {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let dirs: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    // The closest two directories are album and artist.
    let album = dirs.last().cloned().unwrap_or_else(|| UNKNOWN_ALBUM.to_string());
    let artist = dirs
        .len()
        .checked_sub(2)
        .and_then(|i| dirs.get(i).cloned())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    NewItem {
        path: path.to_string_lossy().into_owned(),
        title: strip_track_number(&stem).to_string(),
        albumartist: artist.clone(),
        artist,
        album,
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// `"03 - Title"`, `"03. Title"`, `"03_Title"` → `"Title"`. Stems that are
/// only a number are kept as they are.
fn strip_track_number(stem: &str) -> &str {
    let rest = stem.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == stem.len() {
        return stem;
    }
    let title = rest.trim_start_matches(|c: char| c == ' ' || c == '-' || c == '.' || c == '_');
    if title.is_empty() {
        stem
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_strip_track_number() {
        assert_eq!(strip_track_number("03 - So What"), "So What");
        assert_eq!(strip_track_number("12. Freddie"), "Freddie");
        assert_eq!(strip_track_number("7_Seven"), "Seven");
        assert_eq!(strip_track_number("Intro"), "Intro");
        assert_eq!(strip_track_number("1999"), "1999");
    }

    #[test]
    fn test_describe_full_layout() {
        let root = Path::new("/music");
        let item = describe(root, Path::new("/music/Can/Tago Mago/01 - Paperhouse.flac"));
        assert_eq!(item.artist, "Can");
        assert_eq!(item.albumartist, "Can");
        assert_eq!(item.album, "Tago Mago");
        assert_eq!(item.title, "Paperhouse");
        assert_eq!(item.path, "/music/Can/Tago Mago/01 - Paperhouse.flac");
    }

    #[test]
    fn test_describe_shallow_layout() {
        let root = Path::new("/music");
        let item = describe(root, Path::new("/music/loose.mp3"));
        assert_eq!(item.artist, UNKNOWN_ARTIST);
        assert_eq!(item.album, UNKNOWN_ALBUM);
        assert_eq!(item.title, "loose");

        let item = describe(root, Path::new("/music/Singles/track.mp3"));
        assert_eq!(item.artist, UNKNOWN_ARTIST);
        assert_eq!(item.album, "Singles");
    }

    #[test]
    fn test_scan_directory_filters_and_skips_hidden() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let album_dir = temp_dir.path().join("Can/Tago Mago");
        fs::create_dir_all(&album_dir)?;
        fs::write(album_dir.join("01 - Paperhouse.FLAC"), b"")?;
        fs::write(album_dir.join("cover.jpg"), b"")?;
        fs::write(album_dir.join(".02 - hidden.flac"), b"")?;
        fs::create_dir_all(temp_dir.path().join(".cache/x/y"))?;
        fs::write(temp_dir.path().join(".cache/x/y/z.mp3"), b"")?;

        let items = scan_directory(temp_dir.path(), 10)?;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Paperhouse");
        Ok(())
    }

    #[test]
    fn test_scan_directory_respects_depth() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let album_dir = temp_dir.path().join("Artist/Album");
        fs::create_dir_all(&album_dir)?;
        fs::write(album_dir.join("song.ogg"), b"")?;
        fs::write(temp_dir.path().join("top.ogg"), b"")?;

        assert_eq!(scan_directory(temp_dir.path(), 1)?.len(), 1);
        assert_eq!(scan_directory(temp_dir.path(), 3)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_scan_missing_directory_errors() {
        let err = scan_directory(Path::new("/definitely/not/here"), 5).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
