//! # Library Database
//!
//! SQLite storage for tracks (`items`) and the albums they belong to.
//!
//! ## Schema
//!
//! - `albums`: one row per `(albumartist, album)` pair, with the directory the
//!   album was found in.
//! - `items`: one row per audio file, unique by path, pointing at its album.
//!
//! The library is the query executor for the selector: [`Library::items`] and
//! [`Library::albums`] turn a [`Query`] into the ordered entry collection that
//! [`crate::selector::select`] samples from.

use crate::entry::{Album, Item, NewItem};
use crate::query::Query;
use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::fs;
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS albums (
        id          INTEGER PRIMARY KEY,
        albumartist TEXT    NOT NULL,
        album       TEXT    NOT NULL,
        path        TEXT    NOT NULL,
        UNIQUE(albumartist, album)
    );
    CREATE TABLE IF NOT EXISTS items (
        id          INTEGER PRIMARY KEY,
        path        TEXT    NOT NULL UNIQUE,
        title       TEXT    NOT NULL,
        artist      TEXT    NOT NULL,
        albumartist TEXT    NOT NULL DEFAULT '',
        album       TEXT    NOT NULL,
        album_id    INTEGER REFERENCES albums(id)
    );
    CREATE INDEX IF NOT EXISTS idx_items_album_id ON items(album_id);
";

/// Handle on a music library database.
pub struct Library {
    conn: Connection,
}

impl Library {
    /// Open the library at `path`, creating the file, its parent directory
    /// and the schema if needed.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created, the database cannot be
    /// opened or the schema cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Opening library at {}", path.display());
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create library directory at {}", dir.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open library database at {}", path.display()))?;
        Self::with_connection(conn)
    }

    /// Throwaway library, used by tests and benchmarks.
    ///
    /// # Errors
    ///
    /// Fails if SQLite cannot allocate the in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory library")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create library schema")?;
        Ok(Self { conn })
    }

    /// Insert new items in one transaction. Paths already in the library are
    /// skipped. Returns how many items were added.
    ///
    /// # Errors
    ///
    /// Fails on any SQL error; the transaction is rolled back.
    pub fn add_items(&mut self, items: &[NewItem]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut added = 0;

        {
            let mut find_album =
                tx.prepare("SELECT id FROM albums WHERE albumartist = ?1 AND album = ?2")?;
            let mut insert_album =
                tx.prepare("INSERT INTO albums (albumartist, album, path) VALUES (?1, ?2, ?3)")?;
            let mut insert_item = tx.prepare(
                "INSERT OR IGNORE INTO items (path, title, artist, albumartist, album, album_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for item in items {
                let albumartist = if item.albumartist.is_empty() {
                    &item.artist
                } else {
                    &item.albumartist
                };

                let existing: Option<i64> = find_album
                    .query_row(params![albumartist, item.album], |row| row.get(0))
                    .optional()
                    .with_context(|| format!("Failed to look up album for {}", item.path))?;

                let album_id = match existing {
                    Some(id) => id,
                    None => {
                        let dir = Path::new(&item.path)
                            .parent()
                            .map(|p| p.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        insert_album
                            .execute(params![albumartist, item.album, dir])
                            .with_context(|| {
                                format!("Failed to insert album '{}' by '{albumartist}'", item.album)
                            })?;
                        tx.last_insert_rowid()
                    }
                };

                added += insert_item
                    .execute(params![
                        item.path,
                        item.title,
                        item.artist,
                        item.albumartist,
                        item.album,
                        album_id
                    ])
                    .with_context(|| format!("Failed to insert item {}", item.path))?;
            }
        }

        // Albums created for items that all turned out to be duplicates.
        tx.execute(
            "DELETE FROM albums WHERE id NOT IN (SELECT DISTINCT album_id FROM items WHERE album_id IS NOT NULL)",
            [],
        )?;

        tx.commit().context("Committing item import failed")?;
        info!("Added {added} of {} scanned items", items.len());
        Ok(added)
    }

    /// Drop items whose file is gone, then albums left empty.
    /// Returns the number of items removed.
    ///
    /// # Errors
    ///
    /// Fails on any SQL error.
    pub fn remove_missing(&mut self) -> Result<usize> {
        let missing: Vec<(i64, String)> = {
            let mut stmt = self.conn.prepare("SELECT id, path FROM items")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let mut missing = Vec::new();
            for row in rows {
                let (id, path): (i64, String) = row.context("Failed to read item path")?;
                if !Path::new(&path).exists() {
                    debug!("Missing file: {path}");
                    missing.push((id, path));
                }
            }
            missing
        };

        let tx = self.conn.transaction()?;
        {
            let mut delete = tx.prepare("DELETE FROM items WHERE id = ?1")?;
            for (id, path) in &missing {
                delete
                    .execute([id])
                    .with_context(|| format!("Failed to remove missing item {path}"))?;
            }
        }
        tx.execute(
            "DELETE FROM albums WHERE id NOT IN (SELECT DISTINCT album_id FROM items WHERE album_id IS NOT NULL)",
            [],
        )?;
        tx.commit().context("Committing removal of missing items failed")?;

        info!("Removed {} missing items", missing.len());
        Ok(missing.len())
    }

    /// Delete every item and album.
    ///
    /// # Errors
    ///
    /// Fails on any SQL error.
    pub fn clear(&mut self) -> Result<()> {
        self.conn
            .execute_batch("DELETE FROM items; DELETE FROM albums;")
            .context("Failed to clear library")
    }

    /// `(items, albums)` currently stored.
    ///
    /// # Errors
    ///
    /// Fails on any SQL error.
    pub fn counts(&self) -> Result<(usize, usize)> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .with_context(|| format!("Failed to count {table}"))?;
            Ok(usize::try_from(n).unwrap_or(0))
        };
        Ok((count("items")?, count("albums")?))
    }

    /// Items matching `query`, in insertion order.
    ///
    /// An empty `albumartist` reads as the item's `artist`, both when
    /// filtering and in the returned rows.
    ///
    /// # Errors
    ///
    /// Fails if the query names an unknown field or on any SQL error.
    pub fn items(&self, query: &Query) -> Result<Vec<Item>> {
        let filter = query.to_sql("items", Item::FIELDS, Item::DEFAULT_SEARCH_FIELDS)?;
        let sql = format!(
            "SELECT id, path, title, artist, albumartist, album, album_id
             FROM (SELECT id, path, title, artist,
                          COALESCE(NULLIF(albumartist, ''), artist) AS albumartist,
                          album, album_id
                   FROM items)
             WHERE {} ORDER BY id",
            filter.clause
        );
        debug!("Item query `{query}': {sql} {:?}", filter.params);

        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("Invalid SQL statement when SELECTing items")?;
        let rows = stmt.query_map(params_from_iter(filter.params.iter()), |row| {
            Ok(Item {
                id: row.get(0)?,
                path: row.get(1)?,
                title: row.get(2)?,
                artist: row.get(3)?,
                albumartist: row.get(4)?,
                album: row.get(5)?,
                album_id: row.get(6)?,
            })
        })?;

        let mut items = Vec::new();
        for item in rows {
            items.push(item.context("Failed to read item row")?);
        }
        Ok(items)
    }

    /// Albums matching `query`, in insertion order.
    ///
    /// # Errors
    ///
    /// Fails if the query names an unknown field or on any SQL error.
    pub fn albums(&self, query: &Query) -> Result<Vec<Album>> {
        let filter = query.to_sql("albums", Album::FIELDS, Album::DEFAULT_SEARCH_FIELDS)?;
        let sql = format!(
            "SELECT id, albumartist, album, path,
                    (SELECT COUNT(*) FROM items WHERE items.album_id = albums.id)
             FROM albums WHERE {} ORDER BY id",
            filter.clause
        );
        debug!("Album query `{query}': {sql} {:?}", filter.params);

        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("Invalid SQL statement when SELECTing albums")?;
        let rows = stmt.query_map(params_from_iter(filter.params.iter()), |row| {
            Ok(Album {
                id: row.get(0)?,
                albumartist: row.get(1)?,
                album: row.get(2)?,
                path: row.get(3)?,
                track_count: row.get(4)?,
            })
        })?;

        let mut albums = Vec::new();
        for album in rows {
            albums.push(album.context("Failed to read album row")?);
        }
        Ok(albums)
    }
}
