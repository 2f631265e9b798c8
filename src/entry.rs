//! Library entries: tracks ([`Item`]) and albums ([`Album`]).
//!
//! The selector only cares about [`GroupKey`]; the renderer only cares about
//! [`Fields`]. Everything else here is plain data loaded by [`crate::db`].

/// Exposes the identity entries are grouped by for artist-balanced picks.
pub trait GroupKey {
    /// Artist identity. Compared by exact equality, no normalization.
    fn group_key(&self) -> &str;
}

/// Named field access used by templates and queries.
pub trait Fields {
    /// Value of `name`, or `None` if the entry has no such field.
    fn field(&self, name: &str) -> Option<String>;
}

/// A single track as stored in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub path: String,
    pub title: String,
    pub artist: String,
    /// May be empty for items imported without album artist information.
    pub albumartist: String,
    pub album: String,
    pub album_id: Option<i64>,
}

impl Item {
    /// Fields usable in `field:value` query terms and templates.
    pub const FIELDS: &'static [&'static str] =
        &["id", "path", "title", "artist", "albumartist", "album"];

    /// Fields a bare query term is matched against.
    pub const DEFAULT_SEARCH_FIELDS: &'static [&'static str] =
        &["artist", "albumartist", "album", "title"];
}

impl GroupKey for Item {
    fn group_key(&self) -> &str {
        if self.albumartist.is_empty() {
            &self.artist
        } else {
            &self.albumartist
        }
    }
}

impl Fields for Item {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "path" => Some(self.path.clone()),
            "title" => Some(self.title.clone()),
            "artist" => Some(self.artist.clone()),
            "albumartist" => Some(self.group_key().to_string()),
            "album" => Some(self.album.clone()),
            _ => None,
        }
    }
}

/// An album, derived from the items sharing an album artist and album title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: i64,
    pub albumartist: String,
    pub album: String,
    /// Directory holding the album's tracks.
    pub path: String,
    pub track_count: u32,
}

impl Album {
    pub const FIELDS: &'static [&'static str] = &["id", "path", "albumartist", "album"];
    pub const DEFAULT_SEARCH_FIELDS: &'static [&'static str] = &["albumartist", "album"];
}

impl GroupKey for Album {
    fn group_key(&self) -> &str {
        &self.albumartist
    }
}

impl Fields for Album {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "path" => Some(self.path.clone()),
            "albumartist" => Some(self.albumartist.clone()),
            "album" => Some(self.album.clone()),
            "tracks" => Some(self.track_count.to_string()),
            _ => None,
        }
    }
}

/// Track metadata gathered during a scan, before it has a database id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub path: String,
    pub title: String,
    pub artist: String,
    pub albumartist: String,
    pub album: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(artist: &str, albumartist: &str) -> Item {
        Item {
            id: 1,
            path: "/music/a/b/01 - c.flac".to_string(),
            title: "c".to_string(),
            artist: artist.to_string(),
            albumartist: albumartist.to_string(),
            album: "b".to_string(),
            album_id: Some(1),
        }
    }

    #[test]
    fn test_item_group_key_prefers_albumartist() {
        assert_eq!(item("Guest", "Band").group_key(), "Band");
    }

    #[test]
    fn test_item_group_key_falls_back_to_artist() {
        assert_eq!(item("Solo", "").group_key(), "Solo");
    }

    #[test]
    fn test_item_fields() {
        let item = item("Solo", "");
        assert_eq!(item.field("title").as_deref(), Some("c"));
        assert_eq!(item.field("albumartist").as_deref(), Some("Solo"));
        assert_eq!(item.field("id").as_deref(), Some("1"));
        assert!(item.field("bitrate").is_none());
    }

    #[test]
    fn test_album_fields() {
        let album = Album {
            id: 7,
            albumartist: "Band".to_string(),
            album: "Record".to_string(),
            path: "/music/Band/Record".to_string(),
            track_count: 12,
        };
        assert_eq!(album.group_key(), "Band");
        assert_eq!(album.field("tracks").as_deref(), Some("12"));
        assert_eq!(album.field("path").as_deref(), Some("/music/Band/Record"));
        assert!(album.field("title").is_none());
    }
}
