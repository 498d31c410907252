//! In-memory catalog index built once before generation starts.
//!
//! The generator samples songs millions of times per run; re-querying the
//! store per draw would dominate the runtime. Instead the full `song` and
//! `song_genre` relations are scanned once and held as lookup tables for the
//! lifetime of the run. The index is strictly read-only.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::collections::HashMap;

/// The fixed genre tag space of the production catalog.
pub const GENRES: [&str; 19] = [
    "rock",
    "pop",
    "alternative",
    "breakcore",
    "blues",
    "country",
    "dance",
    "folk",
    "ethnic",
    "lo-fi",
    "jazz",
    "rap",
    "hip hop",
    "classical",
    "easy listening",
    "electronic",
    "soul",
    "metal",
    "punk",
];

/// Read-only lookup structures over the catalog relations.
///
/// Bucket ordering follows catalog scan order. That order carries no meaning,
/// but it must be stable so that a fixed random seed reproduces the same
/// draws.
pub struct CatalogIndex {
    /// Group id -> one representative song id (last-seen-wins).
    song_of_group: HashMap<String, String>,
    /// Song id -> owning group id. Songs without a group are absent.
    group_of_song: HashMap<String, String>,
    /// Genre -> song ids tagged with it, in catalog scan order.
    songs_of_genre: HashMap<String, Vec<String>>,
    /// Song id -> genres tagged on it.
    genres_of_song: HashMap<String, Vec<String>>,
    /// Every song id in the catalog, for uniform sampling.
    all_song_ids: Vec<String>,
    /// Group ids in first-seen scan order, for uniform sampling.
    group_ids: Vec<String>,
}

impl CatalogIndex {
    /// Scan the full `song` and `song_genre` relations and build the index.
    ///
    /// Fails if the catalog holds no songs at all; per-bucket emptiness is
    /// reported lazily by [`songs_in_genre`](Self::songs_in_genre) and
    /// [`representative_song`](Self::representative_song), at the moment a
    /// sample actually hits the empty bucket.
    pub fn build(conn: &Connection) -> Result<Self> {
        let mut index = Self {
            song_of_group: HashMap::new(),
            group_of_song: HashMap::new(),
            songs_of_genre: HashMap::new(),
            genres_of_song: HashMap::new(),
            all_song_ids: Vec::new(),
            group_ids: Vec::new(),
        };

        let mut stmt = conn
            .prepare("SELECT song_id, group_id FROM song")
            .context("invalid SQL when SELECTing song_id, group_id FROM song")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .context("cannot query catalog songs")?;
        for row in rows {
            let (song_id, group_id) = row.context("queried catalog song unwrap failed")?;
            if let Some(group_id) = group_id {
                if !index.song_of_group.contains_key(&group_id) {
                    index.group_ids.push(group_id.clone());
                }
                index.song_of_group.insert(group_id.clone(), song_id.clone());
                index.group_of_song.insert(song_id.clone(), group_id);
            }
            index.all_song_ids.push(song_id);
        }

        let mut stmt = conn
            .prepare("SELECT song_id, genre FROM song_genre")
            .context("invalid SQL when SELECTing FROM song_genre")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .context("cannot query song genre tags")?;
        for row in rows {
            let (song_id, genre) = row.context("queried genre tag unwrap failed")?;
            index
                .songs_of_genre
                .entry(genre.clone())
                .or_default()
                .push(song_id.clone());
            index.genres_of_song.entry(song_id).or_default().push(genre);
        }

        if index.all_song_ids.is_empty() {
            bail!("catalog is empty: the song table holds no rows. Load the catalog before generating users.");
        }

        info!(
            "catalog index built: {} songs, {} groups, {} tagged genres",
            index.all_song_ids.len(),
            index.group_ids.len(),
            index.songs_of_genre.len()
        );
        debug!(
            "genres with empty buckets: {:?}",
            GENRES
                .iter()
                .filter(|g| !index.songs_of_genre.contains_key(**g))
                .collect::<Vec<_>>()
        );

        Ok(index)
    }

    /// Songs tagged with `genre`, in stable scan order.
    ///
    /// An empty bucket is a fatal configuration error: the production catalog
    /// guarantees every genre has at least one song, so sampling against an
    /// empty bucket means the loaded catalog is not the one the generator was
    /// configured for.
    pub fn songs_in_genre(&self, genre: &str) -> Result<&[String]> {
        match self.songs_of_genre.get(genre) {
            Some(songs) if !songs.is_empty() => Ok(songs),
            _ => bail!(
                "genre bucket '{genre}' is empty: no catalog song carries this tag. \
                 The catalog does not match the configured genre space."
            ),
        }
    }

    /// One representative song of `group`, used for favorite-group plays.
    pub fn representative_song(&self, group_id: &str) -> Result<&str> {
        self.song_of_group
            .get(group_id)
            .map(String::as_str)
            .with_context(|| {
                format!("group '{group_id}' owns no catalog song; cannot sample a representative")
            })
    }

    /// The owning group of `song_id`, if any.
    pub fn group_of(&self, song_id: &str) -> Option<&str> {
        self.group_of_song.get(song_id).map(String::as_str)
    }

    /// Genre tags carried by `song_id` (possibly none).
    pub fn genres_of(&self, song_id: &str) -> &[String] {
        self.genres_of_song
            .get(song_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Every catalog song id, for uniform random draws.
    pub fn all_songs(&self) -> &[String] {
        &self.all_song_ids
    }

    /// Every group id, in first-seen order, for uniform random draws.
    pub fn groups(&self) -> &[String] {
        &self.group_ids
    }
}
