use rusqlite::{OptionalExtension, params};

use crate::{
    config,
    domain::track::{Track, TrackId},
    storage::{
        db::{self, SecondsSinceUnix},
        error::StorageError,
        schema::{columns, tables},
    },
};

use columns::*;
use tables::*;

#[derive(Debug)]
pub struct PlaylistSummary {
    pub name: String,
    pub created_at: SecondsSinceUnix,
    pub track_count: usize,
    /// None if nothing was ever added
    pub last_added_at: Option<SecondsSinceUnix>,
}

/// One named playlist stored in SQLite.
///
/// Tracks are kept as their JSON payload, ordered by insertion position.
pub struct PlaylistStore {
    pub(crate) db: rusqlite::Connection,
    name: String,
}

impl PlaylistStore {
    /// opens a data base connection, creating the playlist if it does not exist yet
    pub fn new(db_config: &config::Database, name: &str) -> Result<Self, StorageError> {
        let db = db::open(db_config)?;
        Self::from_existing_conn(db, name)
    }

    pub fn from_existing_conn(db: rusqlite::Connection, name: &str) -> Result<Self, StorageError> {
        let created = db.execute(
            &format!("INSERT OR IGNORE INTO {PLAYLISTS} ({NAME}, {CREATED_AT}) VALUES (?1, ?2)"),
            params![name, db::now()?],
        )?;
        if created > 0 {
            log::info!("created playlist '{name}'");
        }

        Ok(Self {
            db,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn load_tracks(&self) -> Result<Vec<Track>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {PAYLOAD} FROM {PLAYLIST_TRACKS} WHERE {PLAYLIST} = ?1 ORDER BY {POSITION}"
        ))?;

        let payloads = stmt
            .query_map(params![self.name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|payload| serde_json::from_str(payload).map_err(StorageError::from))
            .collect()
    }

    /// Appends the track after the last stored one.
    ///
    /// Returns false if the track id is already stored.
    pub fn append_track(&mut self, track: &Track) -> Result<bool, StorageError> {
        let payload = serde_json::to_string(track)?;

        let inserted = self.db.execute(
            &format!(
                "INSERT OR IGNORE INTO {PLAYLIST_TRACKS} \
                 ({PLAYLIST}, {TRACK_ID}, {POSITION}, {PAYLOAD}, {ADDED_AT}) \
                 VALUES (?1, ?2, \
                 (SELECT COALESCE(MAX({POSITION}), -1) + 1 FROM {PLAYLIST_TRACKS} WHERE {PLAYLIST} = ?1), \
                 ?3, ?4)"
            ),
            params![self.name, track.id.as_str(), payload, db::now()?],
        )?;

        Ok(inserted > 0)
    }

    pub fn remove_track(&mut self, track_id: &TrackId) -> Result<bool, StorageError> {
        let removed = self.db.execute(
            &format!("DELETE FROM {PLAYLIST_TRACKS} WHERE {PLAYLIST} = ?1 AND {TRACK_ID} = ?2"),
            params![self.name, track_id.as_str()],
        )?;

        Ok(removed > 0)
    }

    pub fn summary(&self) -> Result<PlaylistSummary, StorageError> {
        let created_at: SecondsSinceUnix = self
            .db
            .query_row(
                &format!("SELECT {CREATED_AT} FROM {PLAYLISTS} WHERE {NAME} = ?1"),
                params![self.name],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or_default();

        let (track_count, last_added_at): (i64, Option<SecondsSinceUnix>) = self.db.query_row(
            &format!(
                "SELECT COUNT(*), MAX({ADDED_AT}) FROM {PLAYLIST_TRACKS} WHERE {PLAYLIST} = ?1"
            ),
            params![self.name],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(PlaylistSummary {
            name: self.name.clone(),
            created_at,
            track_count: usize::try_from(track_count).unwrap_or_default(),
            last_added_at,
        })
    }
}
