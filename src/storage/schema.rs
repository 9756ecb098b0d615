use rusqlite::Connection;

pub mod tables {
    pub const PLAYLISTS: &str = "playlists";
    pub const PLAYLIST_TRACKS: &str = "playlist_tracks";

    pub const ALL_TABLES: &[&str] = &[PLAYLISTS, PLAYLIST_TRACKS];
}

pub mod columns {
    pub const NAME: &str = "name";
    pub const CREATED_AT: &str = "created_at";
    pub const PLAYLIST: &str = "playlist";
    pub const TRACK_ID: &str = "track_id";
    pub const POSITION: &str = "position";
    pub const PAYLOAD: &str = "payload";
    pub const ADDED_AT: &str = "added_at";
}

pub use columns::*;
pub use tables::*;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS playlists (
    name TEXT PRIMARY KEY,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS playlist_tracks (
    playlist TEXT NOT NULL REFERENCES playlists(name),
    track_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    payload TEXT NOT NULL,
    added_at INTEGER NOT NULL,
    PRIMARY KEY (playlist, track_id)
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
