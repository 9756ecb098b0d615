use std::{fmt::Display, time::Duration};

use serde::{Deserialize, Serialize};

/// Represents the track ID.
///
/// This is the playlist entry id handed out by the streaming provider,
/// so the same song added twice to different playlists has different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Represent a music track
///
/// Field names follow the provider's JSON, so clients can post search
/// results as they received them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    pub duration_millis: u64,
    /// provider reference used to resolve a stream url
    pub store_id: String,
}

impl Track {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_millis)
    }
}
