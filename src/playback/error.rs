use thiserror::Error;

use crate::domain::track::TrackId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("track {0} not found")]
    NotFound(TrackId),

    #[error("playlist is empty")]
    EmptyPlaylist,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("track {0} has no stream reference")]
    MissingReference(TrackId),

    #[error("stream url could not be resolved: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("player process i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("player process has no stdin")]
    NoInput,

    #[error("refusing to send player command with control characters or quotes: {0:?}")]
    UnsafeCommand(String),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("track {0} not found")]
    NotFound(TrackId),

    #[error("playlist is empty")]
    EmptyPlaylist,

    #[error("stream resolution failed: {0}")]
    Resolution(#[from] ResolveError),

    #[error("player rejected the track: {0}")]
    Player(#[from] PlayerError),
}

impl From<PlaylistError> for PlaybackError {
    fn from(err: PlaylistError) -> Self {
        match err {
            PlaylistError::NotFound(id) => PlaybackError::NotFound(id),
            PlaylistError::EmptyPlaylist => PlaybackError::EmptyPlaylist,
        }
    }
}
