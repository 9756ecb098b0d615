//! Playlist traversal and the timer driven playback loop

pub mod controller;
pub mod error;
pub mod events;
pub mod playlist;
pub mod timer;

pub use controller::{PlaybackController, PlaybackState, Status};
pub use playlist::Playlist;
