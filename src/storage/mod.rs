//! SQLite persistence of the playlist between restarts

pub mod db;
pub mod error;
pub mod operations;
pub(crate) mod schema;

pub use operations::{PlaylistStore, PlaylistSummary};
