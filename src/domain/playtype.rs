use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Order in which the playlist hands out the tracks to play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayType {
    /// one by one, wrapping around at both ends
    #[default]
    Linear,
    /// uniformly random, the current track included
    Shuffle,
}

impl Display for PlayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayType::Linear => write!(f, "LINEAR"),
            PlayType::Shuffle => write!(f, "SHUFFLE"),
        }
    }
}
