//! Ordered, uniquely keyed list of tracks with a traversal cursor

use std::collections::HashMap;

use rand::Rng;

use crate::{
    domain::{
        playtype::PlayType,
        track::{Track, TrackId},
    },
    playback::error::PlaylistError,
};

/// Single source of truth for "what plays next".
///
/// `order` and `tracks` always hold the same set of ids, and `cursor` is a
/// valid index into `order` whenever the playlist is not empty.
#[derive(Debug, Default)]
pub struct Playlist {
    order: Vec<TrackId>,
    tracks: HashMap<TrackId, Track>,
    cursor: usize,
    /// the current track was removed and the cursor already sits on its successor
    cursor_on_successor: bool,
    playtype: PlayType,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// builds a playlist in the given order, later duplicates are dropped
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut playlist = Self::new();
        for track in tracks {
            playlist.add_track(track);
        }
        playlist
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn set_playtype(&mut self, playtype: PlayType) {
        self.playtype = playtype;
    }

    pub fn get_playtype(&self) -> PlayType {
        self.playtype
    }

    /// Appends the track. Every track id can only be added once.
    ///
    /// Returns false if the id is already present.
    pub fn add_track(&mut self, track: Track) -> bool {
        if self.tracks.contains_key(&track.id) {
            return false;
        }

        self.order.push(track.id.clone());
        self.tracks.insert(track.id.clone(), track);
        true
    }

    /// Removes the track from order and lookup.
    ///
    /// The cursor keeps pointing at the same track if an earlier one is
    /// removed. Removing the current track leaves the cursor on its
    /// successor, and the next linear step then lands on that successor
    /// instead of skipping it. Removing the tail moves the cursor back to
    /// the new last track.
    pub fn remove_track(&mut self, track_id: &TrackId) -> bool {
        let Some(index) = self.position(track_id) else {
            return false;
        };

        self.order.remove(index);
        self.tracks.remove(track_id);

        if index < self.cursor {
            self.cursor -= 1;
        } else if index == self.cursor {
            // a removed tail has no successor, the cursor falls back to the new tail
            self.cursor_on_successor = index < self.order.len();
        }
        self.cursor = self.cursor.min(self.order.len().saturating_sub(1));
        true
    }

    pub fn get_track(&self, track_id: &TrackId) -> Option<&Track> {
        self.tracks.get(track_id)
    }

    /// all tracks in playlist order
    pub fn get_tracks(&self) -> Vec<Track> {
        self.order
            .iter()
            .filter_map(|id| self.tracks.get(id))
            .cloned()
            .collect()
    }

    /// moves the cursor to the track, false if it is not in the playlist
    pub fn set_current_track(&mut self, track_id: &TrackId) -> bool {
        match self.position(track_id) {
            Some(index) => {
                self.cursor = index;
                self.cursor_on_successor = false;
                true
            }
            None => false,
        }
    }

    pub fn get_current_track_id(&self) -> Result<&TrackId, PlaylistError> {
        self.order
            .get(self.cursor)
            .ok_or(PlaylistError::EmptyPlaylist)
    }

    pub fn get_current_track(&self) -> Result<&Track, PlaylistError> {
        let id = self.get_current_track_id()?;
        self.tracks
            .get(id)
            .ok_or_else(|| PlaylistError::NotFound(id.clone()))
    }

    /// Id of the track after the cursor. Does not move the cursor.
    pub fn get_next_track_id(&self) -> Result<&TrackId, PlaylistError> {
        let len = self.non_empty_len()?;
        let index = match self.playtype {
            PlayType::Linear if self.cursor_on_successor => self.cursor,
            PlayType::Linear => (self.cursor + 1) % len,
            PlayType::Shuffle => rand::rng().random_range(0..len),
        };
        Ok(&self.order[index])
    }

    /// Id of the track before the cursor. Does not move the cursor.
    pub fn get_previous_track_id(&self) -> Result<&TrackId, PlaylistError> {
        let len = self.non_empty_len()?;
        let index = match self.playtype {
            PlayType::Linear => (self.cursor + len - 1) % len,
            PlayType::Shuffle => rand::rng().random_range(0..len),
        };
        Ok(&self.order[index])
    }

    fn non_empty_len(&self) -> Result<usize, PlaylistError> {
        match self.order.len() {
            0 => Err(PlaylistError::EmptyPlaylist),
            len => Ok(len),
        }
    }

    fn position(&self, track_id: &TrackId) -> Option<usize> {
        self.order.iter().position(|id| id == track_id)
    }
}

#[cfg(test)]
pub(crate) fn mock_track(id: &str, duration_secs: u64) -> Track {
    Track {
        id: TrackId::from(id),
        title: format!("Title {id}"),
        artist: format!("Artist {id}"),
        album: None,
        duration_millis: duration_secs * 1000,
        store_id: format!("store-{id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(playlist: &Playlist) -> Vec<String> {
        playlist
            .get_tracks()
            .into_iter()
            .map(|t| t.id.0)
            .collect()
    }

    fn playlist_of(names: &[&str]) -> Playlist {
        Playlist::from_tracks(names.iter().map(|n| mock_track(n, 10)))
    }

    #[test]
    fn test_add_keeps_first_insertion_order() {
        let mut playlist = Playlist::new();

        assert!(playlist.add_track(mock_track("a", 1)));
        assert!(playlist.add_track(mock_track("b", 1)));
        assert!(!playlist.add_track(mock_track("a", 99)));
        assert!(playlist.add_track(mock_track("c", 1)));

        assert_eq!(ids(&playlist), vec!["a", "b", "c"]);
        // the stored payload is the first one
        assert_eq!(
            playlist.get_track(&TrackId::from("a")).unwrap().duration_millis,
            1000
        );
    }

    #[test]
    fn test_add_twice_leaves_length_at_one() {
        let mut playlist = Playlist::new();

        assert!(playlist.add_track(mock_track("x", 1)));
        assert!(!playlist.add_track(mock_track("x", 1)));

        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn test_remove_present_and_absent() {
        let mut playlist = playlist_of(&["a", "b", "c"]);

        assert!(playlist.remove_track(&TrackId::from("b")));
        assert_eq!(ids(&playlist), vec!["a", "c"]);
        assert!(playlist.get_track(&TrackId::from("b")).is_none());

        assert!(!playlist.remove_track(&TrackId::from("b")));
        assert_eq!(ids(&playlist), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_before_cursor_keeps_current_track() {
        let mut playlist = playlist_of(&["a", "b", "c"]);
        playlist.set_current_track(&TrackId::from("c"));

        playlist.remove_track(&TrackId::from("a"));

        assert_eq!(playlist.get_current_track_id().unwrap().as_str(), "c");
    }

    #[test]
    fn test_remove_current_moves_to_successor() {
        let mut playlist = playlist_of(&["a", "b", "c"]);
        playlist.set_current_track(&TrackId::from("b"));

        playlist.remove_track(&TrackId::from("b"));

        assert_eq!(playlist.get_current_track_id().unwrap().as_str(), "c");
    }

    #[test]
    fn test_next_after_removing_current_is_its_successor() {
        let mut playlist = playlist_of(&["a", "b", "c"]);
        playlist.set_current_track(&TrackId::from("b"));

        playlist.remove_track(&TrackId::from("b"));

        assert_eq!(playlist.get_next_track_id().unwrap().as_str(), "c");
        assert_eq!(playlist.get_previous_track_id().unwrap().as_str(), "a");

        // once the successor plays, stepping is normal again
        playlist.set_current_track(&TrackId::from("c"));
        assert_eq!(playlist.get_next_track_id().unwrap().as_str(), "a");
    }

    #[test]
    fn test_next_after_removing_current_tail_wraps() {
        let mut playlist = playlist_of(&["a", "b", "c"]);
        playlist.set_current_track(&TrackId::from("c"));

        playlist.remove_track(&TrackId::from("c"));

        assert_eq!(playlist.get_next_track_id().unwrap().as_str(), "a");
    }

    #[test]
    fn test_removing_successor_tail_after_current_wraps() {
        let mut playlist = playlist_of(&["a", "b", "c"]);
        playlist.set_current_track(&TrackId::from("b"));
        playlist.remove_track(&TrackId::from("b"));

        playlist.remove_track(&TrackId::from("c"));

        assert_eq!(playlist.get_current_track_id().unwrap().as_str(), "a");
        assert_eq!(playlist.get_next_track_id().unwrap().as_str(), "a");
    }

    #[test]
    fn test_remove_current_tail_clamps_cursor() {
        let mut playlist = playlist_of(&["a", "b", "c"]);
        playlist.set_current_track(&TrackId::from("c"));

        playlist.remove_track(&TrackId::from("c"));

        assert_eq!(playlist.get_current_track_id().unwrap().as_str(), "b");
    }

    #[test]
    fn test_remove_last_track_empties_playlist() {
        let mut playlist = playlist_of(&["a"]);

        assert!(playlist.remove_track(&TrackId::from("a")));

        assert!(playlist.is_empty());
        assert_eq!(
            playlist.get_current_track_id(),
            Err(PlaylistError::EmptyPlaylist)
        );
    }

    #[test]
    fn test_set_current_track_unknown_id() {
        let mut playlist = playlist_of(&["a", "b"]);
        playlist.set_current_track(&TrackId::from("b"));

        assert!(!playlist.set_current_track(&TrackId::from("zzz")));
        assert_eq!(playlist.get_current_track_id().unwrap().as_str(), "b");
    }

    #[test]
    fn test_linear_next_cycles() {
        let mut playlist = playlist_of(&["a", "b", "c"]);
        let mut visited = Vec::new();

        for _ in 0..7 {
            let next = playlist.get_next_track_id().unwrap().clone();
            visited.push(next.0.clone());
            playlist.set_current_track(&next);
        }

        assert_eq!(visited, vec!["b", "c", "a", "b", "c", "a", "b"]);
    }

    #[test]
    fn test_next_does_not_move_cursor() {
        let playlist = playlist_of(&["a", "b"]);

        playlist.get_next_track_id().unwrap();
        playlist.get_previous_track_id().unwrap();

        assert_eq!(playlist.get_current_track_id().unwrap().as_str(), "a");
    }

    #[test]
    fn test_linear_previous_wraps_to_tail() {
        let playlist = playlist_of(&["a", "b", "c"]);

        assert_eq!(playlist.get_previous_track_id().unwrap().as_str(), "c");
    }

    #[test]
    fn test_linear_previous_steps_back() {
        let mut playlist = playlist_of(&["a", "b", "c"]);
        playlist.set_current_track(&TrackId::from("c"));

        assert_eq!(playlist.get_previous_track_id().unwrap().as_str(), "b");
    }

    #[test]
    fn test_single_track_linear_points_at_itself() {
        let playlist = playlist_of(&["only"]);

        assert_eq!(playlist.get_next_track_id().unwrap().as_str(), "only");
        assert_eq!(playlist.get_previous_track_id().unwrap().as_str(), "only");
    }

    #[test]
    fn test_shuffle_always_returns_member() {
        let mut playlist = playlist_of(&["a", "b", "c", "d"]);
        playlist.set_playtype(PlayType::Shuffle);

        for _ in 0..200 {
            let next = playlist.get_next_track_id().unwrap();
            assert!(playlist.get_track(next).is_some());
            let previous = playlist.get_previous_track_id().unwrap();
            assert!(playlist.get_track(previous).is_some());
        }
    }

    #[test]
    fn test_positional_ops_on_empty_playlist() {
        let playlist = Playlist::new();

        assert_eq!(
            playlist.get_next_track_id(),
            Err(PlaylistError::EmptyPlaylist)
        );
        assert_eq!(
            playlist.get_previous_track_id(),
            Err(PlaylistError::EmptyPlaylist)
        );
        assert!(playlist.get_current_track().is_err());
    }

    #[test]
    fn test_playtype_defaults_to_linear() {
        let mut playlist = Playlist::new();
        assert_eq!(playlist.get_playtype(), PlayType::Linear);

        playlist.set_playtype(PlayType::Shuffle);
        assert_eq!(playlist.get_playtype(), PlayType::Shuffle);
    }
}
