use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use crossbeam::channel::Receiver;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::{
    domain::{
        playtype::PlayType,
        track::{Track, TrackId},
    },
    playback::{
        error::{PlaybackError, PlaylistError},
        events::{Event, EventBus, Topic},
        playlist::Playlist,
        timer::{Scheduler, TimerHandle},
    },
    player::Player,
    storage::{PlaylistStore, error::StorageError},
    stream_endpoint::StreamResolver,
};

/// shortest time a track is given before auto-advance, bounds the rate of player loads
pub const MIN_ADVANCE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackState {
    /// no advance timer armed
    Idle,
    Playing,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub current_track: Option<Track>,
    pub playtype: PlayType,
    pub state: PlaybackState,
}

/// Plays the playlist through the external player, advancing when a track's time is up.
///
/// Cloning gives another handle to the same controller. All mutations and
/// all calls into the player are serialized by one lock.
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<State>,
    resolver: Box<dyn StreamResolver>,
    scheduler: Box<dyn Scheduler>,
    events: EventBus,
}

struct State {
    playlist: Playlist,
    player: Box<dyn Player>,
    timer: Option<TimerHandle>,
    /// bumped on every arm and cancel, a firing timer only acts if it still matches
    generation: u64,
    store: Option<PlaylistStore>,
}

enum Direction {
    Next,
    Previous,
}

impl PlaybackController {
    pub fn new(
        player: Box<dyn Player>,
        resolver: Box<dyn StreamResolver>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    playlist: Playlist::new(),
                    player,
                    timer: None,
                    generation: 0,
                    store: None,
                }),
                resolver,
                scheduler,
                events: EventBus::new(),
            }),
        }
    }

    /// Loads the stored tracks and mirrors later adds and removes to the store.
    ///
    /// Returns the number of tracks loaded.
    pub fn attach_store(&self, store: PlaylistStore) -> Result<usize, StorageError> {
        let tracks = store.load_tracks()?;
        let mut state = self.lock();

        let loaded = tracks
            .into_iter()
            .filter_map(|track| state.playlist.add_track(track).then_some(()))
            .count();
        info!("loaded {loaded} tracks from playlist '{}'", store.name());

        state.store = Some(store);
        Ok(loaded)
    }

    pub fn subscribe(&self) -> Receiver<Event> {
        self.shared.events.subscribe()
    }

    /// Appends the track, false for a duplicate id or a track without duration.
    pub fn add_track_to_playlist(&self, track: Track) -> bool {
        if track.duration_millis == 0 {
            warn!("rejecting track {} without duration", track.id);
            return false;
        }
        let mut state = self.lock();
        let payload = to_payload(&track);

        if !state.playlist.add_track(track.clone()) {
            debug!("track {} already in playlist", track.id);
            return false;
        }

        if let Some(store) = state.store.as_mut()
            && let Err(e) = store.append_track(&track)
        {
            log::error!("failed to store track {}: {e}", track.id);
        }

        self.shared.events.publish(Topic::TrackAdded, payload);
        true
    }

    pub fn remove_track_from_playlist(&self, track_id: &TrackId) -> bool {
        let mut state = self.lock();

        if !state.playlist.remove_track(track_id) {
            return false;
        }

        if let Some(store) = state.store.as_mut()
            && let Err(e) = store.remove_track(track_id)
        {
            log::error!("failed to remove track {track_id} from store: {e}");
        }

        self.shared
            .events
            .publish(Topic::TrackRemoved, Value::String(track_id.to_string()));
        true
    }

    pub fn get_tracks(&self) -> Vec<Track> {
        self.lock().playlist.get_tracks()
    }

    pub fn get_current_track_id(&self) -> Result<TrackId, PlaylistError> {
        self.lock().playlist.get_current_track_id().cloned()
    }

    pub fn set_playtype(&self, playtype: PlayType) {
        self.lock().playlist.set_playtype(playtype);
        info!("playtype set to {playtype}");
        self.shared
            .events
            .publish(Topic::PlaytypeChanged, to_payload(&playtype));
    }

    pub fn get_playtype(&self) -> PlayType {
        self.lock().playlist.get_playtype()
    }

    pub fn state(&self) -> PlaybackState {
        Self::state_of(&self.lock())
    }

    pub fn status(&self) -> Status {
        let state = self.lock();
        Status {
            current_track: state.playlist.get_current_track().ok().cloned(),
            playtype: state.playlist.get_playtype(),
            state: Self::state_of(&state),
        }
    }

    /// Starts the track and arms the advance timer for its duration.
    ///
    /// On failure nothing changes: the cursor, the armed timer and the
    /// player keep their previous state.
    pub fn play_track(&self, track_id: &TrackId) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        self.play_locked(&mut state, track_id)
    }

    pub fn play_next_track(&self) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        self.advance_locked(&mut state, Direction::Next)
    }

    pub fn play_previous_track(&self) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        self.advance_locked(&mut state, Direction::Previous)
    }

    /// replays the track under the cursor
    pub fn play(&self) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        let track_id = state.playlist.get_current_track_id()?.clone();
        self.play_locked(&mut state, &track_id)
    }

    pub fn stop(&self) {
        let mut state = self.lock();
        Self::cancel_timer(&mut state);

        if let Err(e) = state.player.stop() {
            warn!("player failed to stop: {e}");
        }
    }

    fn advance_locked(&self, state: &mut State, direction: Direction) -> Result<(), PlaybackError> {
        let track_id = match direction {
            Direction::Next => state.playlist.get_next_track_id()?,
            Direction::Previous => state.playlist.get_previous_track_id()?,
        }
        .clone();
        self.play_locked(state, &track_id)
    }

    fn play_locked(&self, state: &mut State, track_id: &TrackId) -> Result<(), PlaybackError> {
        let track = state
            .playlist
            .get_track(track_id)
            .cloned()
            .ok_or_else(|| PlaybackError::NotFound(track_id.clone()))?;

        let resolver = &self.shared.resolver;
        let url = resolver
            .resolve_stream_url(&track, resolver.device_id())
            .inspect_err(|e| warn!("could not resolve track {}: {e}", track.id))?;

        state
            .player
            .load(&url)
            .inspect_err(|e| warn!("player could not load {url}: {e}"))?;

        state.playlist.set_current_track(track_id);
        self.arm_timer(state, track.duration());

        info!("playing {} - {} : {}", track.artist, track.title, url);
        self.shared
            .events
            .publish(Topic::Playback, to_payload(&track));
        Ok(())
    }

    fn arm_timer(&self, state: &mut State, duration: Duration) {
        Self::cancel_timer(state);
        let delay = duration.max(MIN_ADVANCE_DELAY);
        let generation = state.generation;

        let shared = Arc::downgrade(&self.shared);
        let handle = self.shared.scheduler.schedule(
            delay,
            Box::new(move || Self::on_timer_expired(shared, generation)),
        );
        debug!("advance timer {generation} armed for {delay:?}");

        state.timer = Some(handle);
    }

    fn cancel_timer(state: &mut State) {
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            debug!("advance timer cancelled");
            timer.cancel();
        }
    }

    fn on_timer_expired(shared: Weak<Shared>, generation: u64) {
        // controller already dropped
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let controller = Self { shared };
        let mut state = controller.lock();

        if state.generation != generation {
            debug!("stale advance timer {generation} ignored");
            return;
        }
        state.timer = None;

        if let Err(e) = controller.advance_locked(&mut state, Direction::Next) {
            warn!("auto-advance failed, playback is idle: {e}");
            state.generation += 1;
        }
    }

    fn state_of(state: &State) -> PlaybackState {
        match state.timer {
            Some(_) => PlaybackState::Playing,
            None => PlaybackState::Idle,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // every mutation is all-or-nothing, so a poisoned state is still consistent
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn to_payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!("could not encode event payload: {e}");
        Value::Null
    })
}
