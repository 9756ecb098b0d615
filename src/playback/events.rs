use std::sync::Mutex;

use crossbeam::channel::{Receiver, Sender, unbounded};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Topic {
    #[serde(rename = "musicplayer/playlist/events/track_added_to_playlist")]
    TrackAdded,
    #[serde(rename = "musicplayer/playlist/events/track_removed_from_playlist")]
    TrackRemoved,
    #[serde(rename = "musicplayer/playlist/events/playtype_changed")]
    PlaytypeChanged,
    /// a new track started playing
    #[serde(rename = "musicplayer/events/playback")]
    Playback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub topic: Topic,
    pub payload: Value,
}

/// Fan-out of events to every subscribed client
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<Event>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = unbounded();
        self.lock().push(tx);
        rx
    }

    /// sends the event to all live subscribers, dropping the ones that hung up
    pub fn publish(&self, topic: Topic, payload: Value) {
        let event = Event { topic, payload };
        log::debug!("publish {:?}", event.topic);

        self.lock()
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<Event>>> {
        // a poisoned list of senders is still a valid list
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.publish(Topic::TrackRemoved, json!("abc"));

        for rx in [first, second] {
            let event = rx.try_recv().unwrap();
            assert_eq!(event.topic, Topic::TrackRemoved);
            assert_eq!(event.payload, json!("abc"));
        }
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        bus.publish(Topic::Playback, json!({}));

        assert_eq!(bus.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }

    #[test]
    fn test_event_wire_format() -> anyhow::Result<()> {
        let event = Event {
            topic: Topic::PlaytypeChanged,
            payload: json!("SHUFFLE"),
        };

        assert_eq!(
            serde_json::to_value(&event)?,
            json!({
                "topic": "musicplayer/playlist/events/playtype_changed",
                "payload": "SHUFFLE"
            })
        );
        Ok(())
    }
}
