//! Notifications exchanged between the lyrics components.

use crate::models::Lyrics;
use core_runtime::events::{Event, EventBus, EventSeverity, SendError};
use tracing::debug;

/// Topic names carried by [`LyricsEvent`].
pub mod topics {
    pub const CREATE: &str = "lyrics:create";
    pub const SELECTED: &str = "lyrics:selected";
    pub const CREATED: &str = "lyrics:created";
    pub const UPDATED: &str = "lyrics:updated";
    pub const DELETED: &str = "lyrics:deleted";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsEvent {
    /// The user asked for a blank editor.
    CreateRequested,
    /// A document was picked for editing.
    Selected { lyrics: Lyrics },
    Created { lyrics: Lyrics },
    Updated { lyrics: Lyrics },
    Deleted { lyrics_id: String },
}

impl Event for LyricsEvent {
    fn topic(&self) -> &'static str {
        match self {
            LyricsEvent::CreateRequested => topics::CREATE,
            LyricsEvent::Selected { .. } => topics::SELECTED,
            LyricsEvent::Created { .. } => topics::CREATED,
            LyricsEvent::Updated { .. } => topics::UPDATED,
            LyricsEvent::Deleted { .. } => topics::DELETED,
        }
    }

    fn severity(&self) -> EventSeverity {
        match self {
            LyricsEvent::CreateRequested | LyricsEvent::Selected { .. } => EventSeverity::Debug,
            _ => EventSeverity::Info,
        }
    }
}

pub type LyricsBus = EventBus<LyricsEvent>;

/// Emits `event`, tolerating a bus nobody listens to.
pub(crate) fn publish(bus: &LyricsBus, event: LyricsEvent) {
    let topic = event.topic();
    match bus.emit(event) {
        Ok(receivers) => debug!(topic, receivers, "Published lyrics event"),
        Err(SendError(_)) => debug!(topic, "No listeners for lyrics event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        assert_eq!(LyricsEvent::CreateRequested.topic(), "lyrics:create");
        assert_eq!(
            LyricsEvent::Deleted {
                lyrics_id: "x".into()
            }
            .topic(),
            "lyrics:deleted"
        );
    }

    #[tokio::test]
    async fn test_publish_without_listeners() {
        let bus = LyricsBus::new(8);
        publish(&bus, LyricsEvent::CreateRequested);

        let mut stream = bus.subscribe_topics(&[topics::CREATE]);
        publish(
            &bus,
            LyricsEvent::Deleted {
                lyrics_id: "x".into(),
            },
        );
        publish(&bus, LyricsEvent::CreateRequested);
        assert_eq!(stream.recv().await.unwrap(), LyricsEvent::CreateRequested);
    }
}
