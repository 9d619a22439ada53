//! # Notification Bus
//!
//! Provides publish/subscribe coordination between independently mounted
//! components using `tokio::sync::broadcast`. Events are strongly typed: each
//! domain defines its own event enum and implements [`Event`] to name the
//! topic every variant is published under.
//!
//! ## Overview
//!
//! The notification bus consists of:
//! - **Event trait**: Maps a typed payload to a named topic (e.g. `lyrics:created`)
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with topic or predicate filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     emit      ┌───────────┐
//! │ List        ├──────────────>│           │     subscribe    ┌────────────┐
//! └─────────────┘               │ EventBus  ├─────────────────>│ Editor     │
//!                               │ (broadcast│                  └────────────┘
//! ┌─────────────┐     emit      │  channel) │     subscribe    ┌────────────┐
//! │ Editor      ├──────────────>│           ├─────────────────>│ List       │
//! └─────────────┘               └───────────┘                  └────────────┘
//! ```
//!
//! Publishers never know who listens. A component that is not mounted simply
//! has no receiver, and publishing with no receivers is not an error worth
//! surfacing (callers use `emit(..).ok()`).
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{Event, EventBus, EventStream};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Note {
//!     Played { key: u8 },
//!     Released { key: u8 },
//! }
//!
//! impl Event for Note {
//!     fn topic(&self) -> &'static str {
//!         match self {
//!             Note::Played { .. } => "note:played",
//!             Note::Released { .. } => "note:released",
//!         }
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::<Note>::new(16);
//! let mut played = EventStream::new(bus.subscribe()).topics(&["note:played"]);
//!
//! bus.emit(Note::Released { key: 60 }).ok();
//! bus.emit(Note::Played { key: 64 }).ok();
//!
//! assert_eq!(played.recv().await.unwrap(), Note::Played { key: 64 });
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.

use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the bus channel.
///
/// Subscribers that fall further behind than this receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// A payload that can travel over an [`EventBus`].
///
/// The topic is the stable, human-readable name subscribers filter on.
pub trait Event: Clone + Send + Sync + fmt::Debug + 'static {
    /// Topic name this event is published under.
    fn topic(&self) -> &'static str;

    /// Level the bus logs this event at when it is emitted.
    fn severity(&self) -> EventSeverity {
        EventSeverity::Debug
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

impl EventSeverity {
    pub fn level(self) -> tracing::Level {
        match self {
            EventSeverity::Debug => tracing::Level::DEBUG,
            EventSeverity::Info => tracing::Level::INFO,
            EventSeverity::Warning => tracing::Level::WARN,
            EventSeverity::Error => tracing::Level::ERROR,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central bus for publishing and subscribing to events of type `E`.
///
/// Cloning the bus yields another handle to the same channel.
pub struct EventBus<E: Event> {
    sender: broadcast::Sender<E>,
}

impl<E: Event> EventBus<E> {
    /// Creates a new bus with the specified per-subscriber buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if nobody is subscribed.
    pub fn emit(&self, event: E) -> Result<usize, SendError<E>> {
        let topic = event.topic();
        match event.severity() {
            EventSeverity::Debug => tracing::debug!(topic, "Emitting event"),
            EventSeverity::Info => tracing::info!(topic, "Emitting event"),
            EventSeverity::Warning => tracing::warn!(topic, "Emitting event"),
            EventSeverity::Error => tracing::error!(topic, "Emitting event"),
        }
        self.sender.send(event)
    }

    /// Creates a new receiver for all future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<E> {
        self.sender.subscribe()
    }

    /// Creates a filtered stream that only yields the given topics.
    pub fn subscribe_topics(&self, topics: &'static [&'static str]) -> EventStream<E> {
        EventStream::new(self.subscribe()).topics(topics)
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Event> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl<E: Event> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with filtering capabilities.
pub struct EventStream<E: Event> {
    receiver: Receiver<E>,
    filter: Option<EventFilter<E>>,
}

impl<E: Event> EventStream<E> {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<E>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only yield events matching `predicate`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Only yield events whose topic is one of `topics`.
    pub fn topics(self, topics: &'static [&'static str]) -> Self {
        self.filter(move |event| topics.contains(&event.topic()))
    }

    fn accepts(&self, event: &E) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<E, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no matching events are currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<E, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl<E: Event> fmt::Debug for EventStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
