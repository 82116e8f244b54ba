//! Change notifications for snapshot consumers.
//!
//! The session core does not prescribe a notification transport; it promises
//! only that a snapshot reflects all completed transitions at the moment it
//! is taken. For consumers that prefer push over polling, [`EventHub`] fans
//! out one [`SessionEvent`] per applied transition over a Tokio broadcast
//! channel. Slow subscribers lag and lose events (counted, never blocking a
//! producer) — an event is a hint to take a fresh snapshot, not a substitute
//! for one.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, Receiver, Sender};
use tokio::time::timeout;

use crate::types::{DocumentId, DocumentStatus, QaId, QaStatus};

/// One applied state transition, as observed by subscribers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A document was created in the `Uploading` state.
    DocumentCreated { id: DocumentId },
    /// A document's lifecycle status changed.
    DocumentStatusChanged {
        id: DocumentId,
        status: DocumentStatus,
    },
    /// A document was removed by an explicit delete.
    DocumentDeleted { id: DocumentId },
    /// The selection moved (or was cleared by a delete).
    SelectionChanged { id: Option<DocumentId> },
    /// A question was appended to a document's history as `Pending`.
    QuestionAsked { document: DocumentId, qa: QaId },
    /// A question reached a terminal status.
    QuestionResolved {
        document: DocumentId,
        qa: QaId,
        status: QaStatus,
    },
    /// Logout cleared the session.
    SessionCleared,
}

impl SessionEvent {
    /// Compact JSON rendering, for sinks that forward events over the wire.
    ///
    /// # Example
    ///
    /// ```
    /// use docweave::events::SessionEvent;
    ///
    /// let json = SessionEvent::SessionCleared.to_json_string().unwrap();
    /// assert!(json.contains("\"kind\":\"session_cleared\""));
    /// ```
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Short label for the event kind, for log lines and filtering.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DocumentCreated { .. } => "document_created",
            Self::DocumentStatusChanged { .. } => "document_status_changed",
            Self::DocumentDeleted { .. } => "document_deleted",
            Self::SelectionChanged { .. } => "selection_changed",
            Self::QuestionAsked { .. } => "question_asked",
            Self::QuestionResolved { .. } => "question_resolved",
            Self::SessionCleared => "session_cleared",
        }
    }
}

/// Broadcast fan-out point for [`SessionEvent`]s.
///
/// Cheap to share (`Arc`); producers publish without blocking, subscribers
/// receive through [`EventStream`]. Events published while no subscriber
/// exists are dropped silently — polling consumers never pay for the hub.
#[derive(Debug)]
pub struct EventHub {
    sender: Sender<SessionEvent>,
    dropped_events: AtomicUsize,
    capacity: usize,
}

impl EventHub {
    pub fn new(capacity: usize) -> Arc<Self> {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Arc::new(Self {
            sender,
            dropped_events: AtomicUsize::new(0),
            capacity,
        })
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers reached; zero (including the
    /// no-subscriber case) is not an error.
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(self: &Arc<Self>) -> EventStream {
        EventStream {
            receiver: self.sender.subscribe(),
            hub: Arc::clone(self),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events lost to subscriber lag since the hub was created.
    pub fn dropped(&self) -> usize {
        self.dropped_events.load(Ordering::Relaxed)
    }
}

/// A subscription to the session's event feed.
#[derive(Debug)]
pub struct EventStream {
    receiver: Receiver<SessionEvent>,
    hub: Arc<EventHub>,
}

impl EventStream {
    pub async fn recv(&mut self) -> Result<SessionEvent, broadcast::error::RecvError> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                self.hub
                    .dropped_events
                    .fetch_add(missed as usize, Ordering::Relaxed);
                Err(broadcast::error::RecvError::Lagged(missed))
            }
            Err(err) => Err(err),
        }
    }

    pub fn try_recv(&mut self) -> Result<SessionEvent, broadcast::error::TryRecvError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(event),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                self.hub
                    .dropped_events
                    .fetch_add(missed as usize, Ordering::Relaxed);
                Err(broadcast::error::TryRecvError::Lagged(missed))
            }
            Err(err) => Err(err),
        }
    }

    /// Receive with a deadline, skipping over lag gaps; `None` on timeout or
    /// hub shutdown.
    pub async fn next_timeout(&mut self, duration: Duration) -> Option<SessionEvent> {
        loop {
            match timeout(duration, self.recv()).await {
                Ok(Ok(event)) => return Some(event),
                Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
                Ok(Err(broadcast::error::RecvError::Closed)) => return None,
                Err(_) => return None,
            }
        }
    }

    /// Adapt into a `futures_util` stream, skipping over lag gaps.
    pub fn into_async_stream(self) -> impl futures_util::stream::Stream<Item = SessionEvent> {
        stream::unfold(self, |mut stream| async move {
            loop {
                match stream.recv().await {
                    Ok(event) => return Some((event, stream)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentId;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let hub = EventHub::new(8);
        let mut stream = hub.subscribe();
        let id = DocumentId::new();
        assert_eq!(hub.publish(SessionEvent::DocumentCreated { id }), 1);
        assert_eq!(
            stream.recv().await.unwrap(),
            SessionEvent::DocumentCreated { id }
        );
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_benign() {
        let hub = EventHub::new(8);
        assert_eq!(hub.publish(SessionEvent::SessionCleared), 0);
    }

    #[tokio::test]
    async fn lag_is_counted_not_fatal() {
        let hub = EventHub::new(1);
        let mut stream = hub.subscribe();
        for _ in 0..4 {
            hub.publish(SessionEvent::SessionCleared);
        }
        // First recv reports the lag, subsequent recv yields the survivor.
        let lagged = stream.recv().await;
        assert!(matches!(
            lagged,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert!(hub.dropped() > 0);
        assert_eq!(stream.recv().await.unwrap(), SessionEvent::SessionCleared);
    }
}
