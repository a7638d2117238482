//! # Notification Channel
//!
//! Stores and orchestrators never render anything; they emit events on a
//! broadcast channel and whatever UI is attached decides how to present
//! them. This keeps presentation concerns out of store actions entirely.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   checkout / guards / stores                                    │
//! │        │ toast("Order created successfully!")                   │
//! │        │ navigate("/orders/42")                                 │
//! │        ▼                                                        │
//! │   Notifier (broadcast)  ──►  UI subscriber (toasts, router)     │
//! │                         ──►  another subscriber (logging, ...)  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A loading toast keeps its handle id, so a later `update` with the same
//! id replaces it in place ("Adding item..." becomes "Item added").

use tokio::sync::broadcast;
use uuid::Uuid;

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
    Loading,
}

/// A single toast event.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Stable handle: updates re-use the id of the toast they replace.
    pub id: Uuid,
    pub level: Level,
    pub message: String,
}

/// Events the UI layer subscribes to.
#[derive(Debug, Clone)]
pub enum UiEvent {
    Toast(Notification),
    Navigate { to: String },
}

/// Broadcast sender for UI events. Cheap to clone; all clones share one
/// channel.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<UiEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Notifier { tx }
    }

    /// Subscribes to the event stream. Events emitted while no subscriber
    /// exists are dropped; that is fine for presentation concerns.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// Emits a toast, returning its handle for later updates.
    pub fn toast(&self, level: Level, message: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        let _ = self.tx.send(UiEvent::Toast(Notification {
            id,
            level,
            message: message.into(),
        }));
        id
    }

    /// Replaces an existing toast (same handle, new content).
    pub fn update(&self, id: Uuid, level: Level, message: impl Into<String>) {
        let _ = self.tx.send(UiEvent::Toast(Notification {
            id,
            level,
            message: message.into(),
        }));
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.toast(Level::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.toast(Level::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.toast(Level::Error, message)
    }

    pub fn loading(&self, message: impl Into<String>) -> Uuid {
        self.toast(Level::Loading, message)
    }

    /// Asks the UI to navigate to a route.
    pub fn navigate(&self, to: impl Into<String>) {
        let _ = self.tx.send(UiEvent::Navigate { to: to.into() });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_toast_and_update_share_handle() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        let handle = notifier.loading("Adding item to cart...");
        notifier.update(handle, Level::Success, "Item added to cart");

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();

        match (first, second) {
            (UiEvent::Toast(a), UiEvent::Toast(b)) => {
                assert_eq!(a.id, b.id);
                assert_eq!(a.level, Level::Loading);
                assert_eq!(b.level, Level::Success);
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_navigate_event() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.navigate("/orders/42");

        match rx.recv().await.unwrap() {
            UiEvent::Navigate { to } => assert_eq!(to, "/orders/42"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_emit_without_subscriber_is_fine() {
        let notifier = Notifier::new();
        notifier.error("nobody is listening");
    }
}
