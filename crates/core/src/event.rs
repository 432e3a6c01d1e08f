//! Widget change notifications.
//!
//! Rendering surfaces subscribe here to learn when to redraw (and scroll to
//! the newest message) instead of polling the state. A subscription lives as
//! long as its receiver; dropping it is the only cleanup needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::message::Role;

/// Everything observable that can happen to a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WidgetEvent {
    /// The transcript grew by one message
    MessageAppended {
        index: usize,
        role: Role,
        is_error: bool,
        timestamp: DateTime<Utc>,
    },

    /// The transcript was emptied
    TranscriptCleared { timestamp: DateTime<Utc> },

    /// A request cycle started or finished
    BusyChanged {
        busy: bool,
        timestamp: DateTime<Utc>,
    },

    /// The transcript panel was shown or hidden
    VisibilityChanged {
        open: bool,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for widget events.
///
/// Uses `tokio::sync::broadcast`, so several surfaces can watch one widget.
pub struct EventBus {
    sender: broadcast::Sender<Arc<WidgetEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: WidgetEvent) {
        // No subscribers is fine: nobody is rendering.
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<WidgetEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
