//! minabot-avatar/src/events.rs
//!
//! Provides an in-process event bus that supports guaranteed delivery
//! to multiple subscribers via bounded MPSC queues. The host page's
//! display layer (chat bubbles, UI labels) subscribes here, as does the
//! expression reactor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::warn;

use minabot_common::models::AudioRef;

/// Widget-wide event type.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    /// The rendering engine began playing a motion from the named group.
    MotionStarted { group: String },

    /// The rendering engine finished (or cancelled) the current motion.
    MotionEnded,

    /// A chat-backend reply to surface as a speech bubble. `audio` points at
    /// generated speech the host can play and lip-sync.
    ChatBubble {
        message: String,
        audio: Option<AudioRef>,
        timestamp: DateTime<Utc>,
    },
}

impl WidgetEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            WidgetEvent::MotionStarted { .. } => "motion_started",
            WidgetEvent::MotionEnded => "motion_ended",
            WidgetEvent::ChatBubble { .. } => "chat_bubble",
        }
    }
}

/// Each subscriber gets its own `mpsc::Sender<WidgetEvent>` for guaranteed
/// delivery.
///
/// - If the subscriber's channel buffer fills, `publish` will await
///   until there's space (backpressure).
/// - Subscribers that dropped their `Receiver` are pruned on the next
///   `publish`; they never block or fail delivery to the others.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<WidgetEvent>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Default size for each subscriber's buffer.
const DEFAULT_BUFFER_SIZE: usize = 256;

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Returns a receiver on which events will be delivered.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<WidgetEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    /// Publish an event to all live subscribers, dropping dead ones.
    pub async fn publish(&self, event: WidgetEvent) {
        let mut subs = self.subscribers.lock().await;
        subs.retain(|s| !s.is_closed());
        for s in subs.iter() {
            if let Err(e) = s.send(event.clone()).await {
                warn!("Dropping {} event for a closed subscriber: {e}", event.event_type());
            }
        }
    }

    /// Number of live subscriber channels.
    pub async fn subscriber_count(&self) -> usize {
        let mut subs = self.subscribers.lock().await;
        subs.retain(|s| !s.is_closed());
        subs.len()
    }

    /// Convenience method: publish a `ChatBubble` event stamped now.
    pub async fn publish_bubble(&self, message: &str, audio: Option<AudioRef>) {
        self.publish(WidgetEvent::ChatBubble {
            message: message.to_string(),
            audio,
            timestamp: Utc::now(),
        })
        .await;
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
