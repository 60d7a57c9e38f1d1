//! minabot-avatar/src/expression.rs
//!
//! Reactive facial-expression rules driven by engine motion lifecycle
//! events: touch and completion motions get a happy face, motion end
//! restores the default. Also exposes the raw setter for chat-driven
//! expression changes.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use minabot_common::traits::AvatarEngine;

use crate::events::WidgetEvent;

pub const HAPPY_EXPRESSION: &str = "happy";

/// Group-name substrings that trigger the happy expression on motion start.
const HAPPY_TRIGGERS: [&str; 2] = ["touch", "complete"];

pub struct ExpressionReactor {
    engine: Arc<dyn AvatarEngine>,
    // Informational only; never consulted for gating.
    last_expression: Mutex<Option<String>>,
}

impl ExpressionReactor {
    pub fn new(engine: Arc<dyn AvatarEngine>) -> Self {
        Self {
            engine,
            last_expression: Mutex::new(None),
        }
    }

    pub fn last_expression(&self) -> Option<String> {
        self.last_expression.lock().unwrap().clone()
    }

    /// Apply an expression (`None` = default face). Failures are logged and
    /// swallowed, never retried.
    pub async fn set(&self, expression: Option<String>) {
        match self.engine.set_expression(expression.clone()).await {
            Ok(()) => {
                *self.last_expression.lock().unwrap() = expression;
            }
            Err(e) => {
                warn!("Failed to set expression {expression:?}: {e}");
            }
        }
    }

    pub async fn on_motion_started(&self, group: &str) {
        if HAPPY_TRIGGERS.iter().any(|t| group.contains(t)) {
            debug!("Motion group '{group}' triggers expression '{HAPPY_EXPRESSION}'");
            self.set(Some(HAPPY_EXPRESSION.to_string())).await;
        }
    }

    pub async fn on_motion_ended(&self) {
        self.set(None).await;
    }

    /// Consume bus events until the channel closes.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<WidgetEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                WidgetEvent::MotionStarted { group } => self.on_motion_started(&group).await,
                WidgetEvent::MotionEnded => self.on_motion_ended().await,
                WidgetEvent::ChatBubble { .. } => {}
            }
        }
        debug!("Expression reactor channel closed, exiting");
    }
}
