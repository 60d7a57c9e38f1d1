//! minabot-avatar/src/chat.rs
//!
//! Reaction to inbound chat-backend replies: surface the message as a
//! bubble, apply a requested expression, and optionally kick off a random
//! idle motion. Transport is the host's problem; this module starts at the
//! decoded (or raw JSON) message.

use std::sync::Arc;

use tracing::{debug, warn};

use minabot_common::models::{ChatReply, MotionCategory, MotionPriority};

use crate::events::EventBus;
use crate::expression::ExpressionReactor;
use crate::player::MotionPlayer;
use crate::Result;

pub struct ChatDispatcher {
    bus: EventBus,
    player: Arc<MotionPlayer>,
    reactor: Arc<ExpressionReactor>,
}

impl ChatDispatcher {
    pub fn new(bus: EventBus, player: Arc<MotionPlayer>, reactor: Arc<ExpressionReactor>) -> Self {
        Self {
            bus,
            player,
            reactor,
        }
    }

    /// Decode a raw JSON payload from the chat socket and dispatch it.
    pub async fn handle_raw(&self, raw: &str) -> Result<()> {
        let reply: ChatReply = serde_json::from_str(raw)?;
        self.handle_reply(reply).await;
        Ok(())
    }

    /// React to one backend reply. The bubble is always published; the
    /// expression and motion reactions are best-effort.
    pub async fn handle_reply(&self, reply: ChatReply) {
        debug!("Chat reply: {:?}", reply.message);
        self.bus
            .publish_bubble(&reply.message, reply.audio.clone())
            .await;

        if let Some(expression) = reply.expression {
            debug!("Chat reply requests expression '{expression}'");
            self.reactor.set(Some(expression)).await;
        }

        if reply.motion {
            debug!("Chat reply requests a motion");
            if let Err(e) = self
                .player
                .play_random(MotionCategory::Idle, MotionPriority::IDLE)
                .await
            {
                warn!("Chat-triggered motion failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MotionCatalog;
    use crate::events::WidgetEvent;
    use crate::test_support::{FakeEngine, FixedRng};
    use crate::AvatarError;

    fn dispatcher_with(engine: Arc<FakeEngine>) -> (ChatDispatcher, EventBus) {
        let bus = EventBus::new();
        let player = Arc::new(MotionPlayer::new(
            engine.clone(),
            Arc::new(MotionCatalog::with_default_groups()),
            Arc::new(FixedRng(0.0)),
        ));
        let reactor = Arc::new(ExpressionReactor::new(engine));
        (ChatDispatcher::new(bus.clone(), player, reactor), bus)
    }

    #[tokio::test]
    async fn bubble_is_always_published() {
        let engine = Arc::new(FakeEngine::new());
        let (dispatcher, bus) = dispatcher_with(engine.clone());
        let mut rx = bus.subscribe(None).await;

        dispatcher
            .handle_reply(ChatReply {
                message: "Yay! Let's have some fun together!".into(),
                expression: None,
                motion: false,
                audio: None,
            })
            .await;

        match rx.recv().await.unwrap() {
            WidgetEvent::ChatBubble { message, .. } => {
                assert_eq!(message, "Yay! Let's have some fun together!");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn expression_and_motion_requests_reach_the_engine() {
        let engine = Arc::new(FakeEngine::new());
        let (dispatcher, _bus) = dispatcher_with(engine.clone());

        dispatcher
            .handle_reply(ChatReply {
                message: "hello".into(),
                expression: Some("happy".into()),
                motion: true,
                audio: None,
            })
            .await;

        assert_eq!(engine.expression_calls(), vec![Some("happy".to_string())]);
        // One idle-category motion was requested.
        assert_eq!(engine.play_calls().len(), 1);
        assert_eq!(engine.play_calls()[0].1, MotionPriority::IDLE);
    }

    #[tokio::test]
    async fn raw_json_is_decoded_before_dispatch() {
        let engine = Arc::new(FakeEngine::new());
        let (dispatcher, bus) = dispatcher_with(engine.clone());
        let mut rx = bus.subscribe(None).await;

        dispatcher
            .handle_raw(r#"{"message":"hi","motion":"idle"}"#)
            .await
            .unwrap();
        assert!(matches!(
            rx.recv().await.unwrap(),
            WidgetEvent::ChatBubble { .. }
        ));
        assert_eq!(engine.play_calls().len(), 1);
    }

    #[tokio::test]
    async fn malformed_json_is_reported_not_dispatched() {
        let engine = Arc::new(FakeEngine::new());
        let (dispatcher, bus) = dispatcher_with(engine.clone());
        let mut rx = bus.subscribe(Some(4)).await;

        let err = dispatcher.handle_raw("not json at all").await.unwrap_err();
        assert!(matches!(err, AvatarError::Json(_)));
        assert!(rx.try_recv().is_err());
        assert!(engine.calls().is_empty());
    }
}
