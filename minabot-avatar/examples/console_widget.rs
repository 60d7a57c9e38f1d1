// File: minabot-avatar/examples/console_widget.rs
//! Headless demo: runs the widget against a stand-in engine that just logs
//! every boundary call. Shows the idle loop ticking, a tap reaction, a chat
//! reply, and the toggle controls.
//!
//!     RUST_LOG=debug cargo run -p minabot-avatar --example console_widget

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use minabot_avatar::catalog::MotionCatalog;
use minabot_avatar::events::WidgetEvent;
use minabot_avatar::manager::AvatarManager;
use minabot_avatar::{AvatarEngine, EngineError, FadeSpec, MotionEvent, MotionPriority};

/// Engine stand-in: each clip "plays" for a moment and every call is logged.
struct ConsoleEngine;

#[async_trait]
impl AvatarEngine for ConsoleEngine {
    async fn play_clip(
        &self,
        clip: &str,
        priority: MotionPriority,
        fade: FadeSpec,
    ) -> Result<(), EngineError> {
        info!("engine: play {clip} (priority {:?}, fade {:?})", priority, fade.fade_in);
        tokio::time::sleep(Duration::from_millis(400)).await;
        Ok(())
    }

    async fn stop_all_motions(&self) -> Result<(), EngineError> {
        info!("engine: stop all motions");
        Ok(())
    }

    async fn set_expression(&self, expression: Option<String>) -> Result<(), EngineError> {
        info!("engine: expression => {expression:?}");
        Ok(())
    }

    async fn set_parameter(&self, id: &str, value: f32) -> Result<(), EngineError> {
        info!("engine: {id} = {value:.2}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> minabot_avatar::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let manager = Arc::new(AvatarManager::new(
        Arc::new(ConsoleEngine),
        MotionCatalog::with_default_groups(),
    ));
    manager.init().await;

    // Print whatever the widget publishes (a real host would render this).
    let mut events = manager.bus().subscribe(None).await;
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let WidgetEvent::ChatBubble { message, .. } = event {
                info!("bubble: {message}");
            }
        }
    });

    // The user glances around and pokes the model's head.
    manager.pointer_moved(0.4, 0.2).await;
    let zone = manager.handle_tap(0.0, 0.7).await;
    info!("tap landed on {zone:?}");
    manager
        .handle_engine_event(MotionEvent::Started {
            group: "touch_head".into(),
        })
        .await;
    manager.handle_engine_event(MotionEvent::Ended).await;

    // A reply arrives from the chat backend.
    manager
        .handle_chat_raw(r#"{"message": "Hehe~ hello!", "expression": "happy", "motion": true}"#)
        .await?;

    // Let the idle loop fire at least once (waits are 5-10s).
    tokio::time::sleep(Duration::from_secs(11)).await;

    info!("idle now: {}", manager.toggle_idle());
    info!("tracking now: {}", manager.toggle_tracking());
    manager.shutdown();
    Ok(())
}
