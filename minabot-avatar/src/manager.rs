//! minabot-avatar/src/manager.rs
//!
//! A top-level manager that owns the whole widget: engine handle, motion
//! catalog, event bus, motion player, idle scheduler, expression reactor,
//! and the user-facing toggle switches. The host constructs one manager per
//! widget instance and feeds it normalized input events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use minabot_common::models::{ChatReply, MotionEvent, MotionPriority, MotionRequest};
use minabot_common::traits::{AvatarEngine, MotionRng, ThreadRng};

use crate::catalog::MotionCatalog;
use crate::chat::ChatDispatcher;
use crate::events::{EventBus, WidgetEvent};
use crate::expression::ExpressionReactor;
use crate::idle::IdleScheduler;
use crate::player::MotionPlayer;
use crate::tracking::{self, HitRegions, TouchZone, TrackingFlags};
use crate::Result;

pub struct AvatarManager {
    engine: Arc<dyn AvatarEngine>,
    bus: EventBus,
    player: Arc<MotionPlayer>,
    scheduler: IdleScheduler,
    reactor: Arc<ExpressionReactor>,
    chat: ChatDispatcher,
    flags: TrackingFlags,
    regions: HitRegions,
    initialized: AtomicBool,
    reactor_task: Mutex<Option<JoinHandle<()>>>,
}

impl AvatarManager {
    pub fn new(engine: Arc<dyn AvatarEngine>, catalog: MotionCatalog) -> Self {
        Self::with_rng(engine, catalog, Arc::new(ThreadRng))
    }

    /// Construction with an injected randomness source (tests pin this).
    pub fn with_rng(
        engine: Arc<dyn AvatarEngine>,
        catalog: MotionCatalog,
        rng: Arc<dyn MotionRng>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let bus = EventBus::new();
        let player = Arc::new(MotionPlayer::new(engine.clone(), catalog, rng.clone()));
        let scheduler = IdleScheduler::new(player.clone(), rng);
        let reactor = Arc::new(ExpressionReactor::new(engine.clone()));
        let chat = ChatDispatcher::new(bus.clone(), player.clone(), reactor.clone());

        Self {
            engine,
            bus,
            player,
            scheduler,
            reactor,
            chat,
            flags: TrackingFlags::new(),
            regions: HitRegions::default(),
            initialized: AtomicBool::new(false),
            reactor_task: Mutex::new(None),
        }
    }

    /// One-time startup: spawns the expression reactor and brings up the
    /// idle scheduler. A second call logs and leaves existing state alone.
    pub async fn init(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!("Avatar widget already initialized, skipping");
            return;
        }
        info!("Initializing avatar widget");
        let rx = self.bus.subscribe(None).await;
        *self.reactor_task.lock().unwrap() = Some(tokio::spawn(self.reactor.clone().run(rx)));
        self.scheduler.init();
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn player(&self) -> &MotionPlayer {
        &self.player
    }

    pub fn idle(&self) -> &IdleScheduler {
        &self.scheduler
    }

    pub fn expression(&self) -> &ExpressionReactor {
        &self.reactor
    }

    /// Republish an engine lifecycle event onto the widget bus, where the
    /// expression reactor (and any host subscriber) picks it up.
    pub async fn handle_engine_event(&self, event: MotionEvent) {
        match event {
            MotionEvent::Started { group } => {
                self.bus.publish(WidgetEvent::MotionStarted { group }).await;
            }
            MotionEvent::Ended => {
                self.bus.publish(WidgetEvent::MotionEnded).await;
            }
        }
    }

    /// Explicit motion request from the host (special/complete motions etc).
    pub async fn play(&self, request: MotionRequest) -> Result<String> {
        self.player.play(request).await
    }

    /// Classify a tap and fire the matching touch reaction at elevated
    /// priority. Returns the zone that was hit, if any. Gated by the
    /// interaction switch; playback failures are logged and swallowed.
    pub async fn handle_tap(&self, x: f32, y: f32) -> Option<TouchZone> {
        if !self.flags.interaction_enabled() {
            return None;
        }
        let zone = self.regions.classify(x, y)?;
        let request = MotionRequest::group(zone.motion_group(), MotionPriority::NORMAL);
        if let Err(e) = self.player.play(request).await {
            warn!("Touch reaction for {zone:?} failed: {e}");
        }
        Some(zone)
    }

    /// Per-frame pointer update, gated by the tracking switch.
    pub async fn pointer_moved(&self, x: f32, y: f32) {
        tracking::apply_pointer(self.engine.as_ref(), &self.flags, x, y).await;
    }

    /// Voice-volume sample for mouth blending.
    pub async fn voice_level(&self, volume: f32) {
        tracking::apply_mouth_level(self.engine.as_ref(), volume).await;
    }

    pub async fn handle_chat_reply(&self, reply: ChatReply) {
        self.chat.handle_reply(reply).await;
    }

    pub async fn handle_chat_raw(&self, raw: &str) -> Result<()> {
        self.chat.handle_raw(raw).await
    }

    pub fn toggle_idle(&self) -> bool {
        self.scheduler.toggle()
    }

    pub fn toggle_tracking(&self) -> bool {
        self.flags.toggle_tracking()
    }

    pub fn toggle_interaction(&self) -> bool {
        self.flags.toggle_interaction()
    }

    /// Tear the widget down: no further idle waits, no further bus traffic.
    pub fn shutdown(&self) {
        info!("Shutting avatar widget down");
        self.scheduler.stop();
        self.bus.shutdown();
        if let Some(task) = self.reactor_task.lock().unwrap().take() {
            task.abort();
        }
    }
}
