//! minabot-avatar/src/player.rs
//!
//! Arbitrates playback of a single motion at a time. A play request resolves
//! a group name to one concrete clip, best-effort cancels whatever is
//! currently playing, and awaits completion. Requests are never queued: a new
//! request preempts the current one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use minabot_common::models::{MotionCategory, MotionPriority, MotionRequest, MotionTarget};
use minabot_common::traits::{AvatarEngine, FadeSpec, MotionRng};

use crate::catalog::MotionCatalog;
use crate::{AvatarError, Result};

/// Snapshot of the motion currently being played, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentMotion {
    pub name: String,
    pub priority: MotionPriority,
}

struct ActiveMotion {
    info: CurrentMotion,
    generation: u64,
}

pub struct MotionPlayer {
    engine: Arc<dyn AvatarEngine>,
    catalog: Arc<MotionCatalog>,
    rng: Arc<dyn MotionRng>,
    current: Mutex<Option<ActiveMotion>>,
    generation: AtomicU64,
}

impl MotionPlayer {
    pub fn new(
        engine: Arc<dyn AvatarEngine>,
        catalog: Arc<MotionCatalog>,
        rng: Arc<dyn MotionRng>,
    ) -> Self {
        Self {
            engine,
            catalog,
            rng,
            current: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> &MotionCatalog {
        &self.catalog
    }

    /// The motion currently in flight, if any.
    pub fn current(&self) -> Option<CurrentMotion> {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|a| a.info.clone())
    }

    fn clear_generation(&self, generation: u64) {
        // Only clear our own record: a preempting request may have replaced
        // it while we were awaiting the engine.
        let mut slot = self.current.lock().unwrap();
        if slot.as_ref().is_some_and(|a| a.generation == generation) {
            *slot = None;
        }
    }

    /// Play one motion, preempting whatever is in flight. Returns the clip
    /// file that was played.
    ///
    /// An absent or empty group yields `InvalidGroup` without touching the
    /// engine or the current slot. Engine failures come back as `Err`; the
    /// current slot is cleared on completion, error, or cancellation of the
    /// returned future. Swallowing errors is the caller's call.
    pub async fn play(&self, request: MotionRequest) -> Result<String> {
        let clip = self.resolve(&request)?;
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        let preempted = {
            let mut slot = self.current.lock().unwrap();
            let old = slot.take();
            *slot = Some(ActiveMotion {
                info: CurrentMotion {
                    name: request.name().to_string(),
                    priority: request.priority,
                },
                generation,
            });
            old
        };
        // Runs even when this future is dropped mid-playback (the idle loop
        // restarting aborts its in-flight play).
        let _clear = ClearGuard {
            player: self,
            generation,
        };

        if let Some(active) = preempted {
            debug!("Stopping current motion '{}'", active.info.name);
            // Best effort: a failed stop is treated as already stopped.
            if let Err(e) = self.engine.stop_all_motions().await {
                warn!("Failed to stop current motion: {e}");
            }
        }

        debug!("Starting motion '{}' => clip '{clip}'", request.name());
        let outcome = self
            .engine
            .play_clip(&clip, request.priority, FadeSpec::default())
            .await;

        match outcome {
            Ok(()) => {
                debug!("Motion playback complete: {}", request.name());
                Ok(clip)
            }
            Err(e) => {
                warn!("Failed to play motion '{}': {e}", request.name());
                Err(e.into())
            }
        }
    }

    /// Play a uniformly-random group from the given category.
    pub async fn play_random(
        &self,
        category: MotionCategory,
        priority: MotionPriority,
    ) -> Result<String> {
        let group = self
            .catalog
            .random_group_in(category, self.rng.as_ref())
            .ok_or_else(|| {
                warn!("No motion groups in category '{}'", category.as_str());
                AvatarError::InvalidGroup(category.as_str().to_string())
            })?
            .to_string();
        self.play(MotionRequest::group(group, priority)).await
    }

    fn resolve(&self, request: &MotionRequest) -> Result<String> {
        match &request.target {
            MotionTarget::Group(group) => {
                let clips = self.catalog.clips_for(group).ok_or_else(|| {
                    warn!("Motion group '{group}' does not exist or is empty");
                    AvatarError::InvalidGroup(group.clone())
                })?;
                Ok(clips[self.rng.pick(clips.len())].clone())
            }
            // Direct clip requests take the conventional on-disk path.
            MotionTarget::Clip(clip) => Ok(format!("motion/{clip}.motion3.json")),
        }
    }
}

/// Clears this request's slot entry on every exit path from `play`,
/// including the future being dropped.
struct ClearGuard<'a> {
    player: &'a MotionPlayer,
    generation: u64,
}

impl Drop for ClearGuard<'_> {
    fn drop(&mut self) {
        self.player.clear_generation(self.generation);
    }
}
