//! minabot-avatar/src/idle.rs
//!
//! The idle-animation loop. While enabled it repeatedly waits a randomized
//! interval, then plays one random idle motion through the `MotionPlayer`.
//! Disabling cancels the pending wait immediately; a motion already in
//! flight finishes naturally and simply isn't followed by another wait.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use minabot_common::models::{MotionCategory, MotionPriority};
use minabot_common::traits::MotionRng;

use crate::player::MotionPlayer;

/// Shortest idle wait.
pub const IDLE_DELAY_MIN: Duration = Duration::from_millis(5000);
/// Random extra on top of the minimum, exclusive.
pub const IDLE_DELAY_SPAN: Duration = Duration::from_millis(5000);

/// Maps a uniform unit sample onto the wait interval `[5000ms, 10000ms)`.
pub fn idle_delay(unit: f64) -> Duration {
    IDLE_DELAY_MIN + Duration::from_millis((unit * IDLE_DELAY_SPAN.as_millis() as f64) as u64)
}

pub struct IdleScheduler {
    player: Arc<MotionPlayer>,
    rng: Arc<dyn MotionRng>,
    enabled_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
    // Owned by the current loop; replaced wholesale on restart so a torn-down
    // loop can never clobber its successor's bookkeeping.
    waiting: Mutex<Arc<AtomicBool>>,
    active_loops: Arc<AtomicUsize>,
    initialized: AtomicBool,
}

/// Resets the loop-liveness bookkeeping even when the loop task is aborted
/// mid-await (the future is dropped, the guard still runs).
struct LoopGuard {
    waiting: Arc<AtomicBool>,
    active_loops: Arc<AtomicUsize>,
}

impl Drop for LoopGuard {
    fn drop(&mut self) {
        self.waiting.store(false, Ordering::SeqCst);
        self.active_loops.fetch_sub(1, Ordering::SeqCst);
    }
}

impl IdleScheduler {
    /// Created enabled but not running; `init` (or `start`) kicks it off.
    pub fn new(player: Arc<MotionPlayer>, rng: Arc<dyn MotionRng>) -> Self {
        let (enabled_tx, _) = watch::channel(true);
        Self {
            player,
            rng,
            enabled_tx,
            task: Mutex::new(None),
            waiting: Mutex::new(Arc::new(AtomicBool::new(false))),
            active_loops: Arc::new(AtomicUsize::new(0)),
            initialized: AtomicBool::new(false),
        }
    }

    /// One-time startup. A second call is a no-op, leaving existing state
    /// (and the existing loop) untouched.
    pub fn init(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            info!("[idle] already initialized, skipping");
            return;
        }
        info!("[idle] initializing");
        if self.is_enabled() {
            self.start();
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled_tx.borrow()
    }

    /// True while the loop task is alive.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// True while a randomized wait is outstanding.
    pub fn pending_wait(&self) -> bool {
        self.waiting.lock().unwrap().load(Ordering::SeqCst)
    }

    /// Number of live loop tasks. Never more than one.
    pub fn active_loops(&self) -> usize {
        self.active_loops.load(Ordering::SeqCst)
    }

    /// Enable and (re)start the loop. Any existing loop is torn down first,
    /// so two timers never coexist.
    pub fn start(&self) {
        info!("[idle] starting");
        let mut task = self.task.lock().unwrap();
        if let Some(old) = task.take() {
            debug!("[idle] clearing existing timer");
            old.abort();
        }
        self.enabled_tx.send_replace(true);

        let player = self.player.clone();
        let rng = self.rng.clone();
        let mut enabled_rx = self.enabled_tx.subscribe();
        let waiting = Arc::new(AtomicBool::new(false));
        *self.waiting.lock().unwrap() = waiting.clone();
        let active_loops = self.active_loops.clone();

        *task = Some(tokio::spawn(async move {
            active_loops.fetch_add(1, Ordering::SeqCst);
            let _guard = LoopGuard {
                waiting: waiting.clone(),
                active_loops,
            };

            loop {
                let delay = idle_delay(rng.unit());
                debug!("[idle] scheduling next motion in {delay:?}");
                waiting.store(true, Ordering::SeqCst);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        waiting.store(false, Ordering::SeqCst);
                    }
                    changed = enabled_rx.changed() => {
                        waiting.store(false, Ordering::SeqCst);
                        if changed.is_err() || !*enabled_rx.borrow() {
                            debug!("[idle] disabled during wait, stopping");
                            break;
                        }
                        // Re-enabled while already waiting; draw a fresh wait.
                        continue;
                    }
                }

                if !*enabled_rx.borrow() {
                    break;
                }

                debug!("[idle] playing random idle motion");
                if let Err(e) = player
                    .play_random(MotionCategory::Idle, MotionPriority::IDLE)
                    .await
                {
                    warn!("[idle] idle motion failed: {e}");
                }

                if !*enabled_rx.borrow() {
                    debug!("[idle] disabled during playback, stopping");
                    break;
                }
            }
        }));
    }

    /// Disable the loop. The pending wait is cancelled; an in-flight motion
    /// is left to complete on its own.
    pub fn stop(&self) {
        info!("[idle] stopping");
        self.enabled_tx.send_replace(false);
    }

    /// Flip enabled state; returns the new state (for UI labels).
    pub fn toggle(&self) -> bool {
        let enabled = !self.is_enabled();
        info!(
            "[idle] toggled to {}",
            if enabled { "enabled" } else { "disabled" }
        );
        if enabled {
            self.start();
        } else {
            self.stop();
        }
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MotionCatalog;
    use crate::test_support::{FakeEngine, FixedRng, SeqRng};

    fn scheduler_with(engine: Arc<FakeEngine>, unit: f64) -> IdleScheduler {
        let rng: Arc<dyn MotionRng> = Arc::new(FixedRng(unit));
        let player = Arc::new(MotionPlayer::new(
            engine,
            Arc::new(MotionCatalog::with_default_groups()),
            rng.clone(),
        ));
        IdleScheduler::new(player, rng)
    }

    /// Bounded cooperative yield so spawned loop tasks can make progress.
    async fn settle() {
        for _ in 0..25 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn delay_is_uniform_over_the_wait_window() {
        assert_eq!(idle_delay(0.0), Duration::from_millis(5000));
        assert_eq!(idle_delay(0.999_999), Duration::from_millis(9999));
        assert_eq!(idle_delay(0.5), Duration::from_millis(7500));
    }

    #[tokio::test(start_paused = true)]
    async fn start_schedules_exactly_one_wait() {
        let scheduler = scheduler_with(Arc::new(FakeEngine::new()), 0.0);
        scheduler.init();
        settle().await;

        assert!(scheduler.is_running());
        assert!(scheduler.pending_wait());
        assert_eq!(scheduler.active_loops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disable_clears_the_pending_wait() {
        let scheduler = scheduler_with(Arc::new(FakeEngine::new()), 0.0);
        scheduler.start();
        settle().await;

        scheduler.stop();
        settle().await;

        assert!(!scheduler.is_enabled());
        assert!(!scheduler.pending_wait());
        assert_eq!(scheduler.active_loops(), 0);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn reenable_schedules_one_new_wait() {
        let scheduler = scheduler_with(Arc::new(FakeEngine::new()), 0.0);
        scheduler.start();
        settle().await;
        scheduler.stop();
        settle().await;

        scheduler.start();
        settle().await;
        assert!(scheduler.pending_wait());
        assert_eq!(scheduler.active_loops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_toggling_leaves_a_single_timer() {
        let scheduler = scheduler_with(Arc::new(FakeEngine::new()), 0.0);
        scheduler.init();
        settle().await;

        assert!(!scheduler.toggle());
        assert!(scheduler.toggle());
        assert!(!scheduler.toggle());
        assert!(scheduler.toggle());
        settle().await;

        assert_eq!(scheduler.active_loops(), 1);
        assert!(scheduler.pending_wait());
    }

    #[tokio::test(start_paused = true)]
    async fn second_init_is_a_no_op() {
        let scheduler = scheduler_with(Arc::new(FakeEngine::new()), 0.0);
        scheduler.init();
        settle().await;
        scheduler.init();
        settle().await;

        assert_eq!(scheduler.active_loops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_expiry_plays_an_idle_motion_and_reschedules() {
        let engine = Arc::new(FakeEngine::new());
        let scheduler = scheduler_with(engine.clone(), 0.0);
        scheduler.start();
        settle().await;

        tokio::time::advance(Duration::from_millis(5000)).await;
        settle().await;

        assert_eq!(engine.play_calls().len(), 1);
        // With FixedRng(0.0) the first idle group is always chosen.
        assert_eq!(engine.play_calls()[0].0, "motion/idle.motion3.json");
        assert_eq!(engine.play_calls()[0].1, MotionPriority::IDLE);
        // The next wait is already outstanding.
        assert!(scheduler.pending_wait());
        assert_eq!(scheduler.active_loops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn each_cycle_draws_a_fresh_wait() {
        let engine = Arc::new(FakeEngine::new());
        // Draw order per cycle: wait, group pick, clip pick. First wait lands
        // at the minimum, the second at the top of the window.
        let rng: Arc<dyn MotionRng> = Arc::new(SeqRng::new(vec![0.0, 0.0, 0.0, 0.999]));
        let player = Arc::new(MotionPlayer::new(
            engine.clone(),
            Arc::new(MotionCatalog::with_default_groups()),
            rng.clone(),
        ));
        let scheduler = IdleScheduler::new(player, rng);
        scheduler.start();
        settle().await;

        tokio::time::advance(Duration::from_millis(5000)).await;
        settle().await;
        assert_eq!(engine.play_calls().len(), 1);

        // The second wait is longer than the first; 5000ms is not enough.
        tokio::time::advance(Duration::from_millis(5000)).await;
        settle().await;
        assert_eq!(engine.play_calls().len(), 1);

        tokio::time::advance(Duration::from_millis(4995)).await;
        settle().await;
        assert_eq!(engine.play_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn disable_during_playback_stops_after_the_motion() {
        let engine = Arc::new(FakeEngine::new());
        engine.gate_playback();
        let scheduler = scheduler_with(engine.clone(), 0.0);
        scheduler.start();
        settle().await;

        tokio::time::advance(Duration::from_millis(5000)).await;
        engine.wait_for_play_calls(1).await;

        // Motion is mid-flight; disabling must not interrupt it, but no new
        // wait may follow.
        scheduler.stop();
        settle().await;
        engine.finish_playback();
        settle().await;

        assert_eq!(engine.play_calls().len(), 1);
        assert!(!scheduler.pending_wait());
        assert_eq!(scheduler.active_loops(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_during_playback_leaves_no_stale_current_motion() {
        let engine = Arc::new(FakeEngine::new());
        engine.gate_playback();
        let rng: Arc<dyn MotionRng> = Arc::new(FixedRng(0.0));
        let player = Arc::new(MotionPlayer::new(
            engine.clone(),
            Arc::new(MotionCatalog::with_default_groups()),
            rng.clone(),
        ));
        let scheduler = IdleScheduler::new(player.clone(), rng);
        scheduler.start();
        settle().await;

        tokio::time::advance(Duration::from_millis(5000)).await;
        engine.wait_for_play_calls(1).await;
        assert!(player.current().is_some());

        // Restart while the clip is in flight; the old loop (and its play)
        // is torn down, so the player must not keep reporting it.
        scheduler.stop();
        settle().await;
        scheduler.start();
        settle().await;
        engine.finish_playback();
        settle().await;

        assert_eq!(player.current(), None);
        assert_eq!(scheduler.active_loops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn engine_failures_do_not_kill_the_loop() {
        let engine = Arc::new(FakeEngine::new());
        engine.fail_play(true);
        let scheduler = scheduler_with(engine.clone(), 0.0);
        scheduler.start();
        settle().await;

        tokio::time::advance(Duration::from_millis(5000)).await;
        settle().await;

        // The failure was swallowed; the loop went back to waiting.
        assert_eq!(engine.play_calls().len(), 1);
        assert!(scheduler.pending_wait());
        assert_eq!(scheduler.active_loops(), 1);
    }
}
