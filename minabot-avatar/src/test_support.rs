//! minabot-avatar/src/test_support.rs
//!
//! Shared fakes for unit and integration tests: a recording engine whose
//! playback completion the test controls, and deterministic randomness
//! sources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use minabot_common::error::EngineError;
use minabot_common::models::MotionPriority;
use minabot_common::traits::{AvatarEngine, FadeSpec, MotionRng};

/// One recorded call across the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Play { clip: String, priority: MotionPriority },
    StopAll,
    Expression(Option<String>),
    Parameter { id: String, value: f32 },
}

/// Recording fake for the rendering engine.
///
/// By default every call succeeds immediately. `gate_playback()` makes
/// `play_clip` block until the test releases it with `finish_playback()`,
/// which is how tests observe "during playback" state.
pub struct FakeEngine {
    calls: Mutex<Vec<EngineCall>>,
    gated: AtomicBool,
    playback_gate: Semaphore,
    fail_play: AtomicBool,
    fail_stop: AtomicBool,
    fail_expression: AtomicBool,
    fail_parameter: AtomicBool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            gated: AtomicBool::new(false),
            playback_gate: Semaphore::new(0),
            fail_play: AtomicBool::new(false),
            fail_stop: AtomicBool::new(false),
            fail_expression: AtomicBool::new(false),
            fail_parameter: AtomicBool::new(false),
        }
    }

    /// Make subsequent `play_clip` calls wait for `finish_playback`.
    pub fn gate_playback(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    /// Release one gated `play_clip` call.
    pub fn finish_playback(&self) {
        self.playback_gate.add_permits(1);
    }

    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }

    pub fn fail_expression(&self, fail: bool) {
        self.fail_expression.store(fail, Ordering::SeqCst);
    }

    pub fn fail_parameter(&self, fail: bool) {
        self.fail_parameter.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn play_calls(&self) -> Vec<(String, MotionPriority)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Play { clip, priority } => Some((clip, priority)),
                _ => None,
            })
            .collect()
    }

    pub fn expression_calls(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Expression(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn parameter_calls(&self) -> Vec<(String, f32)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Parameter { id, value } => Some((id, value)),
                _ => None,
            })
            .collect()
    }

    pub fn stop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::StopAll))
            .count()
    }

    /// Cooperatively wait until at least `n` play calls have been recorded.
    pub async fn wait_for_play_calls(&self, n: usize) {
        while self.play_calls().len() < n {
            tokio::task::yield_now().await;
        }
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvatarEngine for FakeEngine {
    async fn play_clip(
        &self,
        clip: &str,
        priority: MotionPriority,
        _fade: FadeSpec,
    ) -> Result<(), EngineError> {
        self.record(EngineCall::Play {
            clip: clip.to_string(),
            priority,
        });
        if self.gated.load(Ordering::SeqCst) {
            let permit = self
                .playback_gate
                .acquire()
                .await
                .map_err(|e| EngineError::Playback(e.to_string()))?;
            permit.forget();
        }
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(EngineError::Playback(format!("fake playback failure: {clip}")));
        }
        Ok(())
    }

    async fn stop_all_motions(&self) -> Result<(), EngineError> {
        self.record(EngineCall::StopAll);
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(EngineError::Stop("fake stop failure".into()));
        }
        Ok(())
    }

    async fn set_expression(&self, expression: Option<String>) -> Result<(), EngineError> {
        self.record(EngineCall::Expression(expression));
        if self.fail_expression.load(Ordering::SeqCst) {
            return Err(EngineError::Expression("fake expression failure".into()));
        }
        Ok(())
    }

    async fn set_parameter(&self, id: &str, value: f32) -> Result<(), EngineError> {
        self.record(EngineCall::Parameter {
            id: id.to_string(),
            value,
        });
        if self.fail_parameter.load(Ordering::SeqCst) {
            return Err(EngineError::Parameter("fake parameter failure".into()));
        }
        Ok(())
    }
}

/// Randomness source that always returns the same unit value.
pub struct FixedRng(pub f64);

impl MotionRng for FixedRng {
    fn unit(&self) -> f64 {
        self.0
    }
}

/// Randomness source that replays a scripted sequence, then repeats the
/// final value.
pub struct SeqRng {
    values: Mutex<Vec<f64>>,
    last: Mutex<f64>,
}

impl SeqRng {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: Mutex::new(values),
            last: Mutex::new(0.0),
        }
    }
}

impl MotionRng for SeqRng {
    fn unit(&self) -> f64 {
        let mut values = self.values.lock().unwrap();
        if values.is_empty() {
            *self.last.lock().unwrap()
        } else {
            let v = values.remove(0);
            *self.last.lock().unwrap() = v;
            v
        }
    }
}
