use async_trait::async_trait;
use std::time::Duration;

use crate::error::EngineError;
use crate::models::motion::MotionPriority;

/// Fade-in/fade-out applied around a clip. The 500ms defaults are a tuning
/// constant of the widget, not something derived from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeSpec {
    pub fade_in: Duration,
    pub fade_out: Duration,
}

impl Default for FadeSpec {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_millis(500),
            fade_out: Duration::from_millis(500),
        }
    }
}

/// The rendering-engine boundary. The real implementation wraps the host's
/// Live2D binding; tests use a recording fake.
///
/// `play_clip` resolves once the clip has finished playing (or the engine
/// rejected/cancelled it). Cancellation of an in-flight clip happens via
/// `stop_all_motions`, never by dropping the future.
#[async_trait]
pub trait AvatarEngine: Send + Sync {
    async fn play_clip(
        &self,
        clip: &str,
        priority: MotionPriority,
        fade: FadeSpec,
    ) -> Result<(), EngineError>;

    async fn stop_all_motions(&self) -> Result<(), EngineError>;

    /// `None` restores the model's default face.
    async fn set_expression(&self, expression: Option<String>) -> Result<(), EngineError>;

    /// Per-frame blend parameter (head angle, eye position, mouth open...).
    async fn set_parameter(&self, id: &str, value: f32) -> Result<(), EngineError>;
}
