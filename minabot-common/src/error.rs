// ================================================================
// File: minabot-common/src/error.rs
// ================================================================

use thiserror::Error;

/// Failures reported by the rendering-engine boundary.
///
/// None of these are fatal to the widget; callers log and degrade to
/// "no animation change".
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Stop error: {0}")]
    Stop(String),

    #[error("Expression error: {0}")]
    Expression(String),

    #[error("Parameter error: {0}")]
    Parameter(String),
}
