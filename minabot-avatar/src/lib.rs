//! minabot-avatar/src/lib.rs
//!
//! The main library file for the `minabot-avatar` crate.
//!
//! Widget logic for an animated 2D mascot: a motion catalog, a motion player
//! that arbitrates one in-flight clip at a time, a randomized idle scheduler,
//! an expression reactor driven by engine lifecycle events, pointer tracking
//! and hit-region math, and dispatch of chat-backend replies. Rendering
//! itself stays behind the `AvatarEngine` trait in `minabot-common`.

pub mod catalog;
pub mod chat;
pub mod events;
pub mod expression;
pub mod idle;
pub mod manager;
pub mod model;
pub mod player;
pub mod test_support;
pub mod tracking;

use thiserror::Error;

pub use minabot_common::error::EngineError;
pub use minabot_common::models::{
    AudioRef, ChatReply, MotionCategory, MotionEvent, MotionPriority, MotionRequest, MotionTarget,
};
pub use minabot_common::traits::{AvatarEngine, FadeSpec, MotionRng, ThreadRng};

pub use catalog::MotionCatalog;
pub use events::{EventBus, WidgetEvent};
pub use expression::ExpressionReactor;
pub use idle::IdleScheduler;
pub use manager::AvatarManager;
pub use player::MotionPlayer;
pub use tracking::TrackingFlags;

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Motion group absent or empty: {0}")]
    InvalidGroup(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AvatarError>;
