// File: minabot-common/src/models/mod.rs
pub mod chat;
pub mod motion;

pub use chat::{AudioRef, ChatReply};
pub use motion::{MotionCategory, MotionEvent, MotionPriority, MotionRequest, MotionTarget};
