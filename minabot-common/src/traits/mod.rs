// File: minabot-common/src/traits/mod.rs
pub mod engine;
pub mod rng;

pub use engine::{AvatarEngine, FadeSpec};
pub use rng::{MotionRng, ThreadRng};
