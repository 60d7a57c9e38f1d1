use serde::{Deserialize, Serialize};

/// Static classification of motion groups. Membership is fixed at startup;
/// the catalog decides which groups belong to which category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionCategory {
    Idle,
    Touch,
    Special,
    Complete,
}

impl MotionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionCategory::Idle => "idle",
            MotionCategory::Touch => "touch",
            MotionCategory::Special => "special",
            MotionCategory::Complete => "complete",
        }
    }
}

/// Playback priority handed to the rendering engine. Mirrors the Live2D
/// framework's ladder: a higher value preempts a lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MotionPriority(pub u8);

impl MotionPriority {
    pub const NONE: MotionPriority = MotionPriority(0);
    pub const IDLE: MotionPriority = MotionPriority(1);
    pub const NORMAL: MotionPriority = MotionPriority(2);
    pub const FORCE: MotionPriority = MotionPriority(3);
}

/// What a motion request points at: either a named group (one clip is chosen
/// uniformly at playback time) or a single concrete clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionTarget {
    Group(String),
    Clip(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionRequest {
    pub target: MotionTarget,
    pub priority: MotionPriority,
}

impl MotionRequest {
    pub fn group(name: impl Into<String>, priority: MotionPriority) -> Self {
        Self {
            target: MotionTarget::Group(name.into()),
            priority,
        }
    }

    pub fn clip(name: impl Into<String>, priority: MotionPriority) -> Self {
        Self {
            target: MotionTarget::Clip(name.into()),
            priority,
        }
    }

    /// Display name for logging, regardless of target kind.
    pub fn name(&self) -> &str {
        match &self.target {
            MotionTarget::Group(g) => g,
            MotionTarget::Clip(c) => c,
        }
    }
}

/// Lifecycle events the rendering engine emits while a motion plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionEvent {
    Started { group: String },
    Ended,
}
