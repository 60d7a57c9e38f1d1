//! minabot-avatar/src/tracking.rs
//!
//! Pointer-driven pose blending, voice-driven mouth blending, and tap
//! hit-region classification. The host supplies normalized coordinates in
//! `[-1, 1]` on both axes; this module turns them into engine parameter
//! writes and touch-motion requests.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use minabot_common::traits::AvatarEngine;

pub const PARAM_ANGLE_X: &str = "ParamAngleX";
pub const PARAM_ANGLE_Y: &str = "ParamAngleY";
pub const PARAM_EYE_X: &str = "ParamEyeBallX";
pub const PARAM_EYE_Y: &str = "ParamEyeBallY";
pub const PARAM_MOUTH_OPEN: &str = "ParamMouthOpenY";

/// Full pointer deflection maps to this head angle in degrees.
pub const HEAD_ANGLE_RANGE: f32 = 30.0;

/// Two independent user-facing switches: eye tracking and touch
/// interaction. Both default to on.
pub struct TrackingFlags {
    tracking: AtomicBool,
    interaction: AtomicBool,
}

impl TrackingFlags {
    pub fn new() -> Self {
        Self {
            tracking: AtomicBool::new(true),
            interaction: AtomicBool::new(true),
        }
    }

    pub fn tracking_enabled(&self) -> bool {
        self.tracking.load(Ordering::SeqCst)
    }

    pub fn interaction_enabled(&self) -> bool {
        self.interaction.load(Ordering::SeqCst)
    }

    /// Flip eye tracking; returns the new state.
    pub fn toggle_tracking(&self) -> bool {
        let enabled = !self.tracking.fetch_xor(true, Ordering::SeqCst);
        info!(
            "Eye tracking: {}",
            if enabled { "enabled" } else { "disabled" }
        );
        enabled
    }

    /// Flip touch interaction; returns the new state.
    pub fn toggle_interaction(&self) -> bool {
        let enabled = !self.interaction.fetch_xor(true, Ordering::SeqCst);
        info!(
            "Touch areas: {}",
            if enabled { "enabled" } else { "disabled" }
        );
        enabled
    }
}

impl Default for TrackingFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Head angles for a normalized pointer position. Inputs outside `[-1, 1]`
/// are clamped.
pub fn head_angles(x: f32, y: f32) -> (f32, f32) {
    (
        x.clamp(-1.0, 1.0) * HEAD_ANGLE_RANGE,
        y.clamp(-1.0, 1.0) * HEAD_ANGLE_RANGE,
    )
}

/// Write the pointer-tracking blend parameters for one frame. A no-op when
/// tracking is switched off; parameter failures are logged and swallowed.
pub async fn apply_pointer(engine: &dyn AvatarEngine, flags: &TrackingFlags, x: f32, y: f32) {
    if !flags.tracking_enabled() {
        return;
    }
    let (angle_x, angle_y) = head_angles(x, y);
    let eye_x = x.clamp(-1.0, 1.0);
    let eye_y = y.clamp(-1.0, 1.0);

    let writes = [
        (PARAM_ANGLE_X, angle_x),
        (PARAM_ANGLE_Y, angle_y),
        (PARAM_EYE_X, eye_x),
        (PARAM_EYE_Y, eye_y),
    ];
    for (id, value) in writes {
        if let Err(e) = engine.set_parameter(id, value).await {
            warn!("Error updating model parameter {id}: {e}");
        }
    }
}

/// Write the mouth-open blend for the current voice volume, clamped to
/// `[0, 1]`. Failures are logged and swallowed.
pub async fn apply_mouth_level(engine: &dyn AvatarEngine, volume: f32) {
    let value = volume.clamp(0.0, 1.0);
    if let Err(e) = engine.set_parameter(PARAM_MOUTH_OPEN, value).await {
        warn!("Error updating mouth: {e}");
    }
}

/// Rectangular hit region in normalized coordinates, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub x: (f32, f32),
    pub y: (f32, f32),
}

impl HitRegion {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x.0 && x <= self.x.1 && y >= self.y.0 && y <= self.y.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchZone {
    Head,
    Body,
}

impl TouchZone {
    /// The touch-reaction motion group this zone triggers.
    pub fn motion_group(&self) -> &'static str {
        match self {
            TouchZone::Head => "touch_head",
            TouchZone::Body => "touch_body",
        }
    }
}

/// The two clickable zones of the model. Head is checked first, so it wins
/// on the shared y=0.5 boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegions {
    pub head: HitRegion,
    pub body: HitRegion,
}

impl Default for HitRegions {
    fn default() -> Self {
        Self {
            head: HitRegion {
                x: (-0.3, 0.3),
                y: (0.5, 0.9),
            },
            body: HitRegion {
                x: (-0.3, 0.3),
                y: (0.0, 0.5),
            },
        }
    }
}

impl HitRegions {
    pub fn classify(&self, x: f32, y: f32) -> Option<TouchZone> {
        if self.head.contains(x, y) {
            Some(TouchZone::Head)
        } else if self.body.contains(x, y) {
            Some(TouchZone::Body)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeEngine;
    use std::sync::Arc;

    #[test]
    fn toggles_flip_and_report_the_new_state() {
        let flags = TrackingFlags::new();
        assert!(flags.tracking_enabled());
        assert!(!flags.toggle_tracking());
        assert!(!flags.tracking_enabled());
        assert!(flags.toggle_tracking());

        assert!(flags.interaction_enabled());
        assert!(!flags.toggle_interaction());
        assert!(flags.toggle_interaction());
    }

    #[test]
    fn head_angles_scale_and_clamp() {
        assert_eq!(head_angles(1.0, -1.0), (30.0, -30.0));
        assert_eq!(head_angles(0.5, 0.0), (15.0, 0.0));
        assert_eq!(head_angles(2.0, -3.0), (30.0, -30.0));
    }

    #[test]
    fn default_regions_match_the_model_layout() {
        let regions = HitRegions::default();
        assert_eq!(regions.classify(0.0, 0.7), Some(TouchZone::Head));
        assert_eq!(regions.classify(0.0, 0.2), Some(TouchZone::Body));
        // Shared boundary goes to the head.
        assert_eq!(regions.classify(0.0, 0.5), Some(TouchZone::Head));
        assert_eq!(regions.classify(0.9, 0.7), None);
        assert_eq!(regions.classify(0.0, -0.4), None);
    }

    #[tokio::test]
    async fn pointer_writes_all_four_parameters() {
        let engine = Arc::new(FakeEngine::new());
        let flags = TrackingFlags::new();

        apply_pointer(engine.as_ref(), &flags, 0.5, -0.5).await;
        assert_eq!(
            engine.parameter_calls(),
            vec![
                (PARAM_ANGLE_X.to_string(), 15.0),
                (PARAM_ANGLE_Y.to_string(), -15.0),
                (PARAM_EYE_X.to_string(), 0.5),
                (PARAM_EYE_Y.to_string(), -0.5),
            ]
        );
    }

    #[tokio::test]
    async fn pointer_is_ignored_while_tracking_is_off() {
        let engine = Arc::new(FakeEngine::new());
        let flags = TrackingFlags::new();
        flags.toggle_tracking();

        apply_pointer(engine.as_ref(), &flags, 0.5, 0.5).await;
        assert!(engine.parameter_calls().is_empty());
    }

    #[tokio::test]
    async fn mouth_level_is_clamped() {
        let engine = Arc::new(FakeEngine::new());
        apply_mouth_level(engine.as_ref(), 1.7).await;
        apply_mouth_level(engine.as_ref(), -0.3).await;
        assert_eq!(
            engine.parameter_calls(),
            vec![
                (PARAM_MOUTH_OPEN.to_string(), 1.0),
                (PARAM_MOUTH_OPEN.to_string(), 0.0),
            ]
        );
    }

    #[tokio::test]
    async fn parameter_failures_are_swallowed() {
        let engine = Arc::new(FakeEngine::new());
        engine.fail_parameter(true);
        let flags = TrackingFlags::new();
        // Must not panic or abort early.
        apply_pointer(engine.as_ref(), &flags, 0.1, 0.1).await;
        assert_eq!(engine.parameter_calls().len(), 4);
    }
}
