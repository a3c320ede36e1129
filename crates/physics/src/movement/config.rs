//! Motion configuration constants.
//!
//! All distances are in scene units. The defaults match the castle walkthrough
//! scene, which is modelled at roughly centimeter scale.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Configuration for agent motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    // ========================================================================
    // Speed
    // ========================================================================
    /// Keyboard move/strafe speed (units/second).
    pub speed: f32,

    // ========================================================================
    // Horizontal Collision
    // ========================================================================
    /// Start of the clearance band checked along the motion direction.
    pub clearance_near: f32,

    /// End of the clearance band (collision radius plus look-ahead).
    pub clearance_far: f32,

    // ========================================================================
    // Floor Following
    // ========================================================================
    /// Start of the downward floor probe.
    pub floor_probe_near: f32,

    /// End of the downward floor probe. Hits at or beyond this are ignored.
    pub floor_probe_far: f32,

    /// Floor hits at or closer than this do not snap the agent.
    pub floor_snap_min: f32,

    /// Height of the eye above the floor after a snap.
    pub eye_height: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 1000.0,

            clearance_near: 0.0,
            clearance_far: 250.0,

            floor_probe_near: 0.0,
            floor_probe_far: 750.0,
            floor_snap_min: 250.0,
            eye_height: 500.0,
        }
    }
}

impl MotionConfig {
    /// Create a config with every distance multiplied by `factor`.
    ///
    /// Useful when an asset is modelled at a different unit scale than the
    /// castle scene (e.g. `0.01` for meters).
    pub fn scaled(factor: f32) -> Self {
        let base = Self::default();
        Self {
            speed: base.speed * factor,
            clearance_near: base.clearance_near * factor,
            clearance_far: base.clearance_far * factor,
            floor_probe_near: base.floor_probe_near * factor,
            floor_probe_far: base.floor_probe_far * factor,
            floor_snap_min: base.floor_snap_min * factor,
            eye_height: base.eye_height * factor,
        }
    }

    /// Check whether the floor band fits inside the probe band.
    ///
    /// An eye height outside `(floor_snap_min, floor_probe_far)` means the
    /// agent would never rest at a stable height.
    pub fn is_consistent(&self) -> bool {
        self.clearance_near <= self.clearance_far
            && self.floor_probe_near <= self.floor_snap_min
            && self.floor_snap_min < self.eye_height
            && self.eye_height < self.floor_probe_far
    }

    /// Warn when a loaded scene looks too small for this config.
    ///
    /// Returns `false` if the scene's largest dimension is smaller than the
    /// floor probe, which usually means the asset uses different units.
    pub fn check_scene_scale(&self, extent: Vec3) -> bool {
        let largest = extent.max_element();
        if largest < self.floor_probe_far {
            log::warn!(
                "scene extent {:?} is smaller than the floor probe ({}); asset scale may not match motion config",
                extent,
                self.floor_probe_far
            );
            return false;
        }
        true
    }
}
