//! Agent state and per-frame input command.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Position and facing of the walking agent (the camera eye).
///
/// The world is Z-up. `pan` turns around Z, `tilt` around the view X axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Eye position in world space.
    pub position: Vec3,

    /// Horizontal facing angle (radians).
    pub pan: f32,

    /// Vertical facing angle (radians).
    pub tilt: f32,

    /// Forward/backward rate (units/second, signed).
    pub move_rate: f32,

    /// Right/left rate (units/second, signed).
    pub strafe_rate: f32,
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl AgentState {
    /// Create a stationary agent at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            pan: 0.0,
            tilt: 0.0,
            move_rate: 0.0,
            strafe_rate: 0.0,
        }
    }

    /// Builder-style facing setter.
    pub fn with_facing(mut self, pan: f32, tilt: f32) -> Self {
        self.pan = pan;
        self.tilt = tilt;
        self
    }

    /// Horizontal forward direction for the current pan.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        let (sin_pan, cos_pan) = self.pan.sin_cos();
        Vec3::new(sin_pan, cos_pan, 0.0)
    }

    /// Horizontal right direction for the current pan.
    #[inline]
    pub fn right(&self) -> Vec3 {
        let (sin_pan, cos_pan) = self.pan.sin_cos();
        Vec3::new(cos_pan, -sin_pan, 0.0)
    }

    /// Check if any motion rate is set.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.move_rate != 0.0 || self.strafe_rate != 0.0
    }

    /// Displacement the current rates would produce over `delta_time`.
    pub fn proposed_motion(&self, delta_time: f32) -> Vec3 {
        self.forward() * (self.move_rate * delta_time)
            + self.right() * (self.strafe_rate * delta_time)
    }

    /// Apply an input command: turn, then take its rates.
    pub fn apply_command(&mut self, command: &AgentCommand) {
        self.pan += command.pan_delta;
        self.tilt += command.tilt_delta;
        self.move_rate = command.move_rate;
        self.strafe_rate = command.strafe_rate;
    }
}

/// Per-frame input from the input layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentCommand {
    /// Forward rate (`±speed` or 0).
    pub move_rate: f32,

    /// Strafe rate (`±speed` or 0).
    pub strafe_rate: f32,

    /// Pan change since the last frame (radians).
    pub pan_delta: f32,

    /// Tilt change since the last frame (radians).
    pub tilt_delta: f32,
}
