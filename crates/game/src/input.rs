//! Keyboard and mouse-look handling.
//!
//! Converts key and pointer events into [`AgentCommand`]s for the motion
//! integrator. Windowing is not handled here; the host forwards events.

use navwalk_physics::AgentCommand;
use serde::{Deserialize, Serialize};

/// Movement keys (W, S, A, D by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
}

/// Live input state between frames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputState {
    /// Rate set by a movement key press (units/second).
    pub speed: f32,

    move_rate: f32,
    strafe_rate: f32,

    /// Last pointer position while captured.
    pointer: Option<(f32, f32)>,
    pan_delta: f32,
    tilt_delta: f32,
}

impl InputState {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            ..Default::default()
        }
    }

    /// Handle a key press or release.
    ///
    /// Releasing either key of an axis stops that axis, even if the other
    /// key is still held.
    pub fn key(&mut self, key: Key, pressed: bool) {
        match (key, pressed) {
            (Key::Forward, true) => self.move_rate = self.speed,
            (Key::Backward, true) => self.move_rate = -self.speed,
            (Key::StrafeRight, true) => self.strafe_rate = self.speed,
            (Key::StrafeLeft, true) => self.strafe_rate = -self.speed,
            (Key::Forward | Key::Backward, false) => self.move_rate = 0.0,
            (Key::StrafeLeft | Key::StrafeRight, false) => self.strafe_rate = 0.0,
        }
    }

    /// Start mouse look from the given pointer position.
    pub fn capture_pointer(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));
    }

    /// Stop mouse look.
    pub fn release_pointer(&mut self) {
        self.pointer = None;
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        self.pointer.is_some()
    }

    /// Handle a pointer move inside a `width` by `height` viewport.
    ///
    /// A full viewport width turns half a revolution; a full height tilts a
    /// quarter. Ignored unless captured.
    pub fn pointer_moved(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let Some((last_x, last_y)) = self.pointer else {
            return;
        };
        if width > 0.0 && height > 0.0 {
            self.pan_delta += std::f32::consts::PI * (x - last_x) / width;
            self.tilt_delta += std::f32::consts::FRAC_PI_2 * (y - last_y) / height;
        }
        self.pointer = Some((x, y));
    }

    /// Command for this frame. Clears the accumulated look deltas.
    pub fn take_command(&mut self) -> AgentCommand {
        let command = AgentCommand {
            move_rate: self.move_rate,
            strafe_rate: self.strafe_rate,
            pan_delta: self.pan_delta,
            tilt_delta: self.tilt_delta,
        };
        self.pan_delta = 0.0;
        self.tilt_delta = 0.0;
        command
    }
}
