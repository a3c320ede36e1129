//! First-person camera for rendering.
//!
//! The world is Z-up. View space follows the GL convention (looking down
//! `-Z`), so with `tilt = 0` the camera looks straight down; `tilt = -π/2`
//! looks along the horizontal facing given by `pan`.

use glam::{Mat4, Vec3};
use navwalk_game::AgentState;

/// First-person camera state.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstPersonCamera {
    /// Eye position in world space.
    pub position: Vec3,

    /// Rotation about world Z (radians).
    pub pan: f32,

    /// Rotation about the view X axis (radians).
    pub tilt: f32,

    /// Vertical field of view in radians.
    pub fov: f32,

    /// Near clipping plane.
    pub near: f32,

    /// Far clipping plane.
    pub far: f32,

    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            pan: 0.0,
            tilt: 0.0,
            fov: std::f32::consts::FRAC_PI_4,
            near: 1.0,
            far: 20000.0,
            aspect: 4.0 / 3.0,
        }
    }
}

impl FirstPersonCamera {
    /// Create a new camera at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set the viewport size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Get the view matrix: `Rx(tilt) · Rz(pan) · T(-position)`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.tilt)
            * Mat4::from_rotation_z(self.pan)
            * Mat4::from_translation(-self.position)
    }

    /// Get the projection matrix for rendering.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
    }

    /// Get the combined world-to-clip matrix.
    pub fn proj_from_world(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space direction the camera looks along.
    pub fn view_direction(&self) -> Vec3 {
        let rotation = Mat4::from_rotation_x(self.tilt) * Mat4::from_rotation_z(self.pan);
        rotation.inverse().transform_vector3(Vec3::NEG_Z)
    }

    /// Update camera from the agent.
    pub fn update_from_agent(&mut self, agent: &AgentState) {
        self.position = agent.position;
        self.pan = agent.pan;
        self.tilt = agent.tilt;
    }
}
