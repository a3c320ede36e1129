//! GPU data layouts: uniform blocks and the vertex format.
//!
//! All blocks are `#[repr(C)]` and padded to std140 rules (every `vec3` is
//! stored as a `vec4`), so they can be uploaded with [`bytemuck::bytes_of`].

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use navwalk_game::Material;

use crate::camera::FirstPersonCamera;

/// Directional light with an ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Direction towards the light (not necessarily normalized).
    pub direction: Vec3,

    /// Ambient intensity in `[0, 1]`.
    pub ambient: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-1.0, -2.0, 2.0),
            ambient: 0.0,
        }
    }
}

impl Lighting {
    /// Ambient change per [`cycle_ambient`](Self::cycle_ambient).
    pub const AMBIENT_STEP: f32 = 0.2;

    /// Raise the ambient term one step, wrapping to zero past full.
    pub fn cycle_ambient(&mut self) {
        self.ambient += Self::AMBIENT_STEP;
        if self.ambient > 1.0 + 1e-4 {
            self.ambient = 0.0;
        }
    }

    /// Packed as `(direction, ambient)`.
    #[inline]
    pub fn to_vec4(&self) -> Vec4 {
        self.direction.extend(self.ambient)
    }
}

/// Per-frame values shared by every draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub proj_from_world: [[f32; 4]; 4],
    pub world_from_proj: [[f32; 4]; 4],
    /// xyz: light direction, w: ambient intensity.
    pub light_dir: [f32; 4],
}

impl SceneUniforms {
    pub fn new(camera: &FirstPersonCamera, lighting: &Lighting) -> Self {
        let proj_from_world = camera.proj_from_world();
        Self {
            proj_from_world: proj_from_world.to_cols_array_2d(),
            world_from_proj: proj_from_world.inverse().to_cols_array_2d(),
            light_dir: lighting.to_vec4().to_array(),
        }
    }
}

/// Per-object transform and material values.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub world_from_model: [[f32; 4]; 4],
    pub model_from_world: [[f32; 4]; 4],
    /// rgb, w unused.
    pub ambient: [f32; 4],
    /// rgb, w unused.
    pub diffuse: [f32; 4],
    /// rgb: specular colour, w: specular exponent.
    pub specular: [f32; 4],
}

impl ObjectUniforms {
    pub fn new(material: &Material, world_from_model: Mat4) -> Self {
        Self {
            world_from_model: world_from_model.to_cols_array_2d(),
            model_from_world: world_from_model.inverse().to_cols_array_2d(),
            ambient: material.ambient.extend(0.0).to_array(),
            diffuse: material.diffuse.extend(0.0).to_array(),
            specular: material.specular.extend(material.shininess).to_array(),
        }
    }
}

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GpuVertex {
    /// Byte offsets of `(position, normal, uv)` for attribute setup.
    pub const OFFSETS: [usize; 3] = [0, 12, 24];
}
