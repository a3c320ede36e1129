//! Things that can be drawn, and their backend-independent GPU data.

use std::borrow::Cow;
use std::path::PathBuf;

use glam::{Mat4, Vec2};
use navwalk_game::level::plane_surface;
use navwalk_game::{Material, SurfaceGroup};

use crate::uniforms::{GpuVertex, ObjectUniforms};

/// A drawable object.
#[derive(Debug, Clone)]
pub enum Drawable {
    /// One material group of a loaded mesh.
    Surface(Box<SurfaceGroup>),

    /// Procedural quad on the XY plane, facing +Z.
    Plane {
        size: Vec2,
        texture: Option<PathBuf>,
    },
}

impl Drawable {
    /// Triangle data for this drawable.
    pub fn surface(&self) -> Cow<'_, SurfaceGroup> {
        match self {
            Self::Surface(surface) => Cow::Borrowed(surface.as_ref()),
            Self::Plane { size, texture } => Cow::Owned(plane_surface(*size, texture.clone())),
        }
    }

    /// Wrap every surface of a scene.
    pub fn from_surfaces<'a>(surfaces: impl IntoIterator<Item = &'a SurfaceGroup>) -> Vec<Self> {
        surfaces
            .into_iter()
            .map(|surface| Self::Surface(Box::new(surface.clone())))
            .collect()
    }
}

/// Interleaved vertices, indices and uniforms ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<GpuVertex>,
    pub indices: Vec<u32>,
    pub material: Material,
    pub object: ObjectUniforms,
}

impl MeshData {
    /// Build from a surface placed at `world_from_model`.
    pub fn from_surface(surface: &SurfaceGroup, world_from_model: Mat4) -> Self {
        let vertices = surface
            .positions
            .iter()
            .zip(&surface.normals)
            .zip(&surface.texcoords)
            .map(|((p, n), uv)| GpuVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect();

        Self {
            vertices,
            indices: surface.indices.clone(),
            material: surface.material.clone(),
            object: ObjectUniforms::new(&surface.material, world_from_model),
        }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// First index that points past the vertex array, if any.
    pub fn invalid_index(&self) -> Option<u32> {
        let len = self.vertices.len();
        self.indices.iter().copied().find(|&i| i as usize >= len)
    }
}
