//! Scene geometry: loaded meshes, their materials, and the nav mesh.
//!
//! Mesh files are parsed into a [`MeshLoad`] first and only then committed to
//! a [`Scene`], so a failed load never leaves a half-built scene behind.

mod mtl;
mod obj;
mod plane;
mod surface;

pub use mtl::{Channel, Material, MaterialLibrary, TextureMap, TextureSlot};
pub use obj::ObjLoader;
pub use plane::plane_surface;
pub use surface::SurfaceGroup;

use std::path::{Path, PathBuf};

use glam::Vec3;
use navwalk_physics::NavMesh;
use serde::{Deserialize, Serialize};

use crate::assets::AssetSource;
use crate::error::LoadError;

/// How strictly mesh and material text is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    /// Skip short coordinate lines, directives with missing arguments, faces
    /// with fewer than three vertices, and map unknown materials to
    /// defaults.
    #[default]
    Lenient,
    /// Fail on every malformed known directive and on unknown materials.
    Strict,
}

/// Options for [`ObjLoader`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    pub mode: ParseMode,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// Contains nothing; including any point makes it that point.
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    #[inline]
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Size along each axis, or zero for an empty box.
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }
}

/// Result of parsing one mesh file, not yet part of any scene.
#[derive(Debug, Clone)]
pub struct MeshLoad {
    /// The OBJ file that was loaded.
    pub source: PathBuf,
    /// One group per material run, in file order.
    pub surfaces: Vec<SurfaceGroup>,
    /// Every emitted triangle, in file order.
    pub nav_triangles: Vec<[Vec3; 3]>,
    /// Bounds of every `v` in the file, referenced or not.
    pub bounds: Bounds,
    pub materials: MaterialLibrary,
}

impl MeshLoad {
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.bounds.extent()
    }

    pub fn triangle_count(&self) -> usize {
        self.nav_triangles.len()
    }
}

/// Everything that can be drawn or walked on.
#[derive(Debug, Default)]
pub struct Scene {
    /// Drawable groups, in load order.
    pub surfaces: Vec<SurfaceGroup>,

    /// Triangles the agent collides with and stands on.
    pub nav_mesh: NavMesh,

    /// Union of the bounds of every committed load.
    pub bounds: Bounds,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mesh file and add it to the scene.
    ///
    /// When `navigable` is set its triangles also join the nav mesh. Returns
    /// the extent of the loaded file's vertices.
    pub fn load_mesh<A: AssetSource + ?Sized>(
        &mut self,
        assets: &A,
        path: &Path,
        options: LoadOptions,
        navigable: bool,
    ) -> Result<Vec3, LoadError> {
        let load = ObjLoader::new(assets, options).load(path)?;
        Ok(self.commit(load, navigable))
    }

    /// Add a parsed mesh to the scene and return its extent.
    pub fn commit(&mut self, load: MeshLoad, navigable: bool) -> Vec3 {
        if navigable {
            let degenerate = self.nav_mesh.degenerate_count();
            self.nav_mesh.extend_triangles(load.nav_triangles.iter().copied());

            let added = self.nav_mesh.degenerate_count() - degenerate;
            if added > 0 {
                log::warn!(
                    "{}: {} zero-area triangles (kept, never hit)",
                    load.source.display(),
                    added
                );
            }
        }
        self.bounds = self.bounds.union(&load.bounds);
        self.surfaces.extend(load.surfaces);

        log::debug!(
            "committed {} (navigable: {}), nav mesh now {} triangles",
            load.source.display(),
            navigable,
            self.nav_mesh.len()
        );
        load.bounds.extent()
    }

    /// Add a single procedural surface.
    pub fn add_surface(&mut self, surface: SurfaceGroup, navigable: bool) {
        if navigable {
            self.nav_mesh.extend_triangles(surface.triangle_positions());
        }
        for &p in &surface.positions {
            self.bounds.include(p);
        }
        self.surfaces.push(surface);
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Drawn triangles across all surfaces.
    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(SurfaceGroup::triangle_count).sum()
    }

    /// Remove all geometry.
    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.nav_mesh.clear();
        self.bounds = Bounds::EMPTY;
    }
}
