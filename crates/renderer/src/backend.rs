//! Render backend interface and the headless CPU backend.
//!
//! A backend turns [`Drawable`]s into its own resource handles once, then
//! draws those handles every frame. Windowing, GPU contexts and shader
//! compilation live behind this trait.

use glam::Mat4;
use navwalk_game::{AssetSource, TextureError, TextureImage, TextureSlot};

use crate::drawable::{Drawable, MeshData};
use crate::uniforms::SceneUniforms;

/// Error type for render backends.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("{0} indices do not form whole triangles")]
    PartialTriangle(usize),

    #[error("shader reload failed: {0}")]
    Shader(String),
}

/// What a renderer needs from a graphics backend.
pub trait RenderBackend {
    /// Backend-side handle for one drawable.
    type Resources;

    /// Upload a drawable's geometry, uniforms and textures.
    fn build_gpu_resources(&mut self, drawable: &Drawable) -> Result<Self::Resources, RenderError>;

    /// Recompile shaders from source.
    fn reload_shaders(&mut self) -> Result<(), RenderError>;

    /// Draw one object with the frame's scene uniforms.
    fn draw(&mut self, resources: &Self::Resources, scene: &SceneUniforms)
        -> Result<(), RenderError>;
}

/// Counters for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub draw_calls: usize,
    pub triangles: usize,
}

/// Resources held by [`CpuBackend`].
#[derive(Debug, Clone)]
pub struct CpuMesh {
    pub mesh: MeshData,
    /// Indexed by [`TextureSlot::index`].
    pub textures: [TextureImage; 4],
}

/// Backend that keeps everything in memory and validates draws.
///
/// Used headless and in tests.
pub struct CpuBackend<A: AssetSource> {
    assets: A,
    shader_generation: u32,
    stats: DrawStats,
}

impl<A: AssetSource> CpuBackend<A> {
    pub fn new(assets: A) -> Self {
        Self {
            assets,
            shader_generation: 0,
            stats: DrawStats::default(),
        }
    }

    /// Reset the per-frame counters.
    pub fn begin_frame(&mut self) {
        self.stats = DrawStats::default();
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    /// Number of successful shader reloads.
    pub fn shader_generation(&self) -> u32 {
        self.shader_generation
    }
}

impl<A: AssetSource> RenderBackend for CpuBackend<A> {
    type Resources = CpuMesh;

    fn build_gpu_resources(&mut self, drawable: &Drawable) -> Result<CpuMesh, RenderError> {
        let surface = drawable.surface();
        let mesh = MeshData::from_surface(&surface, Mat4::IDENTITY);

        if !mesh.indices.len().is_multiple_of(3) {
            return Err(RenderError::PartialTriangle(mesh.indices.len()));
        }
        if let Some(index) = mesh.invalid_index() {
            return Err(RenderError::IndexOutOfRange {
                index,
                vertex_count: mesh.vertices.len(),
            });
        }

        let material = &surface.material;
        let textures = [
            TextureImage::load_map(&self.assets, material.map(TextureSlot::Color))?,
            TextureImage::load_map(&self.assets, material.map(TextureSlot::Ambient))?,
            TextureImage::load_map(&self.assets, material.map(TextureSlot::Specular))?,
            TextureImage::load_map(&self.assets, material.map(TextureSlot::Gloss))?,
        ];

        log::debug!(
            "built `{}`: {} vertices, {} triangles",
            surface.material_name,
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        Ok(CpuMesh { mesh, textures })
    }

    fn reload_shaders(&mut self) -> Result<(), RenderError> {
        self.shader_generation += 1;
        log::info!("shaders reloaded (generation {})", self.shader_generation);
        Ok(())
    }

    fn draw(&mut self, resources: &CpuMesh, _scene: &SceneUniforms) -> Result<(), RenderError> {
        self.stats.draw_calls += 1;
        self.stats.triangles += resources.mesh.triangle_count();
        Ok(())
    }
}
