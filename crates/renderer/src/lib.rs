//! Navwalk Renderer
//!
//! Render-side data for the walkthrough, independent of any graphics API.
//!
//! # Features
//!
//! - First-person camera matrices
//! - std140 uniform blocks and the interleaved vertex layout
//! - [`Drawable`] objects (loaded mesh surfaces and a procedural plane)
//! - The [`RenderBackend`] trait, with a headless [`CpuBackend`]
//!
//! # Usage
//!
//! Build resources for each drawable once. Each frame, update the camera
//! from the agent, fill [`SceneUniforms`] and draw every resource.

pub mod backend;
pub mod camera;
pub mod drawable;
pub mod uniforms;

pub use backend::{CpuBackend, CpuMesh, DrawStats, RenderBackend, RenderError};
pub use camera::FirstPersonCamera;
pub use drawable::{Drawable, MeshData};
pub use uniforms::{GpuVertex, Lighting, ObjectUniforms, SceneUniforms};
