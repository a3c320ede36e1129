//! Navwalk scene and walkthrough logic
//!
//! This crate contains everything between files on disk and the motion
//! integrator:
//!
//! - Asset access (filesystem or in-memory)
//! - OBJ/MTL ingestion into per-material surface groups and nav triangles
//! - PPM texture decoding
//! - Keyboard and mouse-look input mapping
//! - The [`Simulation`] context tying scene, agent and integrator together
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Simulation                           │
//! │  ┌─────────┐    ┌───────────────┐    ┌──────────────────┐   │
//! │  │ Input   │───►│ Motion        │───►│ Agent            │   │
//! │  │ State   │    │ Integrator    │    │ (eye position,   │   │
//! │  └─────────┘    └───────▲───────┘    │  pan, tilt)      │   │
//! │                         │            └──────────────────┘   │
//! │  ┌─────────┐    ┌───────┴───────┐                           │
//! │  │ OBJ/MTL │───►│ Scene         │                           │
//! │  │ Loader  │    │ (surfaces,    │                           │
//! │  └─────────┘    │  nav mesh)    │                           │
//! │                 └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod assets;
pub mod error;
pub mod input;
pub mod level;
pub mod simulation;
pub mod texture;

// Re-export main types
pub use assets::{AssetSource, FsAssets, MemoryAssets};
pub use error::{LoadError, ParseError, ParseErrorKind, PoolKind, TextureError};
pub use input::{InputState, Key};
pub use level::{
    Bounds, Channel, LoadOptions, Material, MaterialLibrary, MeshLoad, ObjLoader, ParseMode,
    Scene, SurfaceGroup, TextureMap, TextureSlot,
};
pub use simulation::{Simulation, SimulationConfig};
pub use texture::TextureImage;

// Re-export physics types for convenience
pub use navwalk_physics::{
    AgentCommand, AgentState, MotionConfig, MotionIntegrator, MotionReport, NavMesh,
};
