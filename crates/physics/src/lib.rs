//! Navwalk Physics
//!
//! Collision queries and first-person motion for walking through a static
//! triangle scene.
//!
//! # Architecture
//!
//! - **Collision**: [`NavMesh`] stores scene triangles and answers ray queries
//! - **Movement**: [`MotionIntegrator`] proposes a step from input rates,
//!   validates it against the nav mesh and snaps the agent to the floor
//!
//! Everything runs on one thread, one frame at a time. The nav mesh is
//! filled while a scene loads and is only queried afterwards.

pub mod collision;
pub mod movement;

// Re-export commonly used types
pub use collision::NavMesh;
pub use movement::{AgentCommand, AgentState, MotionConfig, MotionIntegrator, MotionReport};
