//! First-person agent motion.
//!
//! The [`MotionIntegrator`] turns move/strafe rates into a validated position
//! each frame using two [`NavMesh`](crate::collision::NavMesh) queries:
//!
//! - `anyhit` along the step direction over the clearance band
//! - `trace` straight down to keep the eye a fixed height above the floor

mod config;
mod integrator;
mod state;

pub use config::MotionConfig;
pub use integrator::{MotionIntegrator, MotionReport};
pub use state::{AgentCommand, AgentState};
