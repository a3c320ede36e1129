//! Walkthrough simulation: the scene, the agent and the per-frame step.
//!
//! All state lives in [`Simulation`]; the host owns it and passes it to
//! whatever needs it (input handling, drawing).

use std::path::Path;
use std::time::Instant;

use glam::{Vec2, Vec3};
use navwalk_physics::{AgentCommand, AgentState, MotionConfig, MotionIntegrator, MotionReport};
use serde::{Deserialize, Serialize};

use crate::assets::AssetSource;
use crate::error::LoadError;
use crate::level::{plane_surface, LoadOptions, Scene};

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Fixed tick rate used by [`Simulation::step`] (ticks per second).
    pub tick_rate: u32,

    /// Motion configuration.
    pub motion: MotionConfig,

    /// Mesh parsing options.
    pub load: LoadOptions,

    // ========================================================================
    // Spawn
    // ========================================================================
    pub spawn_position: Vec3,
    pub spawn_pan: f32,
    pub spawn_tilt: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            motion: MotionConfig::default(),
            load: LoadOptions::default(),
            spawn_position: Vec3::new(-10000.0, -1150.0, 500.0),
            spawn_pan: 1.57,
            spawn_tilt: -1.4,
        }
    }
}

impl SimulationConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Agent at the spawn point.
    pub fn spawn(&self) -> AgentState {
        AgentState::new(self.spawn_position).with_facing(self.spawn_pan, self.spawn_tilt)
    }
}

/// The walkthrough context.
#[derive(Debug)]
pub struct Simulation {
    /// Frames stepped so far.
    pub frame: u64,

    pub config: SimulationConfig,

    /// Loaded geometry.
    pub scene: Scene,

    /// The walking camera.
    pub agent: AgentState,

    integrator: MotionIntegrator,
}

impl Simulation {
    /// Create a simulation with an empty scene.
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_scene(config, Scene::new())
    }

    pub fn with_scene(config: SimulationConfig, scene: Scene) -> Self {
        let integrator = MotionIntegrator::new(config.motion.clone());
        let agent = config.spawn();

        Self {
            frame: 0,
            config,
            scene,
            agent,
            integrator,
        }
    }

    /// Default config on a large flat ground plane at `z = 0`.
    pub fn test() -> Self {
        let mut scene = Scene::new();
        scene.add_surface(plane_surface(Vec2::splat(100_000.0), None), true);
        Self::with_scene(SimulationConfig::default(), scene)
    }

    /// Load a mesh into the scene as walkable geometry.
    ///
    /// Returns the mesh's extent. On error the scene is unchanged.
    pub fn load_mesh<A: AssetSource + ?Sized>(
        &mut self,
        assets: &A,
        path: &Path,
    ) -> Result<Vec3, LoadError> {
        let started = Instant::now();
        let extent = self.scene.load_mesh(assets, path, self.config.load, true)?;

        log::info!(
            "loaded {} in {:.1?}: {} surfaces, {} nav triangles, extent {:?}",
            path.display(),
            started.elapsed(),
            self.scene.surface_count(),
            self.scene.nav_mesh.len(),
            extent
        );
        self.config.motion.check_scene_scale(extent);
        Ok(extent)
    }

    /// Advance by `delta_time` seconds with the given input.
    pub fn tick(&mut self, delta_time: f32, command: &AgentCommand) -> MotionReport {
        self.agent.apply_command(command);
        let report = self
            .integrator
            .update(&mut self.agent, &self.scene.nav_mesh, delta_time);

        if report.blocked {
            log::trace!("frame {}: blocked at {:?}", self.frame, self.agent.position);
        }
        self.frame += 1;
        report
    }

    /// Advance by one fixed tick.
    pub fn step(&mut self, command: &AgentCommand) -> MotionReport {
        self.tick(self.config.delta_time(), command)
    }

    /// Put the agent back at the spawn point, standing on the floor below
    /// it if there is one in reach.
    pub fn respawn(&mut self) {
        self.agent = self.config.spawn();
        self.integrator.settle(&mut self.agent, &self.scene.nav_mesh);
    }

    pub fn integrator(&self) -> &MotionIntegrator {
        &self.integrator
    }
}

// ============================================================================
// Tests
// ============================================================================
