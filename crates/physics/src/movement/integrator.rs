//! Per-frame motion integration against the nav mesh.
//!
//! Each frame:
//! 1. Propose a displacement from the move/strafe rates
//! 2. Reject it if anything lies in the clearance band along its direction
//! 3. Probe straight down and rest the eye `eye_height` above the floor
//!
//! There is no sliding and no gravity. A blocked step keeps the old
//! position; an agent with no floor in range keeps its height.

use glam::Vec3;

use crate::collision::NavMesh;

use super::config::MotionConfig;
use super::state::AgentState;

/// What happened during one [`MotionIntegrator::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionReport {
    /// The horizontal step was accepted.
    pub moved: bool,

    /// A step was proposed but the clearance check failed.
    pub blocked: bool,

    /// Floor distance below the candidate position, if it was in snap range.
    pub floor_distance: Option<f32>,
}

impl MotionReport {
    /// Check if the agent was snapped to a floor this frame.
    #[inline]
    pub fn on_floor(&self) -> bool {
        self.floor_distance.is_some()
    }
}

/// Agent motion integrator.
///
/// # Example
///
/// ```ignore
/// let integrator = MotionIntegrator::new(MotionConfig::default());
/// let mut agent = AgentState::new(spawn);
///
/// // Each frame:
/// agent.apply_command(&command);
/// integrator.update(&mut agent, &nav_mesh, delta_time);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MotionIntegrator {
    /// Motion configuration.
    pub config: MotionConfig,
}

impl MotionIntegrator {
    /// Create a new integrator with the given configuration.
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    /// Advance the agent by one frame.
    pub fn update(&self, state: &mut AgentState, nav: &NavMesh, delta_time: f32) -> MotionReport {
        let mut report = MotionReport::default();
        let mut next = state.position;

        if state.is_moving() {
            let motion = state.proposed_motion(delta_time);
            let direction = motion.normalize_or_zero();

            if direction != Vec3::ZERO
                && !nav.anyhit(
                    state.position,
                    direction,
                    self.config.clearance_near,
                    self.config.clearance_far,
                )
            {
                next += motion;
                report.moved = true;
            } else {
                report.blocked = direction != Vec3::ZERO;
            }
        }

        if let Some(floor) = self.floor_below(next, nav) {
            next.z = next.z - floor + self.config.eye_height;
            report.floor_distance = Some(floor);
        }

        state.position = next;
        report
    }

    /// Distance to the floor below `position` if it lies inside the snap band.
    pub fn floor_below(&self, position: Vec3, nav: &NavMesh) -> Option<f32> {
        let floor = nav.trace(
            position,
            Vec3::NEG_Z,
            self.config.floor_probe_near,
            self.config.floor_probe_far,
        );

        (floor > self.config.floor_snap_min && floor < self.config.floor_probe_far).then_some(floor)
    }

    /// Drop a freshly spawned agent onto the floor below it, if any.
    ///
    /// Returns whether a floor was found.
    pub fn settle(&self, state: &mut AgentState, nav: &NavMesh) -> bool {
        match self.floor_below(state.position, nav) {
            Some(floor) => {
                state.position.z = state.position.z - floor + self.config.eye_height;
                true
            }
            None => {
                log::debug!("no floor below spawn at {:?}", state.position);
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Large flat floor at the given height.
    fn floor_mesh(z: f32) -> NavMesh {
        let size = 100_000.0;
        let a = Vec3::new(-size, -size, z);
        let b = Vec3::new(size, -size, z);
        let c = Vec3::new(size, size, z);
        let d = Vec3::new(-size, size, z);

        let mut mesh = NavMesh::new();
        mesh.add_triangle(a, b, c);
        mesh.add_triangle(a, c, d);
        mesh
    }

    /// Add a wall across the +Y direction at the given y.
    fn add_wall(mesh: &mut NavMesh, y: f32) {
        let a = Vec3::new(-5000.0, y, -5000.0);
        let b = Vec3::new(5000.0, y, -5000.0);
        let c = Vec3::new(5000.0, y, 5000.0);
        let d = Vec3::new(-5000.0, y, 5000.0);
        mesh.add_triangle(a, b, c);
        mesh.add_triangle(a, c, d);
    }

    #[test]
    fn test_floor_snap_to_eye_height() {
        let nav = floor_mesh(0.0);
        let integrator = MotionIntegrator::default();
        let mut agent = AgentState::new(Vec3::new(0.0, 0.0, 600.0));

        let report = integrator.update(&mut agent, &nav, 1.0 / 60.0);

        assert!(!report.moved);
        assert_eq!(report.floor_distance, Some(600.0));
        assert!((agent.position.z - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_floor_too_close_or_far_keeps_height() {
        let nav = floor_mesh(0.0);
        let integrator = MotionIntegrator::default();

        // Inside the snap minimum
        let mut low = AgentState::new(Vec3::new(0.0, 0.0, 200.0));
        let report = integrator.update(&mut low, &nav, 1.0 / 60.0);
        assert!(!report.on_floor());
        assert_eq!(low.position.z, 200.0);

        // Beyond the probe
        let mut high = AgentState::new(Vec3::new(0.0, 0.0, 900.0));
        let report = integrator.update(&mut high, &nav, 1.0 / 60.0);
        assert!(!report.on_floor());
        assert_eq!(high.position.z, 900.0);
    }

    #[test]
    fn test_free_move_covers_full_displacement() {
        let nav = NavMesh::new();
        let integrator = MotionIntegrator::default();
        let mut agent = AgentState::new(Vec3::new(10.0, 20.0, 30.0));
        agent.move_rate = 1000.0;

        let report = integrator.update(&mut agent, &nav, 0.1);

        assert!(report.moved);
        assert!(!report.blocked);
        assert!((agent.position - Vec3::new(10.0, 120.0, 30.0)).length() < 1e-3);
    }

    #[test]
    fn test_walk_on_floor_keeps_eye_height() {
        let nav = floor_mesh(-500.0);
        let integrator = MotionIntegrator::default();
        let mut agent = AgentState::new(Vec3::ZERO).with_facing(std::f32::consts::FRAC_PI_2, 0.0);
        agent.move_rate = 1000.0;

        for _ in 0..10 {
            let report = integrator.update(&mut agent, &nav, 0.1);
            assert!(report.moved);
            assert!(report.on_floor());
        }

        assert!((agent.position.x - 1000.0).abs() < 1e-2);
        assert!(agent.position.y.abs() < 1e-2);
        assert!(agent.position.z.abs() < 1e-3);
    }

    #[test]
    fn test_wall_in_clearance_band_blocks() {
        let mut nav = floor_mesh(-500.0);
        add_wall(&mut nav, 200.0);
        let integrator = MotionIntegrator::default();
        let mut agent = AgentState::new(Vec3::ZERO);
        agent.move_rate = 1000.0;

        // Step is only 10 units, but the wall is within the 250 clearance
        let report = integrator.update(&mut agent, &nav, 0.01);

        assert!(!report.moved);
        assert!(report.blocked);
        assert!(agent.position.y.abs() < 1e-4);
        assert!(report.on_floor());
    }

    #[test]
    fn test_wall_outside_clearance_band_allows_move() {
        let mut nav = NavMesh::new();
        add_wall(&mut nav, 400.0);
        let integrator = MotionIntegrator::default();
        let mut agent = AgentState::new(Vec3::ZERO);
        agent.move_rate = 1000.0;

        let report = integrator.update(&mut agent, &nav, 0.01);

        assert!(report.moved);
        assert!((agent.position.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_wall_behind_does_not_block() {
        let mut nav = NavMesh::new();
        add_wall(&mut nav, -100.0);
        let integrator = MotionIntegrator::default();
        let mut agent = AgentState::new(Vec3::ZERO);
        agent.move_rate = 1000.0;

        assert!(integrator.update(&mut agent, &nav, 0.01).moved);

        // Backing into it is blocked
        agent.move_rate = -1000.0;
        let report = integrator.update(&mut agent, &nav, 0.01);
        assert!(report.blocked);
    }

    #[test]
    fn test_zero_time_step_does_not_move() {
        let nav = NavMesh::new();
        let integrator = MotionIntegrator::default();
        let mut agent = AgentState::new(Vec3::ZERO);
        agent.move_rate = 1000.0;

        let report = integrator.update(&mut agent, &nav, 0.0);
        assert!(!report.moved);
        assert!(!report.blocked);
        assert_eq!(agent.position, Vec3::ZERO);
    }

    #[test]
    fn test_settle_on_spawn() {
        let nav = floor_mesh(0.0);
        let integrator = MotionIntegrator::default();

        let mut agent = AgentState::new(Vec3::new(3.0, 4.0, 700.0));
        assert!(integrator.settle(&mut agent, &nav));
        assert!((agent.position.z - 500.0).abs() < 1e-3);

        let mut floating = AgentState::new(Vec3::new(3.0, 4.0, 5000.0));
        assert!(!integrator.settle(&mut floating, &nav));
        assert_eq!(floating.position.z, 5000.0);
    }
}
