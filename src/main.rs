//! Navwalk - Main Entry Point
//!
//! Loads a mesh, drops the camera at the spawn point and runs a scripted
//! walkthrough headlessly, drawing every frame through the CPU backend.
//!
//! ```text
//! navwalk <mesh.obj> [frames]
//! ```
//!
//! Relative paths are resolved against `NAVWALK_DATA_DIR` when it is set.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use navwalk_game::{FsAssets, InputState, Key, Simulation, SimulationConfig};
use navwalk_renderer::{
    CpuBackend, Drawable, FirstPersonCamera, Lighting, RenderBackend, SceneUniforms,
};

const DEFAULT_FRAMES: u32 = 600;
const VIEWPORT: (f32, f32) = (800.0, 600.0);

/// One scripted input change.
enum Action {
    Key(Key, bool),
    Look(f32, f32),
}

/// Input script keyed by the frame it fires on.
fn script(frames: u32) -> Vec<(u32, Action)> {
    let third = frames / 3;
    vec![
        (0, Action::Key(Key::Forward, true)),
        (third, Action::Key(Key::StrafeRight, true)),
        (third, Action::Look(VIEWPORT.0 * 0.25, 0.0)),
        (2 * third, Action::Key(Key::StrafeRight, false)),
        (2 * third, Action::Key(Key::Backward, true)),
        (2 * third, Action::Look(-VIEWPORT.0 * 0.5, VIEWPORT.1 * 0.1)),
    ]
}

fn parse_args() -> Result<(PathBuf, u32)> {
    let mut args = std::env::args().skip(1);
    let Some(mesh) = args.next() else {
        bail!("usage: navwalk <mesh.obj> [frames]");
    };
    let frames = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid frame count `{n}`"))?,
        None => DEFAULT_FRAMES,
    };
    Ok((PathBuf::from(mesh), frames))
}

fn main() -> Result<()> {
    env_logger::init();

    let (mesh, frames) = parse_args()?;
    let assets = match std::env::var_os("NAVWALK_DATA_DIR") {
        Some(dir) => FsAssets::with_data_dir(dir),
        None => FsAssets::new(),
    };

    // Create simulation
    let config = SimulationConfig::default();
    let mut simulation = Simulation::new(config.clone());
    let extent = simulation
        .load_mesh(&assets, &mesh)
        .with_context(|| format!("failed to load {}", mesh.display()))?;
    println!("loaded {}: extent {:?}", mesh.display(), extent);

    // Upload drawables
    let mut backend = CpuBackend::new(assets);
    let drawables = Drawable::from_surfaces(&simulation.scene.surfaces);
    let resources = drawables
        .iter()
        .map(|drawable| backend.build_gpu_resources(drawable))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to build render resources")?;

    let mut camera = FirstPersonCamera::default();
    camera.resize(VIEWPORT.0 as u32, VIEWPORT.1 as u32);
    let mut lighting = Lighting::default();

    // Input state
    let mut input = InputState::new(config.motion.speed);
    let mut pointer = (VIEWPORT.0 * 0.5, VIEWPORT.1 * 0.5);
    input.capture_pointer(pointer.0, pointer.1);
    let script = script(frames);

    let start = simulation.agent.position;
    let (mut moved, mut blocked, mut on_floor) = (0u32, 0u32, 0u32);
    let mut triangles_drawn = 0usize;

    // Main loop
    for frame in 0..frames {
        for (_, action) in script.iter().filter(|(at, _)| *at == frame) {
            match *action {
                Action::Key(key, pressed) => input.key(key, pressed),
                Action::Look(dx, dy) => {
                    pointer = (pointer.0 + dx, pointer.1 + dy);
                    input.pointer_moved(pointer.0, pointer.1, VIEWPORT.0, VIEWPORT.1);
                }
            }
        }
        if frame > 0 && frame % 120 == 0 {
            lighting.cycle_ambient();
        }

        // Update simulation
        let report = simulation.step(&input.take_command());
        moved += report.moved as u32;
        blocked += report.blocked as u32;
        on_floor += report.on_floor() as u32;

        // Render
        camera.update_from_agent(&simulation.agent);
        let scene_uniforms = SceneUniforms::new(&camera, &lighting);
        backend.begin_frame();
        for resource in &resources {
            backend.draw(resource, &scene_uniforms)?;
        }
        triangles_drawn += backend.stats().triangles;

        if frame % 60 == 0 {
            log::info!(
                "frame {frame}: position {:?}, pan {:.2}, floor {:?}",
                simulation.agent.position,
                simulation.agent.pan,
                report.floor_distance
            );
        }
    }

    let end = simulation.agent.position;
    println!("frames: {frames} (moved {moved}, blocked {blocked}, on floor {on_floor})");
    println!(
        "start {:?} -> end {:?} ({:.1} units)",
        start,
        end,
        (end - start).length()
    );
    println!(
        "drew {} surfaces, {} triangles total",
        resources.len(),
        triangles_drawn
    );
    Ok(())
}
