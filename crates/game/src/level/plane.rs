//! Procedural ground plane.

use std::path::PathBuf;

use glam::{Vec2, Vec3};

use super::mtl::{Material, TextureMap, TextureSlot};
use super::surface::SurfaceGroup;

/// A flat `size.x` by `size.y` quad on the XY plane, facing +Z.
///
/// Texture coordinates run 0..1 across the quad. The material is white and
/// takes `texture` as its colour map.
pub fn plane_surface(size: Vec2, texture: Option<PathBuf>) -> SurfaceGroup {
    let half = size * 0.5;
    let positions = vec![
        Vec3::new(-half.x, -half.y, 0.0),
        Vec3::new(half.x, -half.y, 0.0),
        Vec3::new(-half.x, half.y, 0.0),
        Vec3::new(half.x, half.y, 0.0),
    ];
    let texcoords = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
    ];

    let mut material = Material::white();
    material.set_map(
        TextureSlot::Color,
        texture.map(|path| TextureMap {
            path,
            channel: None,
        }),
    );

    SurfaceGroup {
        material_name: "plane".to_string(),
        material,
        positions,
        normals: vec![Vec3::Z; 4],
        texcoords,
        indices: vec![0, 1, 3, 0, 3, 2],
    }
}
