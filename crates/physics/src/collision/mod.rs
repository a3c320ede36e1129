//! Ray queries against static scene triangles.
//!
//! # Key Types
//!
//! - [`NavMesh`]: append-only triangle soup with precomputed plane tests
//!
//! # Queries
//!
//! Both queries take a start point, a unit direction and a `[near, far]`
//! distance band:
//! - [`NavMesh::trace`] returns the closest hit distance (or `far`)
//! - [`NavMesh::anyhit`] returns whether anything lies in the band

mod nav_mesh;

pub use nav_mesh::NavMesh;
