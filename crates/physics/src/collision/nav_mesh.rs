//! Navigation mesh: a triangle soup answering ray queries.
//!
//! Every triangle is stored as three precomputed plane vectors so that a
//! ray query needs only dot products per triangle:
//!
//! - `plane`: unit normal `N` and `-dot(N, v0)`
//! - `alpha`: scaled edge normal `Na` and `-dot(Na, v1)`
//! - `beta`: scaled edge normal `Nb` and `-dot(Nb, v2)`
//!
//! For a point `p` on the plane, `a = dot(alpha, p)` and `b = dot(beta, p)`
//! are barycentric coordinates. The point lies inside the triangle iff
//! `0 <= a <= 1`, `b >= 0` and `a + b <= 1`.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Append-only set of triangles for movement collision and floor tracing.
///
/// The three columns are always the same length and indexed in lockstep.
///
/// # Thread Safety
///
/// Queries take `&self`; once built, the mesh can be shared across threads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavMesh {
    plane: Vec<Vec4>,
    alpha: Vec<Vec4>,
    beta: Vec<Vec4>,
    #[serde(default)]
    degenerate: usize,
}

impl NavMesh {
    /// Create an empty navigation mesh.
    pub fn new() -> Self {
        Self {
            plane: Vec::new(),
            alpha: Vec::new(),
            beta: Vec::new(),
            degenerate: 0,
        }
    }

    /// Add a triangle given its corners in consistent winding.
    ///
    /// Zero-area triangles are accepted and logged. Their normal is NaN, so
    /// they can never produce a hit.
    pub fn add_triangle(&mut self, v0: Vec3, v1: Vec3, v2: Vec3) {
        let e0 = v1 - v2;
        let e1 = v2 - v0;
        let e2 = v0 - v1;

        let cross = e0.cross(e1);
        if cross.length_squared() == 0.0 {
            self.degenerate += 1;
            log::debug!(
                "degenerate nav triangle #{}: {:?} {:?} {:?}",
                self.len(),
                v0,
                v1,
                v2
            );
        }

        let n = cross.normalize();
        let na = n.cross(e0);
        let nb = n.cross(e1);
        let na = na / na.dot(e2);
        let nb = nb / nb.dot(e0);

        self.plane.push(n.extend(-n.dot(v0)));
        self.alpha.push(na.extend(-na.dot(v1)));
        self.beta.push(nb.extend(-nb.dot(v2)));
    }

    /// Add many triangles at once.
    pub fn extend_triangles<I>(&mut self, triangles: I)
    where
        I: IntoIterator<Item = [Vec3; 3]>,
    {
        let triangles = triangles.into_iter();
        let (lower, _) = triangles.size_hint();
        self.plane.reserve(lower);
        self.alpha.reserve(lower);
        self.beta.reserve(lower);

        for [v0, v1, v2] in triangles {
            self.add_triangle(v0, v1, v2);
        }
    }

    /// Number of triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.plane.len()
    }

    /// Check if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.plane.is_empty()
    }

    /// Number of zero-area triangles added so far.
    pub fn degenerate_count(&self) -> usize {
        self.degenerate
    }

    /// Remove all triangles.
    pub fn clear(&mut self) {
        self.plane.clear();
        self.alpha.clear();
        self.beta.clear();
        self.degenerate = 0;
    }

    /// Distance to the closest triangle along a normalized direction.
    ///
    /// Only hits with `near <= t <= far` count. Returns `far` unchanged when
    /// nothing is hit. Each accepted hit shrinks `far`, so a single pass
    /// leaves the minimum.
    pub fn trace(&self, start: Vec3, direction: Vec3, near: f32, mut far: f32) -> f32 {
        let s = start.extend(1.0);
        let d = direction.extend(0.0);

        for i in 0..self.len() {
            if let Some(t) = self.hit_distance(i, s, d, near, far) {
                far = t;
            }
        }

        far
    }

    /// Check for any hit between `near` and `far` along a normalized direction.
    ///
    /// Stops at the first qualifying triangle in insertion order.
    pub fn anyhit(&self, start: Vec3, direction: Vec3, near: f32, far: f32) -> bool {
        let s = start.extend(1.0);
        let d = direction.extend(0.0);

        (0..self.len()).any(|i| self.hit_distance(i, s, d, near, far).is_some())
    }

    /// Closest hit distance, or `None` if nothing lies in `[near, far]`.
    pub fn first_hit(&self, start: Vec3, direction: Vec3, near: f32, far: f32) -> Option<f32> {
        let t = self.trace(start, direction, near, far);
        (t < far).then_some(t)
    }

    /// Ray-triangle test for record `i`.
    ///
    /// The comparisons are negated so NaN (ray lying in the plane, or a
    /// degenerate triangle) is rejected along with out-of-range values.
    #[inline]
    fn hit_distance(&self, i: usize, s: Vec4, d: Vec4, near: f32, far: f32) -> Option<f32> {
        let plane = self.plane[i];
        let t = -plane.dot(s) / plane.dot(d);
        if !(t >= near && t <= far) {
            return None;
        }

        let p = (s + t * d).truncate().extend(1.0);
        let a = self.alpha[i].dot(p);
        if !(0.0..=1.0).contains(&a) {
            return None;
        }

        let b = self.beta[i].dot(p);
        if !(b >= 0.0 && a + b <= 1.0) {
            return None;
        }

        Some(t)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parry3d::math::{Isometry, Point, Vector};
    use parry3d::query::{Ray, RayCast};
    use parry3d::shape::Triangle;

    /// Floor quad at z=0 spanning [-size, size] in x and y.
    fn floor(size: f32) -> [[Vec3; 3]; 2] {
        let a = Vec3::new(-size, -size, 0.0);
        let b = Vec3::new(size, -size, 0.0);
        let c = Vec3::new(size, size, 0.0);
        let d = Vec3::new(-size, size, 0.0);
        [[a, b, c], [a, c, d]]
    }

    /// Wall facing -x at the given x, spanning y and z in [-size, size].
    fn wall(x: f32, size: f32) -> [[Vec3; 3]; 2] {
        let a = Vec3::new(x, -size, -size);
        let b = Vec3::new(x, size, -size);
        let c = Vec3::new(x, size, size);
        let d = Vec3::new(x, -size, size);
        [[a, b, c], [a, c, d]]
    }

    fn mesh_from(triangles: &[[Vec3; 3]]) -> NavMesh {
        let mut mesh = NavMesh::new();
        mesh.extend_triangles(triangles.iter().copied());
        mesh
    }

    fn parry_toi(tri: [Vec3; 3], start: Vec3, dir: Vec3, max: f32) -> Option<f32> {
        let p = |v: Vec3| Point::new(v.x, v.y, v.z);
        let triangle = Triangle::new(p(tri[0]), p(tri[1]), p(tri[2]));
        let ray = Ray::new(p(start), Vector::new(dir.x, dir.y, dir.z));
        triangle.cast_ray(&Isometry::identity(), &ray, max, true)
    }

    #[test]
    fn test_columns_stay_in_lockstep() {
        let mut mesh = NavMesh::new();
        assert!(mesh.is_empty());

        mesh.extend_triangles(floor(10.0));
        mesh.add_triangle(Vec3::ZERO, Vec3::X, Vec3::Y);

        assert_eq!(mesh.len(), 3);
        assert_eq!(mesh.plane.len(), mesh.alpha.len());
        assert_eq!(mesh.alpha.len(), mesh.beta.len());

        mesh.clear();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_barycentric_vectors_at_corners() {
        let mut mesh = NavMesh::new();
        let (v0, v1, v2) = (
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
        );
        mesh.add_triangle(v0, v1, v2);

        // alpha is 1 at v0 and 0 on the opposite edge; beta is 1 at v1
        let a = |v: Vec3| mesh.alpha[0].dot(v.extend(1.0));
        let b = |v: Vec3| mesh.beta[0].dot(v.extend(1.0));
        assert!((a(v0) - 1.0).abs() < 1e-5);
        assert!(a(v1).abs() < 1e-5);
        assert!(a(v2).abs() < 1e-5);
        assert!((b(v1) - 1.0).abs() < 1e-5);
        assert!(b(v0).abs() < 1e-5);
        assert!(b(v2).abs() < 1e-5);

        // Plane passes through all corners
        for v in [v0, v1, v2] {
            assert!(mesh.plane[0].dot(v.extend(1.0)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_trace_hits_floor() {
        let mesh = mesh_from(&floor(1000.0));

        let hit = mesh.trace(Vec3::new(10.0, 20.0, 600.0), Vec3::NEG_Z, 0.0, 750.0);
        assert!((hit - 600.0).abs() < 1e-3);
    }

    #[test]
    fn test_trace_miss_returns_far() {
        let mesh = mesh_from(&floor(10.0));

        // Outside the triangle bounds
        let miss = mesh.trace(Vec3::new(50.0, 0.0, 5.0), Vec3::NEG_Z, 0.0, 100.0);
        assert_eq!(miss, 100.0);

        // Pointing away from the plane
        let away = mesh.trace(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, 0.0, 100.0);
        assert_eq!(away, 100.0);

        // Beyond far
        let short = mesh.trace(Vec3::new(0.0, 0.0, 50.0), Vec3::NEG_Z, 0.0, 20.0);
        assert_eq!(short, 20.0);

        // Before near
        let early = mesh.trace(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, 10.0, 100.0);
        assert_eq!(early, 100.0);
    }

    #[test]
    fn test_trace_finds_closest_of_stacked_planes() {
        let mut triangles = Vec::new();
        for x in [30.0, 10.0, 20.0] {
            triangles.extend(wall(x, 50.0));
        }
        let mesh = mesh_from(&triangles);

        let hit = mesh.trace(Vec3::ZERO, Vec3::X, 0.0, 100.0);
        assert!((hit - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_trace_is_idempotent_when_narrowed() {
        let mut triangles = Vec::new();
        triangles.extend(wall(12.5, 50.0));
        triangles.extend(wall(40.0, 50.0));
        let mesh = mesh_from(&triangles);

        let start = Vec3::new(0.0, 3.0, -2.0);
        let first = mesh.trace(start, Vec3::X, 0.0, 100.0);
        assert!(first >= 0.0 && first <= 100.0);

        let again = mesh.trace(start, Vec3::X, 0.0, first);
        assert_eq!(again, first);
    }

    #[test]
    fn test_anyhit_matches_trace() {
        let mut triangles = Vec::new();
        triangles.extend(floor(100.0));
        triangles.extend(wall(25.0, 10.0));
        let mesh = mesh_from(&triangles);

        let rays = [
            (Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, 0.0, 10.0),
            (Vec3::new(0.0, 0.0, 5.0), Vec3::X, 0.0, 10.0),
            (Vec3::new(0.0, 0.0, 5.0), Vec3::X, 0.0, 30.0),
            (Vec3::new(0.0, 0.0, 5.0), Vec3::Z, 0.0, 1000.0),
            (Vec3::new(0.0, 50.0, 5.0), Vec3::X, 0.0, 1000.0),
            (Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, 6.0, 10.0),
        ];

        for (start, dir, near, far) in rays {
            let traced = mesh.trace(start, dir, near, far);
            assert_eq!(
                mesh.anyhit(start, dir, near, far),
                traced < far,
                "start={start:?} dir={dir:?} near={near} far={far}"
            );
            assert_eq!(mesh.first_hit(start, dir, near, far).is_some(), traced < far);
        }
    }

    #[test]
    fn test_insertion_order_does_not_change_closest_hit() {
        let mut triangles = Vec::new();
        for x in [7.0, 3.0, 11.0, 5.0] {
            triangles.extend(wall(x, 20.0));
        }
        let forward = mesh_from(&triangles);
        triangles.reverse();
        let backward = mesh_from(&triangles);

        let start = Vec3::new(0.0, 1.0, 1.0);
        assert_eq!(
            forward.trace(start, Vec3::X, 0.0, 50.0),
            backward.trace(start, Vec3::X, 0.0, 50.0)
        );
    }

    #[test]
    fn test_parallel_ray_never_hits() {
        let mesh = mesh_from(&floor(10.0));

        // Parallel above the plane: t is infinite
        assert!(!mesh.anyhit(Vec3::new(0.0, 0.0, 1.0), Vec3::X, 0.0, 100.0));

        // Parallel inside the plane: t is 0/0
        assert!(!mesh.anyhit(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 0.0, 100.0));
        assert_eq!(mesh.trace(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 0.0, 100.0), 100.0);
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let mut mesh = NavMesh::new();
        mesh.add_triangle(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);

        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.degenerate_count(), 1);
        assert!(!mesh.anyhit(Vec3::new(0.5, 0.0, 1.0), Vec3::NEG_Z, 0.0, 10.0));
        assert_eq!(mesh.trace(Vec3::new(0.5, 0.0, 1.0), Vec3::NEG_Z, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_degenerate_counted_with_shared_corners() {
        let mut mesh = NavMesh::new();
        mesh.add_triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
        // Collapsed onto an edge of the first triangle
        mesh.add_triangle(Vec3::ZERO, Vec3::X, Vec3::X);

        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.degenerate_count(), 1);
        assert_eq!(mesh.trace(Vec3::new(0.2, 0.2, 1.0), Vec3::NEG_Z, 0.0, 10.0), 1.0);

        mesh.clear();
        assert_eq!(mesh.degenerate_count(), 0);
    }

    #[test]
    fn test_hits_from_both_sides() {
        let mesh = mesh_from(&floor(10.0));

        let from_below = mesh.trace(Vec3::new(1.0, 1.0, -4.0), Vec3::Z, 0.0, 10.0);
        assert!((from_below - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_matches_parry_ray_cast() {
        let tri = [
            Vec3::new(-3.0, -2.0, 1.0),
            Vec3::new(4.0, -1.0, 2.0),
            Vec3::new(0.5, 5.0, 0.5),
        ];
        let mut mesh = NavMesh::new();
        mesh.add_triangle(tri[0], tri[1], tri[2]);

        let starts = [
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(1.0, 1.0, 8.0),
            Vec3::new(-1.0, 0.5, 12.0),
            Vec3::new(6.0, 6.0, 9.0),
        ];

        for start in starts {
            let dir = Vec3::NEG_Z;
            let ours = mesh.first_hit(start, dir, 0.0, 100.0);
            let reference = parry_toi(tri, start, dir, 100.0);

            match (ours, reference) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-3, "{a} vs {b}"),
                (None, None) => {}
                other => panic!("mismatch at {start:?}: {other:?}"),
            }
        }
    }
}
