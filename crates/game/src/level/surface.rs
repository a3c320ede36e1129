//! Indexed triangle groups, one per material run.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::error::{ParseErrorKind, PoolKind};

use super::mtl::Material;

/// A renderable group of triangles sharing one material.
///
/// Every vertex array has the same length; `indices` holds three entries per
/// triangle, each less than that length.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGroup {
    /// Name given to `usemtl` (empty for the default material).
    pub material_name: String,
    pub material: Material,

    pub positions: Vec<Vec3>,
    /// Unit normals, or zero where none could be derived.
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl SurfaceGroup {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Iterate over triangles as corner positions.
    pub fn triangle_positions(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.triangles().map(|[a, b, c]| {
            [
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            ]
        })
    }
}

/// Raw `v`/`vt`/`vn` lists, shared by every group of one OBJ file.
#[derive(Debug, Default)]
pub(crate) struct VertexPool {
    pub positions: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
}

/// One face vertex token: `p`, `p/t`, `p/t/n` or `p//n` (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VertexRef {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

impl VertexRef {
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.split('/');
        let position = parse_index(parts.next()?)?;
        let texcoord = match parts.next() {
            None | Some("") => None,
            Some(part) => Some(parse_index(part)?),
        };
        let normal = match parts.next() {
            None => None,
            Some(part) => Some(parse_index(part)?),
        };
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            position,
            texcoord,
            normal,
        })
    }
}

fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Look up a 1-based reference.
fn resolve<T: Copy>(
    items: &[T],
    index: usize,
    pool: PoolKind,
    token: &str,
) -> Result<T, ParseErrorKind> {
    index
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .copied()
        .ok_or_else(|| ParseErrorKind::UnresolvedVertexReference {
            token: token.to_string(),
            pool,
            index,
            len: items.len(),
        })
}

/// Accumulates one group while its material is active.
#[derive(Debug)]
pub(crate) struct SurfaceBuilder {
    material_name: String,
    material: Material,
    /// Face token text to vertex slot.
    slots: HashMap<String, u32>,
    positions: Vec<Vec3>,
    normals: Vec<Option<Vec3>>,
    texcoords: Vec<Option<Vec2>>,
    indices: Vec<u32>,
}

impl SurfaceBuilder {
    pub fn new(material_name: String, material: Material) -> Self {
        Self {
            material_name,
            material,
            slots: HashMap::new(),
            positions: Vec::new(),
            normals: Vec::new(),
            texcoords: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Slot for a face token, creating the vertex the first time it is seen.
    ///
    /// Identical token text always maps to the same slot within the group.
    pub fn vertex(&mut self, token: &str, pool: &VertexPool) -> Result<u32, ParseErrorKind> {
        if let Some(&slot) = self.slots.get(token) {
            return Ok(slot);
        }

        let vref = VertexRef::parse(token).ok_or_else(|| ParseErrorKind::MalformedFaceToken {
            token: token.to_string(),
        })?;
        let position = resolve(&pool.positions, vref.position, PoolKind::Position, token)?;
        let texcoord = vref
            .texcoord
            .map(|i| resolve(&pool.texcoords, i, PoolKind::Texcoord, token))
            .transpose()?;
        let normal = vref
            .normal
            .map(|i| resolve(&pool.normals, i, PoolKind::Normal, token))
            .transpose()?;

        let slot = self.positions.len() as u32;
        self.positions.push(position);
        self.texcoords.push(texcoord);
        self.normals.push(normal);
        self.slots.insert(token.to_string(), slot);
        Ok(slot)
    }

    /// Append a triangle and return its corner positions.
    pub fn push_triangle(&mut self, tri: [u32; 3]) -> [Vec3; 3] {
        self.indices.extend_from_slice(&tri);
        let corners = tri.map(|slot| self.positions[slot as usize]);

        let [p0, p1, p2] = corners;
        if (p1 - p0).cross(p2 - p0).length_squared() == 0.0 {
            log::debug!(
                "material `{}`: degenerate triangle {:?}",
                self.material_name,
                tri
            );
        }
        corners
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Fill in missing attributes and produce the group.
    pub fn finish(self) -> SurfaceGroup {
        let missing_texcoords = self.texcoords.iter().filter(|t| t.is_none()).count();
        if missing_texcoords > 0 {
            log::debug!(
                "material `{}`: {} vertices without texcoords, using (0, 0)",
                self.material_name,
                missing_texcoords
            );
        }
        let texcoords = self
            .texcoords
            .iter()
            .map(|t| t.unwrap_or(Vec2::ZERO))
            .collect();

        let normals = if self.normals.iter().all(Option::is_some) {
            self.normals
                .iter()
                .map(|n| n.unwrap_or(Vec3::ZERO).normalize_or_zero())
                .collect()
        } else {
            self.generated_normals()
        };

        SurfaceGroup {
            material_name: self.material_name,
            material: self.material,
            positions: self.positions,
            normals,
            texcoords,
            indices: self.indices,
        }
    }

    /// Area-independent smooth normals for vertices the file gave none.
    ///
    /// Each face adds `n / |n|^2` to its corners, so small and large faces
    /// weigh alike per unit of angle rather than by area.
    fn generated_normals(&self) -> Vec<Vec3> {
        let mut accumulated = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [p0, p1, p2] = [0, 1, 2].map(|k| self.positions[tri[k] as usize]);
            let n = (p1 - p0).cross(p2 - p0);
            let len_sq = n.length_squared();
            if len_sq == 0.0 {
                continue;
            }
            for &slot in tri {
                accumulated[slot as usize] += n / len_sq;
            }
        }

        let normals: Vec<Vec3> = self
            .normals
            .iter()
            .zip(accumulated)
            .map(|(given, sum)| given.unwrap_or(sum).normalize_or_zero())
            .collect();

        let zero = normals.iter().filter(|n| **n == Vec3::ZERO).count();
        if zero > 0 {
            log::warn!(
                "material `{}`: {} vertices only touch degenerate faces and have no normal",
                self.material_name,
                zero
            );
        }
        normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> VertexPool {
        VertexPool {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            texcoords: vec![Vec2::new(0.25, 0.75)],
            normals: vec![Vec3::new(0.0, 0.0, 2.0)],
        }
    }

    #[test]
    fn test_parse_vertex_ref() {
        let full = VertexRef::parse("3/2/1").unwrap();
        assert_eq!((full.position, full.texcoord, full.normal), (3, Some(2), Some(1)));

        let no_tex = VertexRef::parse("4//7").unwrap();
        assert_eq!((no_tex.texcoord, no_tex.normal), (None, Some(7)));

        assert_eq!(VertexRef::parse("5").unwrap().texcoord, None);
        assert_eq!(VertexRef::parse("5/6").unwrap().texcoord, Some(6));

        for bad in ["", "a", "-1", "1//", "1/2/3/4", "1/x"] {
            assert_eq!(VertexRef::parse(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn test_identical_tokens_share_slot() {
        let pool = pool();
        let mut builder = SurfaceBuilder::new(String::new(), Material::default());

        let a = builder.vertex("1/1/1", &pool).unwrap();
        let b = builder.vertex("2/1/1", &pool).unwrap();
        let again = builder.vertex("1/1/1", &pool).unwrap();
        // Same position, different text: a new slot
        let other = builder.vertex("1//1", &pool).unwrap();

        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_ne!(a, other);
        assert_eq!(builder.slots.len(), builder.positions.len());
        assert_eq!(builder.positions.len(), 3);
    }

    #[test]
    fn test_unresolved_reference() {
        let pool = pool();
        let mut builder = SurfaceBuilder::new(String::new(), Material::default());

        let err = builder.vertex("9", &pool).unwrap_err();
        assert_eq!(
            err,
            ParseErrorKind::UnresolvedVertexReference {
                token: "9".to_string(),
                pool: PoolKind::Position,
                index: 9,
                len: 4,
            }
        );

        assert!(matches!(
            builder.vertex("0", &pool),
            Err(ParseErrorKind::UnresolvedVertexReference { index: 0, .. })
        ));
        assert!(matches!(
            builder.vertex("1/2", &pool),
            Err(ParseErrorKind::UnresolvedVertexReference {
                pool: PoolKind::Texcoord,
                ..
            })
        ));
        // Failed tokens leave no vertex behind
        assert_eq!(builder.positions.len(), 0);
    }

    #[test]
    fn test_given_normals_are_normalized() {
        let pool = pool();
        let mut builder = SurfaceBuilder::new(String::new(), Material::default());
        let tri = ["1/1/1", "2/1/1", "3/1/1"].map(|t| builder.vertex(t, &pool).unwrap());
        builder.push_triangle(tri);

        let group = builder.finish();
        assert!(group.normals.iter().all(|&n| n == Vec3::Z));
        assert!(group.texcoords.iter().all(|&t| t == Vec2::new(0.25, 0.75)));
    }

    #[test]
    fn test_generated_normals() {
        let pool = pool();
        let mut builder = SurfaceBuilder::new(String::new(), Material::default());
        let quad = ["1", "2", "3", "4"].map(|t| builder.vertex(t, &pool).unwrap());
        builder.push_triangle([quad[0], quad[1], quad[2]]);
        builder.push_triangle([quad[0], quad[2], quad[3]]);

        let group = builder.finish();
        assert_eq!(group.triangle_count(), 2);
        for n in &group.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
        assert!(group.texcoords.iter().all(|&t| t == Vec2::ZERO));
    }

    #[test]
    fn test_degenerate_face_leaves_zero_normal() {
        let pool = VertexPool {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            ..Default::default()
        };
        let mut builder = SurfaceBuilder::new(String::new(), Material::default());
        let tri = ["1", "2", "3"].map(|t| builder.vertex(t, &pool).unwrap());
        builder.push_triangle(tri);

        let group = builder.finish();
        assert!(group.normals.iter().all(|&n| n == Vec3::ZERO));
        assert!(group.normals.iter().all(|n| n.is_finite()));
    }
}
