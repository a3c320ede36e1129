//! Wavefront OBJ loading.
//!
//! Recognized directives:
//!
//! | Directive | Meaning |
//! |---|---|
//! | `mtllib file` | load a material library (path relative to the OBJ) |
//! | `usemtl name` | close the current group and switch material |
//! | `v x y z` | position (also grows the bounding box) |
//! | `vt u v` | texture coordinate |
//! | `vn x y z` | normal |
//! | `f a b c ...` | polygon, fanned into triangles around its first vertex |
//!
//! Other directives (`o`, `g`, `s`, ...) are ignored. Each `usemtl` starts a
//! fresh group with its own vertex table; face tokens are deduplicated by
//! their exact text within a group.
//!
//! A load is staged: nothing outside the returned [`MeshLoad`] is touched, so
//! a failure part way through leaves the caller's scene as it was.

use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::assets::{read_text, AssetSource};
use crate::error::{LoadError, ParseError, ParseErrorKind};

use super::mtl::{parse_floats, parse_mtl, MaterialLibrary};
use super::surface::{SurfaceBuilder, SurfaceGroup, VertexPool};
use super::{Bounds, LoadOptions, MeshLoad, ParseMode};

/// Loads OBJ files from an [`AssetSource`].
pub struct ObjLoader<'a, A: AssetSource + ?Sized> {
    assets: &'a A,
    options: LoadOptions,
}

impl<'a, A: AssetSource + ?Sized> ObjLoader<'a, A> {
    pub fn new(assets: &'a A, options: LoadOptions) -> Self {
        Self { assets, options }
    }

    /// Load the OBJ at `path` and everything it references.
    pub fn load(&self, path: &Path) -> Result<MeshLoad, LoadError> {
        let text = read_text(self.assets, path).map_err(|e| LoadError::file_not_found(path, e))?;

        let mut parser = ObjParser {
            assets: self.assets,
            mode: self.options.mode,
            file: path.to_path_buf(),
            base_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            line: 0,
            skipped: 0,
            materials: MaterialLibrary::new(),
            material_name: String::new(),
            pool: VertexPool::default(),
            bounds: Bounds::EMPTY,
            current: None,
            surfaces: Vec::new(),
            nav_triangles: Vec::new(),
        };

        for (index, line) in text.lines().enumerate() {
            parser.line = index + 1;
            parser.parse_line(line)?;
        }

        let load = parser.finish();
        log::debug!(
            "loaded {}: {} surfaces, {} triangles, extent {:?}",
            path.display(),
            load.surfaces.len(),
            load.nav_triangles.len(),
            load.bounds.extent()
        );
        Ok(load)
    }
}

/// Parse state for one OBJ file.
struct ObjParser<'a, A: AssetSource + ?Sized> {
    assets: &'a A,
    mode: ParseMode,
    file: PathBuf,
    base_dir: PathBuf,
    /// Current 1-based line.
    line: usize,
    skipped: usize,

    materials: MaterialLibrary,
    /// Material applied to the next group.
    material_name: String,

    pool: VertexPool,
    bounds: Bounds,

    // ========================================================================
    // Output
    // ========================================================================
    current: Option<SurfaceBuilder>,
    surfaces: Vec<SurfaceGroup>,
    nav_triangles: Vec<[Vec3; 3]>,
}

impl<A: AssetSource + ?Sized> ObjParser<'_, A> {
    fn parse_line(&mut self, line: &str) -> Result<(), LoadError> {
        let mut tokens = line.split_whitespace();
        let Some(directive) = tokens.next() else {
            return Ok(());
        };
        if directive.starts_with('#') {
            return Ok(());
        }
        let args: Vec<&str> = tokens.collect();

        let result = match directive {
            "mtllib" => return self.load_material_library(&args),
            "usemtl" => self.use_material(&args),
            "v" => self.parse_position(&args),
            "vt" => self.parse_texcoord(&args),
            "vn" => self.parse_normal(&args),
            "f" => self.parse_face(&args),
            _ => Ok(()),
        };

        match result {
            Ok(()) => Ok(()),
            Err(kind) if self.mode == ParseMode::Lenient && kind.is_skippable() => {
                log::debug!("{}:{}: skipping line: {}", self.file.display(), self.line, kind);
                self.skipped += 1;
                Ok(())
            }
            Err(kind) => Err(ParseError::new(&self.file, self.line, kind).into()),
        }
    }

    fn malformed(directive: &str, args: &[&str]) -> ParseErrorKind {
        ParseErrorKind::MalformedDirective {
            directive: directive.to_string(),
            line: args.join(" "),
        }
    }

    fn load_material_library(&mut self, args: &[&str]) -> Result<(), LoadError> {
        let Some(name) = args.first() else {
            let kind = Self::malformed("mtllib", args);
            if self.mode == ParseMode::Lenient {
                log::debug!("{}:{}: skipping line: {}", self.file.display(), self.line, kind);
                self.skipped += 1;
                return Ok(());
            }
            return Err(ParseError::new(&self.file, self.line, kind).into());
        };

        let path = self.base_dir.join(name);
        let text =
            read_text(self.assets, &path).map_err(|e| LoadError::file_not_found(&path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let defined = parse_mtl(&text, &path, &base_dir, self.mode, &mut self.materials)?;

        log::debug!("{}: {} materials", path.display(), defined);
        Ok(())
    }

    fn use_material(&mut self, args: &[&str]) -> Result<(), ParseErrorKind> {
        let name = args.first().ok_or_else(|| Self::malformed("usemtl", args))?;

        if !self.materials.contains(name) {
            if self.mode == ParseMode::Strict {
                return Err(ParseErrorKind::UnknownMaterial {
                    name: name.to_string(),
                });
            }
            log::warn!(
                "{}:{}: unknown material `{}`, using defaults",
                self.file.display(),
                self.line,
                name
            );
            self.materials.entry(name);
        }

        self.close_group();
        self.material_name = name.to_string();
        Ok(())
    }

    fn parse_position(&mut self, args: &[&str]) -> Result<(), ParseErrorKind> {
        let position = Vec3::from_array(parse_floats(args).ok_or_else(|| Self::malformed("v", args))?);
        self.pool.positions.push(position);
        self.bounds.include(position);
        Ok(())
    }

    fn parse_texcoord(&mut self, args: &[&str]) -> Result<(), ParseErrorKind> {
        let [u, v] = parse_floats(args).ok_or_else(|| Self::malformed("vt", args))?;
        self.pool.texcoords.push(glam::Vec2::new(u, v));
        Ok(())
    }

    fn parse_normal(&mut self, args: &[&str]) -> Result<(), ParseErrorKind> {
        let normal = Vec3::from_array(parse_floats(args).ok_or_else(|| Self::malformed("vn", args))?);
        self.pool.normals.push(normal);
        Ok(())
    }

    /// Fan `f v0 v1 v2 v3 ...` into `(v0, v1, v2)`, `(v0, v2, v3)`, ...
    fn parse_face(&mut self, args: &[&str]) -> Result<(), ParseErrorKind> {
        if args.len() < 3 && self.mode == ParseMode::Strict {
            return Err(ParseErrorKind::TooFewFaceVertices { count: args.len() });
        }

        let material_name = &self.material_name;
        let materials = &self.materials;
        let builder = self.current.get_or_insert_with(|| {
            let material = materials.get(material_name).cloned().unwrap_or_default();
            SurfaceBuilder::new(material_name.clone(), material)
        });

        let mut anchor = 0;
        let mut previous = 0;
        for (i, token) in args.iter().enumerate() {
            let slot = builder.vertex(token, &self.pool)?;
            match i {
                0 => anchor = slot,
                1 => {}
                _ => self.nav_triangles.push(builder.push_triangle([anchor, previous, slot])),
            }
            previous = slot;
        }

        if args.len() < 3 {
            return Err(ParseErrorKind::TooFewFaceVertices { count: args.len() });
        }
        Ok(())
    }

    fn close_group(&mut self) {
        if let Some(builder) = self.current.take() {
            if builder.triangle_count() == 0 {
                log::debug!(
                    "{}: dropping group `{}` with no triangles",
                    self.file.display(),
                    self.material_name
                );
                return;
            }
            self.surfaces.push(builder.finish());
        }
    }

    fn finish(mut self) -> MeshLoad {
        self.close_group();
        if self.skipped > 0 {
            log::warn!("{}: skipped {} malformed lines", self.file.display(), self.skipped);
        }

        MeshLoad {
            source: self.file,
            surfaces: self.surfaces,
            nav_triangles: self.nav_triangles,
            bounds: self.bounds,
            materials: self.materials,
        }
    }
}
