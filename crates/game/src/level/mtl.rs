//! Materials and the MTL material-library format.
//!
//! Recognized directives:
//!
//! | Directive | Meaning |
//! |---|---|
//! | `newmtl name` | start a material (later properties apply to it) |
//! | `Ka r g b` / `Kd r g b` / `Ks r g b` | ambient / diffuse / specular colour |
//! | `Ns s` | specular exponent |
//! | `map_Kd` / `map_Ka` / `map_Ks` / `map_Ns` `[-imfchan r\|g\|b] file` | texture maps |
//!
//! Everything else (`illum`, `d`, `Ni`, `map_Bump`, ...) is ignored. Texture
//! paths are taken relative to the directory of the MTL file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseErrorKind};

use super::ParseMode;

/// Texture channel selected with `-imfchan`.
///
/// A single-channel map replicates that channel into all three colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Parse an `-imfchan` flag value.
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "r" => Some(Self::Red),
            "g" => Some(Self::Green),
            "b" => Some(Self::Blue),
            _ => None,
        }
    }

    /// Byte offset within an RGB pixel.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// The four texture slots a material can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureSlot {
    /// `map_Kd`
    Color,
    /// `map_Ka`
    Ambient,
    /// `map_Ks`
    Specular,
    /// `map_Ns`
    Gloss,
}

impl TextureSlot {
    /// All slots, in binding order.
    pub const ALL: [Self; 4] = [Self::Color, Self::Ambient, Self::Specular, Self::Gloss];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    fn from_directive(directive: &str) -> Option<Self> {
        match directive {
            "map_Kd" => Some(Self::Color),
            "map_Ka" => Some(Self::Ambient),
            "map_Ks" => Some(Self::Specular),
            "map_Ns" => Some(Self::Gloss),
            _ => None,
        }
    }
}

/// A texture map reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureMap {
    /// Path to the image, already joined with the MTL directory.
    pub path: PathBuf,
    /// Channel to replicate, or `None` for full RGB.
    pub channel: Option<Channel>,
}

/// Surface material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Specular exponent.
    pub shininess: f32,
    /// Texture maps indexed by [`TextureSlot::index`].
    pub maps: [Option<TextureMap>; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::splat(0.5),
            specular: Vec3::ZERO,
            shininess: 0.0,
            maps: Default::default(),
        }
    }
}

impl Material {
    /// Untextured white material, lit fully by both ambient and diffuse.
    pub fn white() -> Self {
        Self {
            ambient: Vec3::ONE,
            diffuse: Vec3::ONE,
            ..Default::default()
        }
    }

    /// Texture in `slot`, if any.
    #[inline]
    pub fn map(&self, slot: TextureSlot) -> Option<&TextureMap> {
        self.maps[slot.index()].as_ref()
    }

    /// Set or clear the texture in `slot`.
    pub fn set_map(&mut self, slot: TextureSlot, map: Option<TextureMap>) {
        self.maps[slot.index()] = map;
    }
}

/// Named materials available to `usemtl`.
///
/// Always contains the unnamed default material (`""`), which is what faces
/// use before the first `usemtl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLibrary {
    materials: BTreeMap<String, Material>,
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialLibrary {
    pub fn new() -> Self {
        let mut materials = BTreeMap::new();
        materials.insert(String::new(), Material::default());
        Self { materials }
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    /// Material `name`, created with defaults if missing.
    pub fn entry(&mut self, name: &str) -> &mut Material {
        self.materials.entry(name.to_string()).or_default()
    }

    /// Number of materials, including the unnamed default.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Parse MTL text into `library`.
///
/// `file` is used for error locations; map paths are joined to `base_dir`.
/// Returns the number of `newmtl` entries read.
pub(crate) fn parse_mtl(
    text: &str,
    file: &Path,
    base_dir: &Path,
    mode: ParseMode,
    library: &mut MaterialLibrary,
) -> Result<usize, ParseError> {
    let mut current: Option<String> = None;
    let mut defined = 0;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let mut tokens = line.split_whitespace();
        let Some(directive) = tokens.next() else {
            continue;
        };
        if directive.starts_with('#') {
            continue;
        }
        let args: Vec<&str> = tokens.collect();

        let result = parse_mtl_directive(directive, &args, base_dir, mode, &mut current, library);
        match result {
            Ok(true) => defined += 1,
            Ok(false) => {}
            Err(kind) if mode == ParseMode::Lenient && kind.is_skippable() => {
                log::debug!("{}:{}: skipping line: {}", file.display(), index + 1, kind);
            }
            Err(kind) => return Err(ParseError::new(file, index + 1, kind)),
        }
    }

    Ok(defined)
}

/// Returns `Ok(true)` when the line started a new material.
fn parse_mtl_directive(
    directive: &str,
    args: &[&str],
    base_dir: &Path,
    mode: ParseMode,
    current: &mut Option<String>,
    library: &mut MaterialLibrary,
) -> Result<bool, ParseErrorKind> {
    let malformed = || ParseErrorKind::MalformedDirective {
        directive: directive.to_string(),
        line: args.join(" "),
    };

    if directive == "newmtl" {
        let name = args.first().ok_or_else(malformed)?;
        library.entry(name);
        *current = Some(name.to_string());
        return Ok(true);
    }

    let slot = TextureSlot::from_directive(directive);
    if slot.is_none() && !matches!(directive, "Ka" | "Kd" | "Ks" | "Ns") {
        return Ok(false);
    }

    let Some(name) = current.as_deref() else {
        return Err(ParseErrorKind::MalformedHeader {
            directive: directive.to_string(),
        });
    };
    let material = library.entry(name);

    match (directive, slot) {
        (_, Some(slot)) => {
            let map = parse_texture_map(args, base_dir, mode).ok_or_else(malformed)?;
            material.set_map(slot, Some(map));
        }
        ("Ns", None) => {
            let [shininess] = parse_floats(args).ok_or_else(malformed)?;
            material.shininess = shininess;
        }
        _ => {
            let color = Vec3::from_array(parse_floats(args).ok_or_else(malformed)?);
            match directive {
                "Ka" => material.ambient = color,
                "Kd" => material.diffuse = color,
                _ => material.specular = color,
            }
        }
    }

    Ok(false)
}

/// `[-imfchan r|g|b] file`
fn parse_texture_map(args: &[&str], base_dir: &Path, mode: ParseMode) -> Option<TextureMap> {
    let mut args = args.iter();
    let mut channel = None;

    let mut file = *args.next()?;
    if file == "-imfchan" {
        let flag = args.next()?;
        channel = Channel::from_flag(flag);
        if channel.is_none() {
            if mode == ParseMode::Strict {
                return None;
            }
            log::debug!("ignoring unsupported -imfchan value `{}`", flag);
        }
        file = *args.next()?;
    }

    if args.next().is_some() && mode == ParseMode::Strict {
        return None;
    }

    Some(TextureMap {
        path: base_dir.join(file),
        channel,
    })
}

/// Parse the first `N` arguments as floats. Extra arguments are ignored.
pub(crate) fn parse_floats<const N: usize>(args: &[&str]) -> Option<[f32; N]> {
    if args.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (value, arg) in out.iter_mut().zip(args) {
        *value = arg.parse().ok()?;
    }
    Some(out)
}
