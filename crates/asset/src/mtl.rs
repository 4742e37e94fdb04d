//! MTL material parser with name-keyed fallbacks.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::{
    error::{AssetError, AssetResult},
    texture::{TextureHandle, resolve_texture_path},
};

/// Material family derived once from the material name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialCategory {
    Asphalt,
    Decals,
    Ground,
    Foliage,
    Bodywork,
    Tire,
    Brake,
    Chain,
    Metal,
    Lamp,
    #[default]
    Generic,
}

impl MaterialCategory {
    /// Exact names win over substrings. Metal-like parts win over tires, tires over lamps.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Asphalt" => return Self::Asphalt,
            "Decals" => return Self::Decals,
            "Ground" => return Self::Ground,
            "Leafs_Mat" => return Self::Foliage,
            "Front_End" => return Self::Bodywork,
            _ => {}
        }
        const BY_SUBSTRING: [(&str, MaterialCategory); 5] = [
            ("Metal", MaterialCategory::Metal),
            ("Brake", MaterialCategory::Brake),
            ("Chain", MaterialCategory::Chain),
            ("Tire", MaterialCategory::Tire),
            ("Light", MaterialCategory::Lamp),
        ];
        BY_SUBSTRING
            .iter()
            .find(|(needle, _)| name.contains(needle))
            .map(|&(_, category)| category)
            .unwrap_or(Self::Generic)
    }

    /// Diffuse colour used when an MTL record has no explicit `Kd`.
    pub fn default_diffuse(self) -> Option<[f32; 3]> {
        match self {
            Self::Asphalt => Some([0.3, 0.3, 0.3]),
            Self::Decals => Some([1.0, 1.0, 1.0]),
            Self::Bodywork => Some([0.1, 0.3, 0.8]),
            Self::Metal | Self::Brake | Self::Chain => Some([0.7, 0.7, 0.7]),
            Self::Tire => Some([0.1, 0.1, 0.1]),
            Self::Ground => Some([0.4, 0.3, 0.2]),
            Self::Lamp => Some([0.9, 0.9, 0.8]),
            Self::Foliage | Self::Generic => None,
        }
    }

    /// RGBA colour of the 1x1 texture bound to untextured parts.
    pub fn swatch_rgba(self) -> [u8; 4] {
        match self {
            Self::Asphalt => [60, 60, 60, 255],
            Self::Ground => [120, 80, 40, 255],
            Self::Decals => [255, 255, 255, 255],
            Self::Foliage => [50, 120, 30, 255],
            Self::Metal => [180, 180, 180, 255],
            Self::Bodywork => [30, 80, 200, 255],
            Self::Tire => [30, 30, 30, 255],
            Self::Brake => [100, 100, 120, 255],
            Self::Chain => [120, 120, 100, 255],
            Self::Lamp | Self::Generic => [160, 160, 160, 255],
        }
    }

    #[inline]
    pub fn is_decal(self) -> bool {
        self == Self::Decals
    }
}

/// Built-in materials selected by the scene file's material tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialPreset {
    Matte,
    Shiny,
    Standard,
}

impl MaterialPreset {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "MATTE" => Self::Matte,
            "SHINY" => Self::Shiny,
            _ => Self::Standard,
        }
    }
}

/// Phong material record.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub category: MaterialCategory,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    /// `map_Kd` value as written in the MTL file.
    pub diffuse_map: Option<String>,
    /// `diffuse_map` resolved to an existing file.
    pub texture_path: Option<PathBuf>,
    /// Bound by the renderer after upload.
    pub texture: Option<TextureHandle>,
}

impl Default for Material {
    fn default() -> Self {
        Self::named("default")
    }
}

impl Material {
    /// Default coefficients (ka 0.2, kd 0.8, ks 0.5, Ns 32) under the given name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            category: MaterialCategory::from_name(&name),
            name,
            ambient: [0.2; 3],
            diffuse: [0.8; 3],
            specular: [0.5; 3],
            shininess: 32.0,
            diffuse_map: None,
            texture_path: None,
            texture: None,
        }
    }

    /// Material for objects loaded without an MTL file.
    pub fn preset(tag: &str) -> Self {
        let mut m = Self::named(tag);
        match MaterialPreset::from_tag(tag) {
            MaterialPreset::Matte => {
                m.ambient = [0.3, 0.1, 0.1];
                m.diffuse = [0.9, 0.4, 0.3];
                m.specular = [0.1; 3];
                m.shininess = 2.0;
            }
            MaterialPreset::Shiny => {
                m.ambient = [0.1, 0.2, 0.3];
                m.diffuse = [0.3, 0.5, 0.7];
                m.specular = [0.9; 3];
                m.shininess = 128.0;
            }
            MaterialPreset::Standard => {}
        }
        m
    }

    /// Stand-in for a name the library does not define.
    pub fn synthesize(name: &str) -> Self {
        let mut m = Self::named(name);
        match m.category {
            MaterialCategory::Bodywork => {
                m.diffuse = [0.1, 0.3, 0.8];
                m.specular = [0.8; 3];
                m.shininess = 64.0;
            }
            MaterialCategory::Asphalt => {
                m.diffuse = [0.3; 3];
                m.specular = [0.2; 3];
                m.shininess = 8.0;
            }
            _ => {
                m.diffuse = [0.7; 3];
                m.specular = [0.5; 3];
                m.shininess = 32.0;
            }
        }
        m
    }

    /// Close an MTL record: heuristic diffuse when `Kd` was absent, then decal overrides.
    fn finalize(&mut self, has_diffuse: bool) {
        if !has_diffuse {
            if let Some(kd) = self.category.default_diffuse() {
                self.diffuse = kd;
            }
        }
        if self.category.is_decal() {
            self.ambient = [0.6; 3];
            self.specular = [0.1; 3];
            self.shininess = 1.0;
        }
    }

    /// Adjustments applied when the material is attached to geometry.
    /// Signage stays readable under any lighting; asphalt stays dull.
    pub fn adjust_for_part(&mut self) {
        match self.category {
            MaterialCategory::Decals => {
                self.ambient = [0.8; 3];
                self.diffuse = [1.0; 3];
                self.specular = [0.1; 3];
                self.shininess = 1.0;
            }
            MaterialCategory::Asphalt => {
                self.ambient = [0.1; 3];
                self.specular = [0.2; 3];
                self.shininess = 4.0;
            }
            _ => {}
        }
    }
}

/// Materials parsed from one MTL file, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    pub materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new(materials: Vec<Material>) -> Self {
        Self { materials }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Never fails: unknown names get a synthesized material.
    pub fn find_by_name(&self, name: &str) -> Material {
        match self.get(name) {
            Some(m) => m.clone(),
            None => {
                log::debug!("Material '{}' not in library, synthesizing", name);
                Material::synthesize(name)
            }
        }
    }

    /// Resolve every `map_Kd` against the texture search directories around `mtl_dir`.
    pub fn resolve_textures(&mut self, mtl_dir: &Path) {
        for material in &mut self.materials {
            let Some(map) = material.diffuse_map.as_deref() else {
                continue;
            };
            material.texture_path = resolve_texture_path(mtl_dir, map);
            match &material.texture_path {
                Some(path) => log::info!("Material '{}' texture: {}", material.name, path.display()),
                None => log::warn!(
                    "Texture '{}' for material '{}' not found near {}",
                    map,
                    material.name,
                    mtl_dir.display()
                ),
            }
        }
    }
}

/// Path of the MTL file that accompanies an OBJ file.
pub fn mtl_path_for(obj_path: impl AsRef<Path>) -> PathBuf {
    obj_path.as_ref().with_extension("mtl")
}

/// Load an MTL file and resolve its texture paths.
pub fn load_mtl_from_path(path: impl AsRef<Path>) -> AssetResult<MaterialLibrary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AssetError::from_open(path, e))?;
    let mut library = parse_mtl(BufReader::new(file)).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loaded {} materials from {}", library.len(), path.display());

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    library.resolve_textures(dir);
    Ok(library)
}

/// Parse MTL text without touching the filesystem (textures stay unresolved).
pub fn load_mtl_from_str(contents: &str) -> MaterialLibrary {
    // Reading from memory cannot fail.
    parse_mtl(io::Cursor::new(contents)).unwrap_or_default()
}

fn parse_mtl<R: BufRead>(reader: R) -> io::Result<MaterialLibrary> {
    let mut materials = Vec::new();
    let mut current: Option<(Material, bool)> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (tag, rest) = trimmed
            .split_once(char::is_whitespace)
            .map(|(t, r)| (t, r.trim()))
            .unwrap_or((trimmed, ""));

        if tag == "newmtl" {
            if let Some((mut done, has_kd)) = current.take() {
                done.finalize(has_kd);
                materials.push(done);
            }
            let name = rest.split_whitespace().next().unwrap_or("default");
            log::debug!("Material found: {}", name);
            current = Some((Material::named(name), false));
            continue;
        }

        let Some((material, has_kd)) = current.as_mut() else {
            continue;
        };

        match tag {
            "Ka" => {
                read_color(rest, line_no, &mut material.ambient);
            }
            "Kd" => {
                if read_color(rest, line_no, &mut material.diffuse) {
                    *has_kd = true;
                }
            }
            "Ks" => {
                read_color(rest, line_no, &mut material.specular);
            }
            "Ns" => match rest.split_whitespace().next().map(str::parse::<f32>) {
                Some(Ok(ns)) => material.shininess = ns,
                _ => log::warn!("MTL line {}: bad Ns value '{}'", line_no + 1, rest),
            },
            "map_Kd" if !rest.is_empty() => material.diffuse_map = Some(rest.to_string()),
            _ => {}
        }
    }

    if let Some((mut done, has_kd)) = current.take() {
        done.finalize(has_kd);
        materials.push(done);
    }

    Ok(MaterialLibrary::new(materials))
}

/// Returns `true` when three floats were read into `out`.
fn read_color(rest: &str, line_no: usize, out: &mut [f32; 3]) -> bool {
    let values: Vec<f32> = rest
        .split_whitespace()
        .take(3)
        .map_while(|t| t.parse().ok())
        .collect();
    match values.as_slice() {
        &[r, g, b] => {
            *out = [r, g, b];
            true
        }
        _ => {
            log::warn!("MTL line {}: expected 3 colour values, got '{}'", line_no + 1, rest);
            false
        }
    }
}
