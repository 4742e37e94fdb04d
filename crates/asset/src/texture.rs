//! Texture loading and the texture file search used by MTL materials.

use std::path::{Path, PathBuf};

use crate::error::{AssetError, AssetResult};

/// Extensions tried when the file named by `map_Kd` does not exist.
pub const TEXTURE_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "tga", "bmp"];

/// Opaque id of a texture bound by the render collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

impl TextureData {
    /// Returns `None` if `data` does not match `width * height` RGBA8 pixels.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        })
    }

    /// Decode any supported image file (png, jpeg, tga, bmp) to RGBA8.
    pub fn load<P: AsRef<Path>>(path: P) -> AssetResult<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).map_err(|source| match source {
            image::ImageError::IoError(io) => AssetError::from_open(path, io),
            source => AssetError::Image {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::info!("Loaded texture {}x{} with {} bytes", width, height, data.len());

        Ok(Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        })
    }

    /// Single-pixel texture of one colour.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            data: rgba.to_vec(),
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8,
        }
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size =
            (self.width as usize) * (self.height as usize) * self.bytes_per_pixel() as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}

/// Directories searched for a material's texture, in priority order.
pub fn texture_search_dirs(mtl_dir: &Path) -> [PathBuf; 4] {
    let up = Path::new("..").join(mtl_dir);
    [
        mtl_dir.to_path_buf(),
        up.clone(),
        mtl_dir.join("textures"),
        up.join("textures"),
    ]
}

/// Find the file a `map_Kd` entry refers to. First hit wins.
pub fn resolve_texture_path(mtl_dir: &Path, map_kd: &str) -> Option<PathBuf> {
    resolve_texture_path_with(mtl_dir, map_kd, |p| p.is_file())
}

/// [`resolve_texture_path`] with an injectable existence check.
///
/// Tries the exact relative path under every search directory, then the same
/// stem with each of [`TEXTURE_EXTENSIONS`].
pub fn resolve_texture_path_with(
    mtl_dir: &Path,
    map_kd: &str,
    exists: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    let map = Path::new(map_kd.trim());
    if map.as_os_str().is_empty() {
        return None;
    }
    let dirs = texture_search_dirs(mtl_dir);

    if let Some(hit) = dirs.iter().map(|d| d.join(map)).find(|p| exists(p)) {
        return Some(hit);
    }

    let stem = map.file_stem()?;
    let parent = map.parent().filter(|p| !p.as_os_str().is_empty());
    dirs.iter()
        .flat_map(|dir| {
            let base = match parent {
                Some(parent) => dir.join(parent),
                None => dir.clone(),
            };
            TEXTURE_EXTENSIONS.iter().map(move |ext| {
                let mut name = stem.to_os_string();
                name.push(".");
                name.push(ext);
                base.join(name)
            })
        })
        .find(|p| exists(p))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn fs(paths: &[&str]) -> HashSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn exact_path_is_preferred() {
        let files = fs(&["models/textures/sign.png", "models/sign.png"]);
        let hit = resolve_texture_path_with(Path::new("models"), "sign.png", |p| files.contains(p));
        assert_eq!(hit, Some(PathBuf::from("models/sign.png")));
    }

    #[test]
    fn parent_and_textures_dirs_are_searched() {
        let files = fs(&["../models/textures/sign.png"]);
        let hit = resolve_texture_path_with(Path::new("models"), "sign.png", |p| files.contains(p));
        assert_eq!(hit, Some(PathBuf::from("../models/textures/sign.png")));
    }

    #[test]
    fn extension_is_swapped_when_exact_name_is_missing() {
        let files = fs(&["models/tex/road.tga", "models/tex/road.bmp"]);
        let hit = resolve_texture_path_with(Path::new("models"), "tex/road.png", |p| files.contains(p));
        assert_eq!(hit, Some(PathBuf::from("models/tex/road.tga")));
    }

    #[test]
    fn unresolved_texture_is_none() {
        let hit = resolve_texture_path_with(Path::new("models"), "nothing.png", |_| false);
        assert_eq!(hit, None);
        assert_eq!(resolve_texture_path_with(Path::new("models"), "  ", |_| true), None);
    }

    #[test]
    fn solid_texture_is_one_pixel() {
        let tex = TextureData::solid([1, 2, 3, 255]);
        assert!(tex.is_valid());
        assert_eq!(tex.data, vec![1, 2, 3, 255]);
        assert!(TextureData::new_rgba8(2, 2, vec![0; 3]).is_none());
    }

    #[test]
    fn decodes_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("px.png");
        image::RgbaImage::from_pixel(2, 1, image::Rgba([9, 8, 7, 255]))
            .save(&path)
            .unwrap();
        let tex = TextureData::load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(&tex.data[..4], &[9, 8, 7, 255]);

        assert!(TextureData::load(dir.path().join("absent.png")).unwrap_err().is_not_found());
    }
}
