//! Asset loading/parsers: OBJ geometry grouped by material, MTL materials, textures.

pub mod error;
pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod texture;

pub use error::{AssetError, AssetResult};
pub use mesh::{MeshHandle, MeshVertex, ModelPart};
pub use mtl::{Material, MaterialCategory, MaterialLibrary, MaterialPreset, mtl_path_for};
pub use obj::{RawGeometry, load_obj_from_path, load_obj_from_reader, load_obj_from_str};
pub use texture::{TextureData, TextureHandle, resolve_texture_path};
