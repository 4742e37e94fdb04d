//! Scene objects: loaded geometry plus placement.

use asset::{
    Material, ModelPart, RawGeometry, load_obj_from_path, mtl::load_mtl_from_path, mtl_path_for,
};
use corelib::transform::Transform;

use crate::{config::ObjectConfig, error::SceneResult};

#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub name: String,
    pub parts: Vec<ModelPart>,
    pub transform: Transform,
}

impl Model {
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(ModelPart::vertex_count).sum()
    }
}

/// Load an object's geometry, split by material when an MTL file sits next to it.
pub fn load_model(object: &ObjectConfig) -> SceneResult<Model> {
    let geometry = load_obj_from_path(&object.path)?;
    let parts = attach_materials(geometry, object);
    let name = object
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| object.path.display().to_string());

    log::info!(
        "Model '{}': {} parts, {} triangles",
        name,
        parts.len(),
        parts.iter().map(ModelPart::triangle_count).sum::<usize>()
    );

    Ok(Model {
        name,
        parts,
        transform: Transform::from_trs(object.position, object.rotation, object.scale),
    })
}

fn attach_materials(geometry: RawGeometry, object: &ObjectConfig) -> Vec<ModelPart> {
    let mtl_path = mtl_path_for(&object.path);
    match load_mtl_from_path(&mtl_path) {
        Ok(library) if !library.is_empty() => return geometry.into_parts(&library),
        Ok(_) => log::warn!("MTL {:?} defines no materials", mtl_path),
        Err(err) if err.is_not_found() => log::info!("No MTL for {:?}", object.path),
        Err(err) => log::warn!("{}", err),
    }
    vec![geometry.into_single_part(Material::preset(&object.material_type))]
}
