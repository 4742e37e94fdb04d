//! Render collaborator interface: what the scene hands to a GPU backend each frame.
//!
//! The backend itself (shader compilation, buffer upload, present) lives
//! outside this workspace. Scenes talk to it only through [`RenderSink`].

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

pub use asset::{MeshHandle, MeshVertex, TextureData, TextureHandle};

mod sink;
mod swatch;

pub use sink::{LogSink, RecordedFrame, RecordingSink};
pub use swatch::SwatchCache;

/// Number of light slots the Phong shader exposes.
pub const MAX_LIGHTS: usize = 3;

pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.2, 0.2, 1.0];

/// Camera UBO (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _pad: f32,
}

impl CameraUniform {
    pub fn new(view: Mat4, projection: Mat4, position: Vec3) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            position: position.to_array(),
            _pad: 0.0,
        }
    }
}

/// One point light. `weight` scales its diffuse/specular contribution by role.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub intensity: f32,
    pub weight: f32,
    pub enabled: u32,
    pub _pad: [u32; 2],
}

impl LightUniform {
    pub fn new(position: Vec3, intensity: f32, weight: f32, enabled: bool) -> Self {
        Self {
            position: position.to_array(),
            intensity,
            weight,
            enabled: enabled as u32,
            _pad: [0; 2],
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled != 0
    }
}

/// Per-part Phong coefficients.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub ambient: [f32; 3],
    pub shininess: f32,
    pub diffuse: [f32; 3],
    /// Decals favour their texture and get a lighting floor in the shader.
    pub is_decal: u32,
    pub specular: [f32; 3],
    pub _pad: f32,
}

impl MaterialUniform {
    pub fn from_material(material: &asset::Material) -> Self {
        Self {
            ambient: material.ambient,
            shininess: material.shininess,
            diffuse: material.diffuse,
            is_decal: material.category.is_decal() as u32,
            specular: material.specular,
            _pad: 0.0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Everything that stays constant for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Zeroable)]
pub struct FrameUniforms {
    pub clear_color: [f32; 4],
    pub camera: CameraUniform,
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl FrameUniforms {
    pub fn as_bytes(&self) -> (&[u8], &[u8]) {
        (
            bytemuck::bytes_of(&self.camera),
            bytemuck::cast_slice(&self.lights),
        )
    }
}

/// One triangle-list draw of a model part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub model: Mat4,
    pub material: MaterialUniform,
    pub texture: TextureHandle,
    pub mesh: MeshHandle,
    pub vertex_count: u32,
    /// The part belongs to the currently selected model.
    pub selected: bool,
}

/// GPU-side collaborator driven by the scene.
pub trait RenderSink {
    fn upload_mesh(&mut self, label: &str, vertices: &[MeshVertex]) -> MeshHandle;
    fn upload_texture(&mut self, label: &str, texture: &TextureData) -> TextureHandle;
    fn release_mesh(&mut self, mesh: MeshHandle);
    fn begin_frame(&mut self, frame: &FrameUniforms);
    fn draw(&mut self, call: &DrawCall);
    fn end_frame(&mut self);
}
