//! CPU-side mesh representation produced by the loaders.

use crate::mtl::Material;

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Opaque id of a mesh uploaded to the render collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Non-indexed triangle list sharing a single material.
///
/// `positions`, `uvs` and `normals` are parallel and always hold a multiple of
/// three entries; every three consecutive entries form one triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelPart {
    pub material: Material,
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    /// Set once the part has been uploaded.
    pub mesh: Option<MeshHandle>,
}

impl ModelPart {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            ..Self::default()
        }
    }

    pub fn push_vertex(&mut self, position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) {
        self.positions.push(position);
        self.uvs.push(uv);
        self.normals.push(normal);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Returns `true` if the attribute arrays are non-empty, parallel and whole triangles.
    pub fn is_valid(&self) -> bool {
        let n = self.positions.len();
        n > 0 && n % 3 == 0 && self.uvs.len() == n && self.normals.len() == n
    }

    /// Interleave the parallel arrays for upload.
    pub fn interleaved(&self) -> Vec<MeshVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((&p, &n), &uv)| MeshVertex::new(p, n, uv))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_validity_requires_whole_triangles() {
        let mut part = ModelPart::new(Material::default());
        assert!(!part.is_valid());
        part.push_vertex([0.0; 3], [0.0; 2], [0.0, 1.0, 0.0]);
        part.push_vertex([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 1.0, 0.0]);
        assert!(!part.is_valid());
        part.push_vertex([0.0, 1.0, 0.0], [0.0, 1.0], [0.0, 1.0, 0.0]);
        assert!(part.is_valid());
        assert_eq!(part.triangle_count(), 1);

        let vertices = part.interleaved();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].uv, [1.0, 0.0]);
    }
}
