//! OBJ parser supporting positions, texture coordinates, normals and `usemtl` groups.
//!
//! Faces must be triangles or quads with full `v/vt/vn` corners. Malformed
//! faces and out-of-range indices are logged and dropped; parsing continues.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{AssetError, AssetResult},
    mesh::ModelPart,
    mtl::{Material, MaterialLibrary},
};

/// Group name used for faces that appear before any `usemtl`.
pub const DEFAULT_GROUP: &str = "default";

/// Normals shorter than this are replaced by +Y.
const MIN_NORMAL_LEN: f32 = 1e-4;

/// Resolved (0-based) attribute indices of one triangle corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corner {
    pub position: usize,
    pub uv: usize,
    pub normal: usize,
}

/// Triangles that share one material name, three corners per triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceGroup {
    pub material: String,
    pub corners: Vec<Corner>,
}

/// Attribute pools plus per-material triangle lists, as read from the file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGeometry {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    /// In order of first `usemtl` (or the implicit default group).
    pub groups: Vec<FaceGroup>,
}

impl RawGeometry {
    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|g| g.corners.len() / 3).sum()
    }

    pub fn group(&self, material: &str) -> Option<&FaceGroup> {
        self.groups.iter().find(|g| g.material == material)
    }

    /// One part per material group that holds at least one triangle.
    pub fn into_parts(self, library: &MaterialLibrary) -> Vec<ModelPart> {
        self.groups
            .iter()
            .filter(|g| !g.corners.is_empty())
            .map(|group| {
                let mut material = library.find_by_name(&group.material);
                material.adjust_for_part();
                let mut part = ModelPart::new(material);
                self.extend_part(&mut part, &group.corners);
                part
            })
            .collect()
    }

    /// All groups merged into a single part using `material`.
    pub fn into_single_part(self, material: Material) -> ModelPart {
        let mut part = ModelPart::new(material);
        for group in &self.groups {
            self.extend_part(&mut part, &group.corners);
        }
        part
    }

    fn extend_part(&self, part: &mut ModelPart, corners: &[Corner]) {
        for c in corners {
            part.push_vertex(
                self.positions[c.position],
                self.uvs[c.uv],
                normalize_or_up(self.normals[c.normal]),
            );
        }
    }

    fn push_triangle(&mut self, group: usize, tri: [Corner; 3]) {
        self.groups[group].corners.extend_from_slice(&tri);
    }
}

fn normalize_or_up(n: [f32; 3]) -> [f32; 3] {
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > MIN_NORMAL_LEN {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 1.0, 0.0]
    }
}

/// Load an OBJ file from a path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> AssetResult<RawGeometry> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AssetError::from_open(path, e))?;
    let geometry = parse_obj(BufReader::new(file)).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "Loaded {}: {} triangles in {} groups",
        path.display(),
        geometry.triangle_count(),
        geometry.groups.len()
    );
    require_triangles(geometry, &path.display().to_string())
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> AssetResult<RawGeometry> {
    let geometry = parse_obj(reader).map_err(|source| AssetError::Io {
        path: "<reader>".into(),
        source,
    })?;
    require_triangles(geometry, "<reader>")
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> AssetResult<RawGeometry> {
    load_obj_from_reader(io::Cursor::new(contents))
}

fn require_triangles(geometry: RawGeometry, source: &str) -> AssetResult<RawGeometry> {
    if geometry.triangle_count() == 0 {
        return Err(AssetError::NoGeometry(source.to_string()));
    }
    Ok(geometry)
}

fn parse_obj<R: BufRead>(reader: R) -> io::Result<RawGeometry> {
    let mut geometry = RawGeometry::default();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut current: Option<usize> = None;
    let mut current_name = DEFAULT_GROUP.to_string();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else { continue };

        match tag {
            // Every attribute line takes a pool slot so later face indices stay aligned.
            "v" => {
                let (v, complete) = parse_padded::<3>(parts);
                if !complete {
                    log::warn!("OBJ line {}: vertex '{}' padded with 0", line_no, trimmed);
                }
                geometry.positions.push(v);
            }
            "vt" => {
                let ([u, v], complete) = parse_padded::<2>(parts);
                if !complete {
                    log::warn!("OBJ line {}: texture coordinate '{}' padded with 0", line_no, trimmed);
                }
                // Flipped-origin texture convention.
                geometry.uvs.push([u, -v]);
            }
            "vn" => {
                let (n, complete) = parse_padded::<3>(parts);
                if !complete {
                    log::warn!("OBJ line {}: normal '{}' padded with 0", line_no, trimmed);
                }
                geometry.normals.push(n);
            }
            "usemtl" => {
                if let Some(name) = parts.next() {
                    if name != current_name {
                        current_name = name.to_string();
                        current = None;
                    }
                }
            }
            "f" => {
                let tokens: Vec<&str> = parts.collect();
                let corners = match parse_face(&tokens, &geometry, line_no) {
                    Ok(corners) => corners,
                    Err(e) => {
                        log::warn!("Skipping face: {}", e);
                        continue;
                    }
                };

                let group = *current.get_or_insert_with(|| {
                    *group_index.entry(current_name.clone()).or_insert_with(|| {
                        geometry.groups.push(FaceGroup {
                            material: current_name.clone(),
                            corners: Vec::new(),
                        });
                        geometry.groups.len() - 1
                    })
                });

                // Fan split: (v1,v2,v3) and, for quads, (v1,v3,v4).
                for k in 1..corners.len() - 1 {
                    match (corners[0], corners[k], corners[k + 1]) {
                        (Some(a), Some(b), Some(c)) => geometry.push_triangle(group, [a, b, c]),
                        _ => log::warn!(
                            "OBJ line {}: dropping triangle with out-of-range corner",
                            line_no
                        ),
                    }
                }
            }
            _ => {
                // Ignore other directives (o/g/s/mtllib/etc.)
            }
        }
    }

    Ok(geometry)
}

/// Read up to `N` floats. Missing or malformed components are 0; the flag is
/// `false` when any component had to be filled in.
fn parse_padded<'a, const N: usize>(mut parts: impl Iterator<Item = &'a str>) -> ([f32; N], bool) {
    let mut out = [0.0; N];
    let mut complete = true;
    for slot in &mut out {
        match parts.next().map(str::parse::<f32>) {
            Some(Ok(value)) => *slot = value,
            _ => complete = false,
        }
    }
    (out, complete)
}

/// Parse the corner tokens of an `f` line.
///
/// Shape errors reject the whole face. A corner whose index is out of range
/// comes back as `None` so that only the triangles using it are dropped.
fn parse_face(
    tokens: &[&str],
    geometry: &RawGeometry,
    line_no: usize,
) -> AssetResult<Vec<Option<Corner>>> {
    if tokens.len() != 3 && tokens.len() != 4 {
        return Err(AssetError::ParseMismatch {
            line: line_no,
            reason: format!("expected 3 or 4 face corners, found {}", tokens.len()),
        });
    }

    tokens
        .iter()
        .map(|token| {
            let raw = parse_corner(token, line_no)?;
            match resolve_corner(raw, geometry, line_no) {
                Ok(corner) => Ok(Some(corner)),
                Err(e) => {
                    log::warn!("{}", e);
                    Ok(None)
                }
            }
        })
        .collect()
}

fn parse_corner(token: &str, line_no: usize) -> AssetResult<[i64; 3]> {
    let mismatch = || AssetError::ParseMismatch {
        line: line_no,
        reason: format!("face corner '{}' is not v/vt/vn", token),
    };
    let mut out = [0i64; 3];
    let mut split = token.split('/');
    for slot in &mut out {
        *slot = split
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(mismatch)?;
    }
    if split.next().is_some() {
        return Err(mismatch());
    }
    Ok(out)
}

fn resolve_corner(raw: [i64; 3], geometry: &RawGeometry, line_no: usize) -> AssetResult<Corner> {
    Ok(Corner {
        position: resolve_index(raw[0], geometry.positions.len(), line_no)?,
        uv: resolve_index(raw[1], geometry.uvs.len(), line_no)?,
        normal: resolve_index(raw[2], geometry.normals.len(), line_no)?,
    })
}

/// 1-based index (negative = relative to the pool end) to a 0-based pool slot.
fn resolve_index(raw: i64, len: usize, line_no: usize) -> AssetResult<usize> {
    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };
    if raw == 0 || idx < 0 || idx as usize >= len {
        return Err(AssetError::IndexOutOfRange {
            line: line_no,
            index: raw,
            len,
        });
    }
    Ok(idx as usize)
}
