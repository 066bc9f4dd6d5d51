//! PLY model loading.
//!
//! Thin boundary around `ply-rs`. Only vertex positions and triangular
//! faces are read; every other element and property is ignored.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::RawMesh;

/// Reads a PLY file into a [`RawMesh`].
///
/// Errors are recoverable from the caller's point of view: a failed load
/// simply means no model data.
pub fn load_ply(path: impl AsRef<Path>) -> Result<RawMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let ply = Parser::<DefaultElement>::new()
        .read_ply(&mut reader)
        .map_err(|e| MeshError::Parse(e.to_string()))?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or_else(|| MeshError::Parse("missing vertex element".into()))?;

    let mut positions = Vec::with_capacity(vertices.len() * 3);
    for vertex in vertices {
        for key in ["x", "y", "z"] {
            positions.push(scalar(vertex.get(key).ok_or_else(|| {
                MeshError::Parse(format!("vertex missing property {key}"))
            })?)?);
        }
    }

    let faces = ply
        .payload
        .get("face")
        .ok_or_else(|| MeshError::Parse("missing face element".into()))?;

    let mut indices = Vec::with_capacity(faces.len() * 3);
    for face in faces {
        let list = face
            .get("vertex_indices")
            .or_else(|| face.get("vertex_index"))
            .ok_or_else(|| MeshError::Parse("face missing vertex indices".into()))?;
        let face_indices = index_list(list)?;
        if face_indices.len() != 3 {
            return Err(MeshError::ShortRead {
                expected: 3,
                actual: face_indices.len(),
            });
        }
        indices.extend(face_indices);
    }

    info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        positions.len() / 3,
        faces.len()
    );
    Ok(RawMesh { positions, indices })
}

fn scalar(property: &Property) -> Result<f32> {
    match property {
        Property::Float(v) => Ok(*v),
        #[allow(clippy::cast_possible_truncation)]
        Property::Double(v) => Ok(*v as f32),
        other => Err(MeshError::Parse(format!(
            "expected float vertex coordinate, got {other:?}"
        ))),
    }
}

fn index_list(property: &Property) -> Result<Vec<u32>> {
    match property {
        Property::ListUInt(v) => Ok(v.clone()),
        Property::ListInt(v) => v
            .iter()
            .map(|&i| {
                u32::try_from(i).map_err(|_| MeshError::Parse(format!("negative face index {i}")))
            })
            .collect(),
        Property::ListUShort(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        Property::ListUChar(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        other => Err(MeshError::Parse(format!(
            "expected index list, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TETRAHEDRON: &str = "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 4
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
0 0 1
3 0 1 2
3 0 1 3
3 0 2 3
3 1 2 3
";

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_ascii_tetrahedron() {
        let path = write_temp("aoview_tetra.ply", TETRAHEDRON);
        let mesh = load_ply(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices.len(), 12);
        assert_eq!(&mesh.positions[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&mesh.indices[..3], &[0, 1, 2]);
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = load_ply("/nonexistent/model.ply").unwrap_err();
        assert!(matches!(err, MeshError::Open(_)));
    }

    #[test]
    fn malformed_header_is_parse_error() {
        let path = write_temp("aoview_bad.ply", "not a ply file\n");
        let err = load_ply(&path).unwrap_err();
        assert!(matches!(err, MeshError::Parse(_)));
    }

    #[test]
    fn quad_face_is_short_read() {
        let quad = TETRAHEDRON.replace("3 0 1 2", "4 0 1 2 3");
        let path = write_temp("aoview_quad.ply", &quad);
        let err = load_ply(&path).unwrap_err();
        assert!(matches!(
            err,
            MeshError::ShortRead {
                expected: 3,
                actual: 4
            }
        ));
    }
}
