//! Mesh preprocessing: unit-cube fit and flat-normal generation.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use log::{debug, warn};

/// Raw mesh data as parsed from disk: flat positions, triangle indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMesh {
    /// Vertex positions, three floats per vertex.
    pub positions: Vec<f32>,
    /// Triangle vertex indices, three per face.
    pub indices: Vec<u32>,
}

/// Interleaved vertex record uploaded to the GPU as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Non-indexed, flat-shaded vertex stream ready for upload.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffer {
    pub vertices: Vec<Vertex>,
}

impl MeshBuffer {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

impl RawMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    fn position(&self, index: u32) -> Option<Vec3> {
        let base = index as usize * 3;
        let slice = self.positions.get(base..base + 3)?;
        Some(Vec3::new(slice[0], slice[1], slice[2]))
    }

    /// Largest absolute coordinate over all positions, or `None` when the
    /// mesh has no positions.
    pub fn max_abs_coordinate(&self) -> Option<f32> {
        self.positions
            .iter()
            .map(|c| c.abs())
            .fold(None, |acc, c| Some(acc.map_or(c, |m: f32| m.max(c))))
    }

    /// Fits the mesh into a unit cube and expands it into a flat-shaded,
    /// non-indexed vertex stream.
    ///
    /// Every position is scaled by `1 / max_abs` and then shifted down by
    /// half a unit on Y only; X and Z keep their original offsets. Each
    /// triangle gets a single face normal `normalize(cross(v2-v1, v3-v1))`,
    /// duplicated across its three vertices. Degenerate triangles keep a
    /// zero normal.
    ///
    /// A mesh with no positions, a zero extent, or indices that point past
    /// the position array yields an empty buffer; the viewer keeps running
    /// without a model in that case.
    pub fn prepare(&self) -> MeshBuffer {
        let Some(max_abs) = self.max_abs_coordinate() else {
            warn!("mesh has no vertex data, skipping");
            return MeshBuffer::default();
        };
        if max_abs == 0.0 {
            warn!("mesh has zero extent, skipping");
            return MeshBuffer::default();
        }

        let scale = 1.0 / max_abs;
        let shift = Vec3::new(0.0, 0.5, 0.0);
        let mut vertices = Vec::with_capacity(self.indices.len());

        for tri in self.indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (
                self.position(tri[0]),
                self.position(tri[1]),
                self.position(tri[2]),
            ) else {
                warn!("face references vertex outside the mesh, skipping model");
                return MeshBuffer::default();
            };

            let v1 = a * scale - shift;
            let v2 = b * scale - shift;
            let v3 = c * scale - shift;
            let normal = (v2 - v1).cross(v3 - v1).normalize_or_zero().to_array();

            for v in [v1, v2, v3] {
                vertices.push(Vertex {
                    position: v.to_array(),
                    normal,
                });
            }
        }

        debug!(
            "prepared mesh: {} triangles, scale {scale}",
            vertices.len() / 3
        );
        MeshBuffer { vertices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 8 corners at +-1 on every axis, 12 triangles.
    fn unit_cube() -> RawMesh {
        let mut positions = Vec::new();
        for z in [-1.0f32, 1.0] {
            for y in [-1.0f32, 1.0] {
                for x in [-1.0f32, 1.0] {
                    positions.extend([x, y, z]);
                }
            }
        }
        let indices = vec![
            0, 2, 1, 1, 2, 3, // z = -1
            4, 5, 6, 5, 7, 6, // z = +1
            0, 1, 4, 1, 5, 4, // y = -1
            2, 6, 3, 3, 6, 7, // y = +1
            0, 4, 2, 2, 4, 6, // x = -1
            1, 3, 5, 3, 7, 5, // x = +1
        ];
        RawMesh { positions, indices }
    }

    #[test]
    fn cube_scenario_keeps_scale_and_shifts_y() {
        let mesh = unit_cube();
        assert_eq!(mesh.max_abs_coordinate(), Some(1.0));

        let buffer = mesh.prepare();
        assert_eq!(buffer.triangle_count(), 12);

        let mut y_min = f32::MAX;
        let mut y_max = f32::MIN;
        for v in &buffer.vertices {
            // Scale is 1, so X and Z pass through while Y drops by 0.5.
            assert!(v.position[0].abs() <= 1.0);
            assert!(v.position[2].abs() <= 1.0);
            y_min = y_min.min(v.position[1]);
            y_max = y_max.max(v.position[1]);
        }
        assert_eq!(y_min, -1.5);
        assert_eq!(y_max, 0.5);
    }

    #[test]
    fn flat_normals_are_unit_length_and_face_aligned() {
        let buffer = unit_cube().prepare();
        for tri in buffer.vertices.chunks_exact(3) {
            let n = Vec3::from_array(tri[0].normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            // Flat shading: all three vertices share the face normal.
            assert_eq!(tri[0].normal, tri[1].normal);
            assert_eq!(tri[1].normal, tri[2].normal);
        }
    }

    #[test]
    fn tall_model_fits_below_half_unit() {
        // A model standing on y = 0 whose height dominates its extent ends
        // up inside [-0.5, 0.5] on every axis.
        let mesh = RawMesh {
            positions: vec![
                -0.5, 0.0, 0.0, //
                0.5, 0.0, 0.3, //
                0.0, 2.0, -0.3,
            ],
            indices: vec![0, 1, 2],
        };
        let buffer = mesh.prepare();
        for v in &buffer.vertices {
            for c in v.position {
                assert!(c.abs() <= 0.5 + 1e-6, "coordinate {c} out of range");
            }
        }
    }

    #[test]
    fn degenerate_triangle_gets_zero_normal() {
        let mesh = RawMesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0],
            indices: vec![0, 1, 2],
        };
        let buffer = mesh.prepare();
        assert_eq!(buffer.vertices[0].normal, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_mesh_prepares_to_empty_buffer() {
        assert!(RawMesh::default().prepare().is_empty());
    }

    #[test]
    fn out_of_range_index_yields_empty_buffer() {
        let mesh = RawMesh {
            positions: vec![0.0, 0.0, 1.0],
            indices: vec![0, 1, 2],
        };
        assert!(mesh.prepare().is_empty());
    }

    #[test]
    fn zero_extent_mesh_yields_empty_buffer() {
        let mesh = RawMesh {
            positions: vec![0.0; 9],
            indices: vec![0, 1, 2],
        };
        assert!(mesh.prepare().is_empty());
    }
}
