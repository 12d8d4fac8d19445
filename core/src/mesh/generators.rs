//! Mesh generators for common shapes.
//!
//! Used by tests and benchmarks as reference geometry with known normals.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::math::{Point3, Vec2, Vec3};

use super::data::TriangleMesh;
use super::layout::{IndexFormat, ScalarType, VertexAttributeSemantic, VertexLayout};

/// Generate a UV sphere mesh.
///
/// Creates a sphere with the given radius, number of longitudinal segments,
/// and number of latitudinal rings. Vertices carry position, analytic unit
/// normal, and texture coordinates; triangles wind counter-clockwise when
/// seen from outside.
///
/// # Arguments
///
/// * `radius` - Sphere radius
/// * `segments` - Number of longitudinal segments (around the equator)
/// * `rings` - Number of latitudinal rings (from pole to pole)
/// * `scalar` - In-memory precision of the vertex buffer
pub fn generate_sphere(radius: f64, segments: usize, rings: usize, scalar: ScalarType) -> TriangleMesh {
    let layout = VertexLayout::new(scalar)
        .with_attribute(VertexAttributeSemantic::Position)
        .with_attribute(VertexAttributeSemantic::Normal)
        .with_attribute(VertexAttributeSemantic::TexCoord)
        .with_label("sphere");

    let vertex_count = (rings + 1) * (segments + 1);
    let face_count = rings * segments * 2;
    let mut mesh = TriangleMesh::new(
        "sphere",
        Arc::new(layout),
        IndexFormat::for_vertex_count(vertex_count as u64),
        vertex_count,
        face_count,
    );

    for ring in 0..=rings {
        let theta = ring as f64 * PI / rings as f64;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for segment in 0..=segments {
            let phi = segment as f64 * 2.0 * PI / segments as f64;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let n = Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi);
            let i = ring * (segments + 1) + segment;
            mesh.set_position(i, &Point3::from(n * radius));
            mesh.set_normal(i, &n);
            mesh.set_texcoord(
                i,
                &Vec2::new(segment as f64 / segments as f64, ring as f64 / rings as f64),
            );
        }
    }

    let mut face = 0;
    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            mesh.set_face(face, [current, current + 1, next]);
            mesh.set_face(face + 1, [current + 1, next + 1, next]);
            face += 2;
        }
    }

    mesh.recompute_bbox();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sphere_counts() {
        let mesh = generate_sphere(1.0, 8, 4, ScalarType::Float32);
        // (rings+1) * (segments+1) = 5 * 9 = 45 vertices
        assert_eq!(mesh.vertex_count(), 45);
        // rings * segments * 2 = 64 triangles
        assert_eq!(mesh.face_count(), 64);
        assert!(mesh.first_invalid_index().is_none());
    }

    #[test]
    fn test_sphere_vertex_data_size() {
        let mesh = generate_sphere(1.0, 4, 2, ScalarType::Float32);
        // (2+1) * (4+1) = 15 vertices * 32 bytes = 480
        assert_eq!(mesh.vertex_bytes().len(), 15 * 32);
    }

    #[test]
    fn test_sphere_faces_point_outward() {
        let mesh = generate_sphere(2.0, 16, 8, ScalarType::Float64);
        for f in 0..mesh.face_count() {
            let Some(n) = mesh.face_normal(f) else {
                continue; // degenerate triangles at the poles
            };
            let [a, b, c] = mesh.face(f);
            let centroid = (mesh.position(a).coords + mesh.position(b).coords + mesh.position(c).coords) / 3.0;
            assert!(n.dot(&centroid) > 0.0, "face {f} points inward");
        }
    }

    #[test]
    fn test_sphere_bbox() {
        let mesh = generate_sphere(2.0, 16, 8, ScalarType::Float64);
        let bbox = mesh.bbox();
        assert!((bbox.max.y - 2.0).abs() < 1e-12);
        assert!((bbox.min.y + 2.0).abs() < 1e-12);
        assert!((bbox.max.x - 2.0).abs() < 1e-12);
    }
}
