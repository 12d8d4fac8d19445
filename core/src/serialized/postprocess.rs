//! World-space transform and normal fix-up after the raw arrays are read.

use crate::math::{BoundingBox, Transform, Vec3};
use crate::mesh::TriangleMesh;

/// Move the mesh into world space and make its normals usable.
///
/// Positions are transformed and accumulated into the bounding box. Normals
/// read from the file are transformed by the inverse transpose and
/// renormalized. If the layout has a normal slot the file did not fill,
/// smooth normals are recomputed once all positions are final.
pub(crate) fn finish_mesh(mesh: &mut TriangleMesh, to_world: &Transform, normals_loaded: bool) {
    crate::profile_function!();

    let transform_positions = !to_world.is_identity();
    let mut bbox = BoundingBox::empty();

    for i in 0..mesh.vertex_count() {
        let mut p = mesh.position(i);
        if transform_positions {
            p = to_world.transform_point(&p);
            mesh.set_position(i, &p);
            // Re-read so the box covers the stored (possibly narrowed) value.
            p = mesh.position(i);
        }
        bbox.expand(&p);

        if normals_loaded && let Some(n) = mesh.normal(i) {
            let n = if transform_positions {
                to_world.transform_normal(&n)
            } else {
                n
            };
            let n = n.try_normalize(0.0).unwrap_or_else(Vec3::zeros);
            mesh.set_normal(i, &n);
        }
    }
    mesh.set_bbox(bbox);

    if mesh.has_vertex_normals() && !normals_loaded {
        mesh.recompute_vertex_normals();
    }
}
