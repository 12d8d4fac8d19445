//! Smooth vertex normal recomputation.

use std::f64::consts::PI;

use crate::math::Vec3;

use super::data::TriangleMesh;

/// Angle between two unit vectors, stable near 0 and pi.
fn unit_angle(a: &Vec3, b: &Vec3) -> f64 {
    if a.dot(b) < 0.0 {
        PI - 2.0 * ((a + b).norm() / 2.0).min(1.0).asin()
    } else {
        2.0 * ((a - b).norm() / 2.0).min(1.0).asin()
    }
}

impl TriangleMesh {
    /// Replace vertex normals with angle-weighted averages of the incident
    /// face normals.
    ///
    /// Degenerate triangles contribute nothing. A vertex without any valid
    /// incident triangle gets `(1, 0, 0)`. Does nothing when the mesh has no
    /// normal storage.
    pub fn recompute_vertex_normals(&mut self) {
        crate::profile_function!();

        if !self.has_vertex_normals() {
            log::warn!(
                "\"{}\": cannot recompute normals, mesh has no normal storage",
                self.name()
            );
            return;
        }

        let mut accum = vec![Vec3::zeros(); self.vertex_count()];

        for f in 0..self.face_count() {
            let idx = self.face(f);
            let p = idx.map(|i| self.position(i));
            let Some(n) = (p[1] - p[0]).cross(&(p[2] - p[0])).try_normalize(0.0) else {
                continue;
            };

            for corner in 0..3 {
                let d0 = (p[(corner + 1) % 3] - p[corner]).try_normalize(0.0);
                let d1 = (p[(corner + 2) % 3] - p[corner]).try_normalize(0.0);
                if let (Some(d0), Some(d1)) = (d0, d1) {
                    accum[idx[corner]] += n * unit_angle(&d0, &d1);
                }
            }
        }

        let mut invalid = 0usize;
        for (i, n) in accum.into_iter().enumerate() {
            let n = n.try_normalize(0.0).unwrap_or_else(|| {
                invalid += 1;
                Vec3::x()
            });
            self.set_normal(i, &n);
        }

        if invalid > 0 {
            log::warn!(
                "\"{}\": {invalid} vertices have no valid incident face, normals set to +X",
                self.name()
            );
        }
    }
}
