//! Math type aliases, transforms, and bounding boxes.
//!
//! Geometry is processed in double precision regardless of how a mesh stores
//! its vertices; accessors widen on read and narrow on write.

pub use nalgebra;

/// 2D vector (f64).
pub type Vec2 = nalgebra::Vector2<f64>;

/// 3D vector (f64).
pub type Vec3 = nalgebra::Vector3<f64>;

/// 3D point (f64).
pub type Point3 = nalgebra::Point3<f64>;

/// 4x4 matrix (f64).
pub type Mat4 = nalgebra::Matrix4<f64>;

/// An affine object-to-world transformation.
///
/// Keeps the inverse transpose of the linear part around so normals can be
/// mapped without recomputing it per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    matrix: Mat4,
    normal_matrix: nalgebra::Matrix3<f64>,
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self::from_matrix(Mat4::identity())
    }

    /// Build a transform from a homogeneous 4x4 matrix.
    ///
    /// A singular linear part leaves normals mapped by the identity.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or_else(|| {
                log::warn!("singular transform, normals will not be transformed");
                nalgebra::Matrix3::identity()
            });
        Self {
            matrix,
            normal_matrix,
        }
    }

    /// Translation-only transform.
    pub fn translate(t: Vec3) -> Self {
        Self::from_matrix(Mat4::new_translation(&t))
    }

    /// Non-uniform scale.
    pub fn scale(s: Vec3) -> Self {
        Self::from_matrix(Mat4::new_nonuniform_scaling(&s))
    }

    /// Compose two transforms: `self` is applied first, then `other`.
    pub fn then(&self, other: &Transform) -> Self {
        Self::from_matrix(other.matrix * self.matrix)
    }

    /// The homogeneous matrix.
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Whether this is exactly the identity.
    pub fn is_identity(&self) -> bool {
        self.matrix == Mat4::identity()
    }

    /// Map a point (applies translation and the projective divide).
    pub fn transform_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// Map a direction (linear part only).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        self.matrix.transform_vector(v)
    }

    /// Map a surface normal with the inverse transpose. The result is not
    /// normalized.
    pub fn transform_normal(&self, n: &Vec3) -> Vec3 {
        self.normal_matrix * n
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned bounding box accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    /// An empty box: `min` is +inf and `max` is -inf on every axis.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Grow the box to contain `p`.
    pub fn expand(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// True once at least one point has been added.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Edge lengths, or zero for an empty box.
    pub fn extents(&self) -> Vec3 {
        if self.is_valid() {
            self.max - self.min
        } else {
            Vec3::zeros()
        }
    }

    /// Center point, if the box is not empty.
    pub fn center(&self) -> Option<Point3> {
        self.is_valid()
            .then(|| nalgebra::center(&self.min, &self.max))
    }

    /// Whether `p` lies inside or on the boundary.
    pub fn contains(&self, p: &Point3) -> bool {
        (0..3).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}
