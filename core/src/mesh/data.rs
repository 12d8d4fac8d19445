//! CPU-side triangle mesh storage.
//!
//! This module provides:
//! - [`Scalar`] - Floating-point types a vertex buffer can hold
//! - [`TriangleMesh`] - An indexed triangle mesh owning its vertex and face records
//!
//! Buffers hold exactly `vertex_count` / `face_count` records. Accessors that
//! return `Option` report out-of-range records as `None`; the typed accessors
//! (`position`, `face`, ...) panic like slice indexing.

use std::collections::TryReserveError;
use std::sync::Arc;

use crate::math::{BoundingBox, Point3, Vec2, Vec3};

use super::layout::{FaceLayout, IndexFormat, ScalarType, VertexAttributeSemantic, VertexLayout};

/// A floating-point scalar that can be stored in a vertex buffer.
pub trait Scalar: bytemuck::Pod + Copy + Send + Sync + 'static {
    /// The layout scalar type matching `Self`.
    const TYPE: ScalarType;

    fn to_f32(self) -> f32;
    fn to_f64(self) -> f64;
}

impl Scalar for f32 {
    const TYPE: ScalarType = ScalarType::Float32;

    fn to_f32(self) -> f32 {
        self
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Scalar for f64 {
    const TYPE: ScalarType = ScalarType::Float64;

    fn to_f32(self) -> f32 {
        self as f32
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// Vertex scalars in the layout's in-memory precision.
#[derive(Clone)]
pub(crate) enum VertexStorage {
    Single(Vec<f32>),
    Double(Vec<f64>),
}

impl VertexStorage {
    fn zeroed(scalar: ScalarType, len: usize) -> Result<Self, TryReserveError> {
        Ok(match scalar {
            ScalarType::Float32 => Self::Single(try_zeroed(len)?),
            ScalarType::Float64 => Self::Double(try_zeroed(len)?),
        })
    }

    #[inline]
    fn get(&self, index: usize) -> f64 {
        match self {
            Self::Single(v) => f64::from(v[index]),
            Self::Double(v) => v[index],
        }
    }

    #[inline]
    fn set(&mut self, index: usize, value: f64) {
        match self {
            Self::Single(v) => v[index] = value as f32,
            Self::Double(v) => v[index] = value,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Single(v) => bytemuck::cast_slice(v),
            Self::Double(v) => bytemuck::cast_slice(v),
        }
    }

    /// Write `src` (tightly packed `dim`-tuples) into the field starting at
    /// scalar `first` of each record from record `start` on, converting
    /// precision as needed.
    pub(crate) fn scatter<T: Scalar>(
        &mut self,
        src: &[T],
        start: usize,
        first: usize,
        dim: usize,
        stride: usize,
    ) {
        let offset = start * stride;
        match self {
            Self::Single(dst) => scatter_into(&mut dst[offset..], src, first, dim, stride, T::to_f32),
            Self::Double(dst) => scatter_into(&mut dst[offset..], src, first, dim, stride, T::to_f64),
        }
    }
}

/// `len` zeros, or the allocator's refusal.
fn try_zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>, TryReserveError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, T::default());
    Ok(v)
}

fn scatter_into<S: Copy, D>(
    dst: &mut [D],
    src: &[S],
    first: usize,
    dim: usize,
    stride: usize,
    convert: impl Fn(S) -> D,
) {
    for (record, tuple) in dst.chunks_exact_mut(stride).zip(src.chunks_exact(dim)) {
        for (d, &s) in record[first..first + dim].iter_mut().zip(tuple) {
            *d = convert(s);
        }
    }
}

/// Face indices in the record's index width.
#[derive(Clone)]
pub(crate) enum FaceStorage {
    U32(Vec<u32>),
    U64(Vec<u64>),
}

impl FaceStorage {
    fn zeroed(format: IndexFormat, len: usize) -> Result<Self, TryReserveError> {
        Ok(match format {
            IndexFormat::Uint32 => Self::U32(try_zeroed(len)?),
            IndexFormat::Uint64 => Self::U64(try_zeroed(len)?),
        })
    }

    #[inline]
    pub(crate) fn raw(&self, index: usize) -> u64 {
        match self {
            Self::U32(v) => u64::from(v[index]),
            Self::U64(v) => v[index],
        }
    }

    fn set(&mut self, index: usize, value: usize) {
        match self {
            Self::U32(v) => v[index] = value as u32,
            Self::U64(v) => v[index] = value as u64,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U32(v) => bytemuck::cast_slice(v),
            Self::U64(v) => bytemuck::cast_slice(v),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
        }
    }
}

/// An indexed triangle mesh.
///
/// Owns one vertex record per vertex (layout given by [`VertexLayout`]) and
/// one face record of three indices per triangle. Positions are always
/// present; normals, texture coordinates, and colors exist when the layout
/// contains the matching attribute.
///
/// Geometry is read and written through double-precision accessors whatever
/// the storage precision. Record bytes are in native byte order.
#[derive(Clone)]
pub struct TriangleMesh {
    name: String,
    layout: Arc<VertexLayout>,
    face_layout: FaceLayout,
    vertex_count: usize,
    face_count: usize,
    vertices: VertexStorage,
    faces: FaceStorage,
    bbox: BoundingBox,
    face_normals: bool,
    // Cached scalar offsets within a record.
    stride: usize,
    normal_offset: Option<usize>,
    texcoord_offset: Option<usize>,
    color_offset: Option<usize>,
}

impl TriangleMesh {
    /// Create a zero-filled mesh with room for exactly `vertex_count`
    /// vertices and `face_count` faces.
    ///
    /// # Panics
    ///
    /// Panics if the layout lacks a position attribute or the buffers
    /// cannot be allocated.
    pub fn new(
        name: impl Into<String>,
        layout: Arc<VertexLayout>,
        index_format: IndexFormat,
        vertex_count: usize,
        face_count: usize,
    ) -> Self {
        Self::try_new(name, layout, index_format, vertex_count, face_count)
            .unwrap_or_else(|e| panic!("cannot allocate mesh buffers: {e}"))
    }

    /// Like [`new`](Self::new), but reports a failed buffer allocation
    /// instead of aborting.
    ///
    /// # Panics
    ///
    /// Panics if the layout lacks a position attribute.
    pub fn try_new(
        name: impl Into<String>,
        layout: Arc<VertexLayout>,
        index_format: IndexFormat,
        vertex_count: usize,
        face_count: usize,
    ) -> Result<Self, TryReserveError> {
        assert_eq!(
            layout.attribute_scalar_index(VertexAttributeSemantic::Position),
            Some(0),
            "vertex layout must start with a position attribute"
        );
        let stride = layout.scalar_count();
        // Saturated lengths fail the reservation with a capacity overflow.
        let vertices = VertexStorage::zeroed(layout.scalar(), vertex_count.saturating_mul(stride))?;
        let faces = FaceStorage::zeroed(index_format, face_count.saturating_mul(3))?;
        Ok(Self {
            name: name.into(),
            face_layout: FaceLayout::new(index_format),
            vertex_count,
            face_count,
            vertices,
            faces,
            bbox: BoundingBox::empty(),
            face_normals: false,
            stride,
            normal_offset: layout.attribute_scalar_index(VertexAttributeSemantic::Normal),
            texcoord_offset: layout.attribute_scalar_index(VertexAttributeSemantic::TexCoord),
            color_offset: layout.attribute_scalar_index(VertexAttributeSemantic::Color),
            layout,
        })
    }

    /// Render with flat per-face normals instead of vertex normals.
    pub fn with_face_normals(mut self, face_normals: bool) -> Self {
        self.face_normals = face_normals;
        self
    }

    /// Get the mesh name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the vertex layout.
    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.layout
    }

    /// Get the face record layout.
    pub fn face_layout(&self) -> FaceLayout {
        self.face_layout
    }

    /// Get the index format.
    pub fn index_format(&self) -> IndexFormat {
        self.face_layout.index_format
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Get the number of triangles.
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    /// World-space bounding box of all positions.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub(crate) fn set_bbox(&mut self, bbox: BoundingBox) {
        self.bbox = bbox;
    }

    /// Recompute the bounding box from the current positions.
    pub fn recompute_bbox(&mut self) {
        let mut bbox = BoundingBox::empty();
        for i in 0..self.vertex_count {
            bbox.expand(&self.position(i));
        }
        self.bbox = bbox;
    }

    pub fn has_vertex_normals(&self) -> bool {
        self.normal_offset.is_some()
    }

    pub fn has_vertex_texcoords(&self) -> bool {
        self.texcoord_offset.is_some()
    }

    pub fn has_vertex_colors(&self) -> bool {
        self.color_offset.is_some()
    }

    /// Whether consumers should shade with flat face normals.
    pub fn has_face_normals(&self) -> bool {
        self.face_normals
    }

    /// Raw bytes of vertex record `index`, or `None` past the end.
    pub fn vertex(&self, index: usize) -> Option<&[u8]> {
        if index >= self.vertex_count {
            return None;
        }
        let size = self.layout.stride() as usize;
        Some(&self.vertices.as_bytes()[index * size..(index + 1) * size])
    }

    /// Raw bytes of all vertex records.
    pub fn vertex_bytes(&self) -> &[u8] {
        self.vertices.as_bytes()
    }

    /// Raw bytes of all face records.
    pub fn face_bytes(&self) -> &[u8] {
        self.faces.as_bytes()
    }

    pub(crate) fn vertex_storage_mut(&mut self) -> &mut VertexStorage {
        &mut self.vertices
    }

    pub(crate) fn face_storage_mut(&mut self) -> &mut FaceStorage {
        &mut self.faces
    }

    #[inline]
    fn read3(&self, index: usize, offset: usize) -> [f64; 3] {
        assert!(index < self.vertex_count, "vertex {index} out of range");
        let base = index * self.stride + offset;
        [
            self.vertices.get(base),
            self.vertices.get(base + 1),
            self.vertices.get(base + 2),
        ]
    }

    #[inline]
    fn write(&mut self, index: usize, offset: usize, values: &[f64]) {
        assert!(index < self.vertex_count, "vertex {index} out of range");
        let base = index * self.stride + offset;
        for (i, &v) in values.iter().enumerate() {
            self.vertices.set(base + i, v);
        }
    }

    /// Position of vertex `index`.
    pub fn position(&self, index: usize) -> Point3 {
        Point3::from(self.read3(index, 0))
    }

    pub fn set_position(&mut self, index: usize, p: &Point3) {
        self.write(index, 0, &[p.x, p.y, p.z]);
    }

    /// Normal of vertex `index`, if the mesh stores normals.
    pub fn normal(&self, index: usize) -> Option<Vec3> {
        self.normal_offset
            .map(|offset| Vec3::from(self.read3(index, offset)))
    }

    /// # Panics
    ///
    /// Panics if the mesh has no vertex normals.
    pub fn set_normal(&mut self, index: usize, n: &Vec3) {
        let offset = self.normal_offset.expect("mesh has no vertex normals");
        self.write(index, offset, &[n.x, n.y, n.z]);
    }

    /// Texture coordinates of vertex `index`, if present.
    pub fn texcoord(&self, index: usize) -> Option<Vec2> {
        self.texcoord_offset.map(|offset| {
            assert!(index < self.vertex_count, "vertex {index} out of range");
            let base = index * self.stride + offset;
            Vec2::new(self.vertices.get(base), self.vertices.get(base + 1))
        })
    }

    /// # Panics
    ///
    /// Panics if the mesh has no texture coordinates.
    pub fn set_texcoord(&mut self, index: usize, uv: &Vec2) {
        let offset = self.texcoord_offset.expect("mesh has no texture coordinates");
        self.write(index, offset, &[uv.x, uv.y]);
    }

    /// Color of vertex `index`, if present.
    pub fn color(&self, index: usize) -> Option<Vec3> {
        self.color_offset
            .map(|offset| Vec3::from(self.read3(index, offset)))
    }

    /// # Panics
    ///
    /// Panics if the mesh has no vertex colors.
    pub fn set_color(&mut self, index: usize, rgb: &Vec3) {
        let offset = self.color_offset.expect("mesh has no vertex colors");
        self.write(index, offset, &[rgb.x, rgb.y, rgb.z]);
    }

    /// Vertex indices of triangle `index`.
    pub fn face(&self, index: usize) -> [usize; 3] {
        assert!(index < self.face_count, "face {index} out of range");
        let base = index * 3;
        [
            self.faces.raw(base) as usize,
            self.faces.raw(base + 1) as usize,
            self.faces.raw(base + 2) as usize,
        ]
    }

    pub fn set_face(&mut self, index: usize, face: [usize; 3]) {
        assert!(index < self.face_count, "face {index} out of range");
        for (corner, &vertex) in face.iter().enumerate() {
            self.faces.set(index * 3 + corner, vertex);
        }
    }

    /// First face index that does not name a vertex, as
    /// `(face, corner, value)`.
    pub fn first_invalid_index(&self) -> Option<(usize, usize, u64)> {
        let limit = self.vertex_count as u64;
        (0..self.faces.len())
            .map(|i| (i, self.faces.raw(i)))
            .find(|&(_, value)| value >= limit)
            .map(|(i, value)| (i / 3, i % 3, value))
    }

    /// Unit normal of triangle `index` following its winding, or `None`
    /// for a degenerate triangle.
    pub fn face_normal(&self, index: usize) -> Option<Vec3> {
        let [a, b, c] = self.face(index);
        let p0 = self.position(a);
        let n = (self.position(b) - p0).cross(&(self.position(c) - p0));
        n.try_normalize(0.0)
    }

    /// Area of triangle `index`.
    pub fn face_area(&self, index: usize) -> f64 {
        let [a, b, c] = self.face(index);
        let p0 = self.position(a);
        0.5 * (self.position(b) - p0)
            .cross(&(self.position(c) - p0))
            .norm()
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        (0..self.face_count).map(|f| self.face_area(f)).sum()
    }
}

impl std::fmt::Debug for TriangleMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriangleMesh")
            .field("name", &self.name)
            .field("vertex_count", &self.vertex_count)
            .field("face_count", &self.face_count)
            .field("scalar", &self.layout.scalar())
            .field("index_format", &self.face_layout.index_format)
            .field("normals", &self.has_vertex_normals())
            .field("texcoords", &self.has_vertex_texcoords())
            .field("colors", &self.has_vertex_colors())
            .field("face_normals", &self.face_normals)
            .field("bbox", &self.bbox)
            .finish()
    }
}
