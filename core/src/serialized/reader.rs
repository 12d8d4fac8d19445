//! Bulk reads of vertex arrays and face indices from the decompressed body.

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::mesh::{
    FaceStorage, Scalar, ScalarType, TriangleMesh, VertexAttributeSemantic, VertexStorage,
};

use super::error::SerializedError;
use super::header::MeshFlags;
use super::stream::SkipExt;

/// One contiguous array of `count` tuples of `dim` scalars in the file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArraySpec {
    pub count: usize,
    pub dim: usize,
    pub scalar: ScalarType,
}

impl ArraySpec {
    /// Number of scalars, or `None` on overflow.
    pub fn len(&self) -> Option<usize> {
        self.count.checked_mul(self.dim)
    }

    /// Size of the array in the file, or `None` on overflow.
    pub fn byte_len(&self) -> Option<u64> {
        self.len()?
            .checked_mul(self.scalar.size())
            .map(|n| n as u64)
    }
}

/// Tuples decoded per bulk read.
const CHUNK_TUPLES: usize = 16 * 1024;

/// Read one array and scatter it into the field starting at scalar `first`
/// of each vertex record.
fn read_field<R: Read>(
    reader: &mut R,
    storage: &mut VertexStorage,
    spec: ArraySpec,
    first: usize,
    stride: usize,
) -> io::Result<()> {
    match spec.scalar {
        ScalarType::Float32 => {
            read_chunked(reader, storage, spec, first, stride, |r: &mut R, buf: &mut [f32]| {
                r.read_f32_into::<LittleEndian>(buf)
            })
        }
        ScalarType::Float64 => {
            read_chunked(reader, storage, spec, first, stride, |r: &mut R, buf: &mut [f64]| {
                r.read_f64_into::<LittleEndian>(buf)
            })
        }
    }
}

/// Decode through a bounded scratch buffer so memory use stays at the size
/// of the mesh itself.
fn read_chunked<R: Read, T: Scalar + Default>(
    reader: &mut R,
    storage: &mut VertexStorage,
    spec: ArraySpec,
    first: usize,
    stride: usize,
    mut read: impl FnMut(&mut R, &mut [T]) -> io::Result<()>,
) -> io::Result<()> {
    let mut buf = vec![T::default(); CHUNK_TUPLES.min(spec.count) * spec.dim];
    let mut start = 0;
    while start < spec.count {
        let n = CHUNK_TUPLES.min(spec.count - start);
        let chunk = &mut buf[..n * spec.dim];
        read(reader, chunk)?;
        storage.scatter(chunk, start, first, spec.dim, stride);
        start += n;
    }
    Ok(())
}

/// Consume one array without storing it.
fn skip_field<R: Read>(reader: &mut R, spec: ArraySpec) -> io::Result<()> {
    let n = spec
        .byte_len()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "array size overflow"))?;
    reader.skip_bytes(n)
}

/// Read every vertex array present in the record, in file order.
///
/// Returns `true` if normals were read into the mesh.
pub(crate) fn read_vertex_arrays<R: Read>(
    reader: &mut R,
    mesh: &mut TriangleMesh,
    flags: MeshFlags,
    file_scalar: ScalarType,
    name: &str,
) -> Result<bool, SerializedError> {
    crate::profile_function!();

    let layout = mesh.layout().clone();
    let stride = layout.scalar_count();
    let count = mesh.vertex_count();
    let storage = mesh.vertex_storage_mut();

    let attributes = [
        (VertexAttributeSemantic::Position, true, "vertex positions"),
        (
            VertexAttributeSemantic::Normal,
            flags.contains(MeshFlags::HAS_NORMALS),
            "vertex normals",
        ),
        (
            VertexAttributeSemantic::TexCoord,
            flags.contains(MeshFlags::HAS_TEXCOORDS),
            "texture coordinates",
        ),
        (
            VertexAttributeSemantic::Color,
            flags.contains(MeshFlags::HAS_COLORS),
            "vertex colors",
        ),
    ];

    let mut normals_loaded = false;
    for (semantic, present, what) in attributes {
        if !present {
            continue;
        }
        let spec = ArraySpec {
            count,
            dim: semantic.dimension(),
            scalar: file_scalar,
        };
        let result = match layout.attribute_scalar_index(semantic) {
            Some(first) => {
                if semantic == VertexAttributeSemantic::Normal {
                    normals_loaded = true;
                }
                read_field(reader, storage, spec, first, stride)
            }
            None => {
                log::debug!("{name}: discarding {what}");
                skip_field(reader, spec)
            }
        };
        result.map_err(|e| SerializedError::from_io(name, what, e))?;
    }

    Ok(normals_loaded)
}

/// Read all face indices straight into the face buffer.
pub(crate) fn read_faces<R: Read>(
    reader: &mut R,
    mesh: &mut TriangleMesh,
    name: &str,
) -> Result<(), SerializedError> {
    crate::profile_function!();

    let result = match mesh.face_storage_mut() {
        FaceStorage::U32(indices) => reader.read_u32_into::<LittleEndian>(indices),
        FaceStorage::U64(indices) => reader.read_u64_into::<LittleEndian>(indices),
    };
    result.map_err(|e| SerializedError::from_io(name, "face indices", e))
}
