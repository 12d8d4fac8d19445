//! Decoder for the compressed serialized mesh container.
//!
//! A container holds one or more sub-mesh records back to back, followed by
//! a directory of record offsets and the record count. Each record starts
//! with an uncompressed 4-byte header (format identifier and version); the
//! rest is a zlib stream holding a flag word, an optional name, the vertex
//! and face counts, the vertex arrays, and the face indices. All values are
//! little-endian.
//!
//! Decoding produces a [`TriangleMesh`] whose vertex layout follows the
//! record's flags and the caller's precision. Geometry is moved into world
//! space with [`LoadOptions::to_world`] during loading.
//!
//! # Example
//!
//! ```ignore
//! use serialized_mesh_core::serialized::{load_serialized, LoadOptions};
//!
//! let file = std::fs::File::open("scene.serialized")?;
//! let options = LoadOptions::default().with_shape_index(2);
//! let mesh = load_serialized(file, "scene.serialized", &options)?;
//! println!("{}: {} triangles", mesh.name(), mesh.face_count());
//! ```

mod directory;
mod error;
mod header;
mod layout;
mod postprocess;
mod reader;
mod stream;
#[cfg(test)]
mod tests;

pub use error::SerializedError;
pub use header::{FILE_FORMAT_HEADER, FormatVersion, MeshFlags};

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;
use std::time::Instant;

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;

use crate::math::Transform;
use crate::mesh::{IndexFormat, ScalarType, TriangleMesh};

use directory::DirectoryError;

/// Options controlling how a sub-mesh is decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Which sub-mesh to load. Negative values are rejected.
    pub shape_index: i32,
    /// Shade with flat face normals; vertex normals are not stored.
    pub face_normals: bool,
    /// Object-to-world transform applied to positions and normals.
    pub to_world: Transform,
    /// In-memory precision of the vertex buffer.
    pub precision: ScalarType,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            shape_index: 0,
            face_normals: false,
            to_world: Transform::identity(),
            precision: ScalarType::Float32,
        }
    }
}

impl LoadOptions {
    pub fn with_shape_index(mut self, shape_index: i32) -> Self {
        self.shape_index = shape_index;
        self
    }

    pub fn with_face_normals(mut self, face_normals: bool) -> Self {
        self.face_normals = face_normals;
        self
    }

    pub fn with_to_world(mut self, to_world: Transform) -> Self {
        self.to_world = to_world;
        self
    }

    pub fn with_precision(mut self, precision: ScalarType) -> Self {
        self.precision = precision;
        self
    }
}

/// Load one sub-mesh from a serialized mesh container.
///
/// `file_name` is used for error messages and to name meshes that carry no
/// name of their own (`"<file_name>@<index>"`).
///
/// # Errors
///
/// Returns a [`SerializedError`] if the index is negative or out of range,
/// the header is invalid, or the data is truncated or corrupt. No partial
/// mesh is ever returned.
pub fn load_serialized<R: Read + Seek>(
    mut input: R,
    file_name: &str,
    options: &LoadOptions,
) -> Result<TriangleMesh, SerializedError> {
    crate::profile_function!();

    if options.shape_index < 0 {
        return Err(SerializedError::NegativeIndex {
            index: options.shape_index,
        });
    }
    let index = options.shape_index as u32;
    let derived_name = format!("{file_name}@{index}");
    let start = Instant::now();

    let version = {
        crate::profile_scope!("locate_record");
        seek_record(&mut input, &derived_name, index)?
    };

    let mut body = ZlibDecoder::new(&mut input);
    let derived = derived_name.as_str();
    let io_err =
        |what: &'static str| move |e: std::io::Error| SerializedError::from_io(derived, what, e);

    let flags = header::read_flags(&mut body).map_err(io_err("mesh flags"))?;
    let name = if version.has_names() {
        let stored = header::read_name(&mut body).map_err(io_err("mesh name"))?;
        if stored.is_empty() {
            derived_name.clone()
        } else {
            stored
        }
    } else {
        derived_name.clone()
    };

    let vertex_count = body
        .read_u64::<LittleEndian>()
        .map_err(io_err("vertex count"))?;
    let face_count = body
        .read_u64::<LittleEndian>()
        .map_err(io_err("face count"))?;

    let store_normals = layout::stores_normals(flags, options.face_normals);
    let vertex_layout = layout::build_vertex_layout(flags, store_normals, options.precision)
        .with_label(name.clone());
    let index_format = IndexFormat::for_vertex_count(vertex_count);
    let (vertices, faces) = checked_counts(
        vertex_count,
        face_count,
        vertex_layout.stride() as usize,
        index_format,
    )
    .ok_or_else(|| SerializedError::TooLarge {
        name: name.clone(),
        vertex_count,
        face_count,
    })?;

    log::debug!(
        "{name}: {vertices} vertices, {faces} faces, flags {:?}, version {:?}",
        flags,
        version
    );

    let mut mesh = TriangleMesh::try_new(
        name.clone(),
        Arc::new(vertex_layout),
        index_format,
        vertices,
        faces,
    )
    .map_err(|e| {
        log::debug!("{name}: buffer allocation failed: {e}");
        SerializedError::TooLarge {
            name: name.clone(),
            vertex_count,
            face_count,
        }
    })?
    .with_face_normals(!store_normals);

    let file_scalar = flags.file_scalar();
    let normals_loaded =
        reader::read_vertex_arrays(&mut body, &mut mesh, flags, file_scalar, &name)?;
    reader::read_faces(&mut body, &mut mesh, &name)?;

    if let Some((face, corner, value)) = mesh.first_invalid_index() {
        return Err(SerializedError::InvalidIndex {
            name,
            face,
            corner,
            index: value,
            vertex_count: vertices,
        });
    }

    postprocess::finish_mesh(&mut mesh, &options.to_world, normals_loaded);

    log::debug!(
        "{name}: loaded in {:.2} ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(mesh)
}

/// Number of sub-meshes recorded in a container's directory.
///
/// The first record header is validated so that arbitrary files are not
/// mistaken for containers.
pub fn container_mesh_count<R: Read + Seek>(
    mut input: R,
    file_name: &str,
) -> Result<u32, SerializedError> {
    read_valid_header(&mut input, file_name, 0)?;
    let file_size = input
        .seek(SeekFrom::End(0))
        .map_err(|e| SerializedError::from_io(file_name, "mesh directory", e))?;
    directory::read_mesh_count(&mut input, file_size)
        .map_err(|e| directory_error(file_name, 0, e))
}

/// Position `reader` just past the header of record `index` and return the
/// record's version.
fn seek_record<R: Read + Seek>(
    reader: &mut R,
    name: &str,
    index: u32,
) -> Result<FormatVersion, SerializedError> {
    let version = read_valid_header(reader, name, 0)?;
    if index == 0 {
        return Ok(version);
    }

    let offset = directory::locate_record(reader, version, index)
        .map_err(|e| directory_error(name, index, e))?;
    read_valid_header(reader, name, offset)
}

/// Seek to `offset` and validate the record header found there.
fn read_valid_header<R: Read + Seek>(
    reader: &mut R,
    name: &str,
    offset: u64,
) -> Result<FormatVersion, SerializedError> {
    reader
        .seek(SeekFrom::Start(offset))
        .map_err(|e| SerializedError::from_io(name, "file header", e))?;
    let (magic, raw_version) = header::read_record_header(reader)
        .map_err(|e| SerializedError::from_io(name, "file header", e))?;

    if magic != FILE_FORMAT_HEADER {
        return Err(SerializedError::BadFormat {
            name: name.to_owned(),
            found: magic,
            offset,
        });
    }
    FormatVersion::from_raw(raw_version).ok_or_else(|| SerializedError::UnsupportedVersion {
        name: name.to_owned(),
        found: raw_version,
    })
}

fn directory_error(name: &str, index: u32, e: DirectoryError) -> SerializedError {
    match e {
        DirectoryError::OutOfRange { count } => SerializedError::OutOfRange {
            name: name.to_owned(),
            index,
            count,
        },
        DirectoryError::Truncated => SerializedError::Truncated {
            name: name.to_owned(),
            what: "mesh directory",
        },
        DirectoryError::Io(e) => SerializedError::from_io(name, "mesh directory", e),
    }
}

/// Convert the declared counts to `usize` and make sure both buffers are
/// addressable.
fn checked_counts(
    vertex_count: u64,
    face_count: u64,
    vertex_stride: usize,
    index_format: IndexFormat,
) -> Option<(usize, usize)> {
    let vertices = usize::try_from(vertex_count).ok()?;
    let faces = usize::try_from(face_count).ok()?;
    let vertex_bytes = vertices.checked_mul(vertex_stride)?;
    let face_bytes = faces.checked_mul(3 * index_format.size())?;
    let limit = isize::MAX as usize;
    (vertex_bytes <= limit && face_bytes <= limit).then_some((vertices, faces))
}
