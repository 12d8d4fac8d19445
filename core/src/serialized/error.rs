//! Error types for serialized mesh loading.

use std::io;

use thiserror::Error;

/// Errors that can occur while loading a serialized mesh.
///
/// Every error is fatal for the load that produced it: no partial mesh is
/// returned.
#[derive(Error, Debug)]
pub enum SerializedError {
    /// The container does not start with the expected format identifier.
    #[error("\"{name}\": invalid file format identifier 0x{found:04x} at byte {offset}")]
    BadFormat {
        name: String,
        found: u16,
        offset: u64,
    },
    /// The format version is not one this decoder understands.
    #[error("\"{name}\": incompatible file version 0x{found:04x}")]
    UnsupportedVersion { name: String, found: u16 },
    /// The requested sub-mesh does not exist.
    #[error("\"{name}\": shape index {index} is out of range (file contains {count} meshes)")]
    OutOfRange { name: String, index: u32, count: u32 },
    /// A negative sub-mesh index was requested.
    #[error("shape index {index} must be nonnegative")]
    NegativeIndex { index: i32 },
    /// The input does not resolve to an existing resource.
    #[error("\"{name}\": file not found")]
    NotFound { name: String },
    /// The data ended before a read was satisfied.
    #[error("\"{name}\": unexpected end of data while reading {what}")]
    Truncated { name: String, what: &'static str },
    /// Any other read, seek, or decompression failure.
    #[error("\"{name}\": I/O error while reading {what}: {source}")]
    Io {
        name: String,
        what: &'static str,
        #[source]
        source: io::Error,
    },
    /// A face references a vertex past the end of the vertex buffer.
    #[error(
        "\"{name}\": face {face} corner {corner} references vertex {index}, but the mesh has {vertex_count} vertices"
    )]
    InvalidIndex {
        name: String,
        face: usize,
        corner: usize,
        index: u64,
        vertex_count: usize,
    },
    /// The declared counts do not fit in memory.
    #[error("\"{name}\": mesh with {vertex_count} vertices and {face_count} faces is too large")]
    TooLarge {
        name: String,
        vertex_count: u64,
        face_count: u64,
    },
}

impl SerializedError {
    /// Classify an I/O error raised while reading `what`.
    ///
    /// `UnexpectedEof` becomes [`SerializedError::Truncated`]; everything else,
    /// including corrupt compressed data, becomes [`SerializedError::Io`].
    pub(crate) fn from_io(name: &str, what: &'static str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated {
                name: name.to_owned(),
                what,
            }
        } else {
            Self::Io {
                name: name.to_owned(),
                what,
                source,
            }
        }
    }
}
