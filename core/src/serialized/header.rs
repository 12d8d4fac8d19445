//! Record header, flag word, and mesh name parsing.

use std::io::{self, Read};

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};

use crate::mesh::ScalarType;

use super::stream::read_cstring;

/// File format identifier at the start of every sub-mesh record.
pub const FILE_FORMAT_HEADER: u16 = 0x041C;

/// Supported container versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    /// Legacy: no mesh names, 32-bit directory offsets.
    V3,
    /// Current: named meshes, 64-bit directory offsets.
    V4,
}

impl FormatVersion {
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0x0003 => Some(Self::V3),
            0x0004 => Some(Self::V4),
            _ => None,
        }
    }

    pub fn raw(&self) -> u16 {
        match self {
            Self::V3 => 0x0003,
            Self::V4 => 0x0004,
        }
    }

    /// Whether the compressed body starts with a mesh name.
    pub fn has_names(&self) -> bool {
        matches!(self, Self::V4)
    }
}

bitflags! {
    /// Per-record feature flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MeshFlags: u32 {
        const HAS_NORMALS = 0x0001;
        const HAS_TEXCOORDS = 0x0002;
        /// Reserved, never written.
        const HAS_TANGENTS = 0x0004;
        const HAS_COLORS = 0x0008;
        const FACE_NORMALS = 0x0010;
        const SINGLE_PRECISION = 0x1000;
        const DOUBLE_PRECISION = 0x2000;
    }
}

impl MeshFlags {
    /// Precision of every floating-point array in the record.
    ///
    /// Double wins if both precision bits are set; single is assumed if
    /// neither is.
    pub fn file_scalar(&self) -> ScalarType {
        if self.contains(Self::DOUBLE_PRECISION) {
            ScalarType::Float64
        } else {
            ScalarType::Float32
        }
    }
}

/// Raw `(magic, version)` pair at the start of a record.
pub(crate) fn read_record_header<R: Read>(reader: &mut R) -> io::Result<(u16, u16)> {
    let magic = reader.read_u16::<LittleEndian>()?;
    let version = reader.read_u16::<LittleEndian>()?;
    Ok((magic, version))
}

/// Read the flag word, logging anything unexpected.
pub(crate) fn read_flags<R: Read>(reader: &mut R) -> io::Result<MeshFlags> {
    let raw = reader.read_u32::<LittleEndian>()?;
    let flags = MeshFlags::from_bits_retain(raw);

    let unknown = raw & !MeshFlags::all().bits();
    if unknown != 0 {
        log::debug!("ignoring unknown mesh flag bits 0x{unknown:08x}");
    }
    if flags.contains(MeshFlags::SINGLE_PRECISION | MeshFlags::DOUBLE_PRECISION) {
        log::warn!("mesh declares both single and double precision, using double");
    }
    Ok(flags)
}

/// Read the zero-terminated mesh name (version 4 bodies only).
pub(crate) fn read_name<R: Read>(reader: &mut R) -> io::Result<String> {
    read_cstring(reader)
}
