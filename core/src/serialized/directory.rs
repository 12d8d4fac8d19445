//! End-of-file mesh directory.
//!
//! The directory lists the byte offset of every sub-mesh record followed by
//! the record count. Version 4 stores 64-bit offsets, version 3 stores 32-bit
//! offsets; both are addressed backwards from the end of the file.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use super::header::FormatVersion;

/// Where a directory lookup failed.
#[derive(Debug)]
pub(crate) enum DirectoryError {
    /// `index` is not below the stored mesh count.
    OutOfRange { count: u32 },
    /// The directory would start before the beginning of the file.
    Truncated,
    Io(io::Error),
}

impl From<io::Error> for DirectoryError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Read the mesh count stored in the last four bytes.
pub(crate) fn read_mesh_count<R: Read + Seek>(
    reader: &mut R,
    file_size: u64,
) -> Result<u32, DirectoryError> {
    let pos = file_size.checked_sub(4).ok_or(DirectoryError::Truncated)?;
    reader.seek(SeekFrom::Start(pos))?;
    Ok(reader.read_u32::<LittleEndian>()?)
}

/// Byte position of directory entry `index` for a file of `file_size` bytes
/// holding `count` meshes.
pub(crate) fn entry_position(
    version: FormatVersion,
    file_size: u64,
    count: u32,
    index: u32,
) -> Option<u64> {
    let remaining = u64::from(count - index);
    match version {
        FormatVersion::V4 => file_size.checked_sub(8 * remaining + 4),
        FormatVersion::V3 => file_size.checked_sub(4 * (remaining + 1)),
    }
}

/// Find the byte offset of sub-mesh `index`.
///
/// Index 0 is always at offset 0 and needs no directory access.
pub(crate) fn locate_record<R: Read + Seek>(
    reader: &mut R,
    version: FormatVersion,
    index: u32,
) -> Result<u64, DirectoryError> {
    if index == 0 {
        return Ok(0);
    }

    let file_size = reader.seek(SeekFrom::End(0))?;
    let count = read_mesh_count(reader, file_size)?;
    if index >= count {
        return Err(DirectoryError::OutOfRange { count });
    }

    let pos = entry_position(version, file_size, count, index).ok_or(DirectoryError::Truncated)?;
    reader.seek(SeekFrom::Start(pos))?;

    let offset = match version {
        FormatVersion::V4 => reader.read_u64::<LittleEndian>()?,
        FormatVersion::V3 => u64::from(reader.read_u32::<LittleEndian>()?),
    };
    log::debug!("mesh {index} of {count} starts at byte {offset}");
    Ok(offset)
}
