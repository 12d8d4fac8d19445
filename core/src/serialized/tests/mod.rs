//! Decoder tests, driven by an in-memory container encoder.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::ZlibEncoder;

use super::{FILE_FORMAT_HEADER, FormatVersion, MeshFlags};


/// One sub-mesh as it is written to a container.
///
/// Attribute arrays are flat and hold `dim` values per vertex.
#[derive(Debug, Clone, Default)]
struct MeshRecord {
    name: String,
    double: bool,
    face_normals: bool,
    /// Extra raw flag bits written alongside the derived ones.
    extra_flags: u32,
    positions: Vec<f64>,
    normals: Option<Vec<f64>>,
    texcoords: Option<Vec<f64>>,
    colors: Option<Vec<f64>>,
    faces: Vec<u64>,
}

impl MeshRecord {
    fn vertex_count(&self) -> u64 {
        (self.positions.len() / 3) as u64
    }

    fn flags(&self) -> MeshFlags {
        let mut flags = MeshFlags::from_bits_retain(self.extra_flags);
        flags.set(MeshFlags::HAS_NORMALS, self.normals.is_some());
        flags.set(MeshFlags::HAS_TEXCOORDS, self.texcoords.is_some());
        flags.set(MeshFlags::HAS_COLORS, self.colors.is_some());
        flags.set(MeshFlags::FACE_NORMALS, self.face_normals);
        if self.double {
            flags |= MeshFlags::DOUBLE_PRECISION;
        } else {
            flags |= MeshFlags::SINGLE_PRECISION;
        }
        flags
    }

    /// Uncompressed body bytes.
    fn body(&self, version: FormatVersion) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(self.flags().bits()).unwrap();
        if version.has_names() {
            out.extend_from_slice(self.name.as_bytes());
            out.push(0);
        }
        out.write_u64::<LittleEndian>(self.vertex_count()).unwrap();
        out.write_u64::<LittleEndian>((self.faces.len() / 3) as u64)
            .unwrap();

        let arrays = [
            Some(&self.positions),
            self.normals.as_ref(),
            self.texcoords.as_ref(),
            self.colors.as_ref(),
        ];
        for values in arrays.into_iter().flatten() {
            for &v in values {
                if self.double {
                    out.write_f64::<LittleEndian>(v).unwrap();
                } else {
                    out.write_f32::<LittleEndian>(v as f32).unwrap();
                }
            }
        }

        let wide = self.vertex_count() > u64::from(u32::MAX);
        for &i in &self.faces {
            if wide {
                out.write_u64::<LittleEndian>(i).unwrap();
            } else {
                out.write_u32::<LittleEndian>(i as u32).unwrap();
            }
        }
        out
    }
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Header plus compressed body of one record.
fn encode_record(record: &MeshRecord, version: FormatVersion) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<LittleEndian>(FILE_FORMAT_HEADER).unwrap();
    out.write_u16::<LittleEndian>(version.raw()).unwrap();
    out.extend(compress(&record.body(version)));
    out
}

/// A full container: records, then the offset directory and count.
fn encode_container(records: &[MeshRecord], version: FormatVersion) -> Vec<u8> {
    let mut out = Vec::new();
    let mut offsets = Vec::new();
    for record in records {
        offsets.push(out.len() as u64);
        out.extend(encode_record(record, version));
    }
    for offset in offsets {
        match version {
            FormatVersion::V4 => out.write_u64::<LittleEndian>(offset).unwrap(),
            FormatVersion::V3 => out.write_u32::<LittleEndian>(offset as u32).unwrap(),
        }
    }
    out.write_u32::<LittleEndian>(records.len() as u32).unwrap();
    out
}

/// The unit right triangle in the xy-plane, named "tri".
fn triangle() -> MeshRecord {
    MeshRecord {
        name: "tri".into(),
        positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        faces: vec![0, 1, 2],
        ..Default::default()
    }
}

/// A unit quad with every optional attribute and awkward values.
fn attributed_quad(double: bool) -> MeshRecord {
    MeshRecord {
        name: "quad".into(),
        double,
        positions: vec![
            0.1, 0.2, 0.3, //
            1.7, -0.25, 0.3, //
            1.7, 1.123_456_789, -4.5, //
            0.1, 1.123_456_789, 1e-3,
        ],
        normals: Some(vec![
            0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 0.6, 0.8,
        ]),
        texcoords: Some(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.333_333_333_333, 1.0]),
        colors: Some(vec![
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, //
            0.5, 0.25, 0.125,
        ]),
        faces: vec![0, 1, 2, 0, 2, 3],
        ..Default::default()
    }
}
