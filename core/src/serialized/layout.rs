//! Vertex layout selection from a record's flag word.

use crate::mesh::{ScalarType, VertexAttributeSemantic, VertexLayout};

use super::header::MeshFlags;

/// Whether normals get a slot in the vertex record.
///
/// Face-normal mode, requested by the caller or by the record itself,
/// leaves vertex normals out entirely.
pub(crate) fn stores_normals(flags: MeshFlags, face_normals: bool) -> bool {
    !(face_normals || flags.contains(MeshFlags::FACE_NORMALS))
}

/// Build the in-memory vertex layout for a record.
///
/// The normal slot depends only on `store_normals`, not on whether the file
/// carries normals; missing ones are recomputed after loading.
pub(crate) fn build_vertex_layout(
    flags: MeshFlags,
    store_normals: bool,
    scalar: ScalarType,
) -> VertexLayout {
    let mut layout =
        VertexLayout::new(scalar).with_attribute(VertexAttributeSemantic::Position);
    if store_normals {
        layout = layout.with_attribute(VertexAttributeSemantic::Normal);
    }
    if flags.contains(MeshFlags::HAS_TEXCOORDS) {
        layout = layout.with_attribute(VertexAttributeSemantic::TexCoord);
    }
    if flags.contains(MeshFlags::HAS_COLORS) {
        layout = layout.with_attribute(VertexAttributeSemantic::Color);
    }
    layout
}
