//! Serialized Mesh - loads triangle meshes from compressed multi-mesh containers
//!
//! This crate ties the decoder in [`serialized_mesh_core`] to file resolution in
//! [`serialized_mesh_vfs`]:
//! - [`ShapeProps`] carries the per-shape parameters of a scene description
//! - [`load_shape`] resolves the file, decodes one sub-mesh, and hands the
//!   shared result to any [`ShapeAttachment`] (emitters, sensors)
//!
//! # Example
//!
//! ```ignore
//! use serialized_mesh::{load_shape, ShapeProps};
//! use serialized_mesh::vfs::{FileSystemProvider, Vfs};
//!
//! let mut vfs = Vfs::new();
//! vfs.mount("scene", FileSystemProvider::new("./scenes/cbox"));
//! vfs.set_default("scene");
//!
//! let props = ShapeProps::new("meshes/cbox.serialized").with_shape_index(3);
//! let mesh = load_shape(&vfs, &props, &[])?;
//! println!("{}: {} faces", mesh.name(), mesh.face_count());
//! ```

use std::sync::Arc;

pub use serialized_mesh_core;
pub use serialized_mesh_vfs as vfs;

pub use serialized_mesh_core::math::Transform;
pub use serialized_mesh_core::mesh::{ScalarType, TriangleMesh};
pub use serialized_mesh_core::serialized::{
    LoadOptions, SerializedError, container_mesh_count, load_serialized,
};

use serialized_mesh_vfs::{Vfs, VfsError, VfsFile};

/// Something that holds on to the geometry of the shape it is attached to.
///
/// Area emitters and shape-bound sensors receive the finished mesh once it
/// has been loaded and moved into world space.
pub trait ShapeAttachment {
    fn attach(&self, mesh: &Arc<TriangleMesh>);
}

/// Parameters of one serialized shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeProps {
    /// Path of the container, resolved through the [`Vfs`]
    pub filename: String,
    /// Which sub-mesh to load
    pub shape_index: i32,
    /// Shade with flat face normals instead of vertex normals
    pub face_normals: bool,
    /// Object-to-world transform
    pub to_world: Transform,
    /// In-memory precision of vertex data
    pub precision: ScalarType,
}

impl ShapeProps {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            shape_index: 0,
            face_normals: false,
            to_world: Transform::identity(),
            precision: ScalarType::Float32,
        }
    }

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

    /// Decoder options for these parameters.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_shape_index(self.shape_index)
            .with_face_normals(self.face_normals)
            .with_to_world(self.to_world.clone())
            .with_precision(self.precision)
    }

    /// Last component of `filename`, used in mesh names and messages.
    pub fn file_name(&self) -> &str {
        serialized_mesh_vfs::path::file_name(&self.filename)
    }
}

/// Open the container at `path` through `vfs`.
///
/// A failed read surfaces as [`SerializedError::Io`]; every other resolution
/// failure (missing file, unknown mount, bad path) as
/// [`SerializedError::NotFound`].
pub fn open_container(vfs: &Vfs, path: &str) -> Result<Box<dyn VfsFile>, SerializedError> {
    let file_name = serialized_mesh_vfs::path::file_name(path);
    vfs.open(path).map_err(|e| match e {
        VfsError::Io(source) => SerializedError::Io {
            name: file_name.to_owned(),
            what: "file",
            source,
        },
        other => {
            log::debug!("cannot resolve \"{path}\": {other}");
            SerializedError::NotFound {
                name: file_name.to_owned(),
            }
        }
    })
}

/// Load the shape described by `props`.
///
/// The mesh is wrapped in an [`Arc`] and passed to every attachment before
/// it is returned.
///
/// # Errors
///
/// Fails with [`SerializedError::NegativeIndex`] before touching the file
/// system, with [`SerializedError::NotFound`] if the file cannot be
/// resolved, and with any decoding error otherwise.
pub fn load_shape(
    vfs: &Vfs,
    props: &ShapeProps,
    attachments: &[&dyn ShapeAttachment],
) -> Result<Arc<TriangleMesh>, SerializedError> {
    if props.shape_index < 0 {
        return Err(SerializedError::NegativeIndex {
            index: props.shape_index,
        });
    }

    let file_name = props.file_name();
    log::debug!("Loading mesh from \"{file_name}\" ..");
    let file = open_container(vfs, &props.filename)?;

    let mesh = Arc::new(load_serialized(file, file_name, &props.load_options())?);
    for attachment in attachments {
        attachment.attach(&mesh);
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use byteorder::{LittleEndian, WriteBytesExt};
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use rstest::rstest;
    use serialized_mesh_core::math::{Point3, Vec3};
    use serialized_mesh_vfs::MemoryProvider;

    use super::*;

    /// Version 4 container with one unit triangle per name.
    fn triangle_container(names: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut offsets = Vec::new();
        for (k, name) in names.iter().enumerate() {
            let mut body = Vec::new();
            body.write_u32::<LittleEndian>(0x1000).unwrap();
            body.extend_from_slice(name.as_bytes());
            body.push(0);
            body.write_u64::<LittleEndian>(3).unwrap();
            body.write_u64::<LittleEndian>(1).unwrap();
            let x = k as f32;
            for v in [x, 0.0, 0.0, x + 1.0, 0.0, 0.0, x, 1.0, 0.0] {
                body.write_f32::<LittleEndian>(v).unwrap();
            }
            for i in [0u32, 1, 2] {
                body.write_u32::<LittleEndian>(i).unwrap();
            }

            offsets.push(out.len() as u64);
            out.write_u16::<LittleEndian>(0x041C).unwrap();
            out.write_u16::<LittleEndian>(4).unwrap();
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&body).unwrap();
            out.extend(encoder.finish().unwrap());
        }
        for offset in offsets {
            out.write_u64::<LittleEndian>(offset).unwrap();
        }
        out.write_u32::<LittleEndian>(names.len() as u32).unwrap();
        out
    }

    fn scene_vfs() -> Vfs {
        let mem = MemoryProvider::new();
        mem.insert(
            "meshes/cbox.serialized",
            triangle_container(&["floor", "ceiling", "light"]),
        );
        let mut vfs = Vfs::new();
        vfs.mount("scene", mem);
        vfs.set_default("scene");
        vfs
    }

    #[derive(Default)]
    struct Recorder {
        attached: parking_lot::Mutex<Vec<Arc<TriangleMesh>>>,
    }

    impl ShapeAttachment for Recorder {
        fn attach(&self, mesh: &Arc<TriangleMesh>) {
            self.attached.lock().push(Arc::clone(mesh));
        }
    }

    #[rstest]
    #[case::first(0, "floor")]
    #[case::middle(1, "ceiling")]
    #[case::last(2, "light")]
    fn test_load_shape_by_index(#[case] index: i32, #[case] name: &str) {
        let vfs = scene_vfs();
        let props = ShapeProps::new("meshes/cbox.serialized").with_shape_index(index);
        let mesh = load_shape(&vfs, &props, &[]).unwrap();
        assert_eq!(mesh.name(), name);
        assert_eq!(mesh.position(0), Point3::new(f64::from(index), 0.0, 0.0));
    }

    #[test]
    fn test_attachments_share_mesh() {
        let vfs = scene_vfs();
        let emitter = Recorder::default();
        let sensor = Recorder::default();
        let props = ShapeProps::new("scene/meshes/cbox.serialized").with_shape_index(2);

        let mesh = load_shape(&vfs, &props, &[&emitter, &sensor]).unwrap();

        for recorder in [&emitter, &sensor] {
            let attached = recorder.attached.lock();
            assert_eq!(attached.len(), 1);
            assert!(Arc::ptr_eq(&attached[0], &mesh));
        }
    }

    #[test]
    fn test_props_reach_decoder() {
        let vfs = scene_vfs();
        let props = ShapeProps::new("meshes/cbox.serialized")
            .with_face_normals(true)
            .with_precision(ScalarType::Float64)
            .with_to_world(Transform::translate(Vec3::new(0.0, 0.0, 2.0)));
        let mesh = load_shape(&vfs, &props, &[]).unwrap();

        assert!(mesh.has_face_normals());
        assert!(!mesh.has_vertex_normals());
        assert_eq!(mesh.layout().scalar(), ScalarType::Float64);
        assert_eq!(mesh.bbox().min.z, 2.0);
    }

    #[test]
    fn test_negative_index_before_io() {
        // The file does not exist; the index check must fire first.
        let vfs = Vfs::new();
        let props = ShapeProps::new("missing.serialized").with_shape_index(-2);
        let err = load_shape(&vfs, &props, &[]).unwrap_err();
        assert!(matches!(err, SerializedError::NegativeIndex { index: -2 }));
    }

    #[rstest]
    #[case::missing_file("meshes/nope.serialized")]
    #[case::missing_source("elsewhere/cbox.serialized")]
    fn test_unresolved_file_not_found(#[case] filename: &str) {
        let mut vfs = Vfs::new();
        vfs.mount("scene", MemoryProvider::new());
        let err = load_shape(&vfs, &ShapeProps::new(filename), &[]).unwrap_err();
        assert!(matches!(err, SerializedError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    fn test_out_of_range_names_file() {
        let vfs = scene_vfs();
        let props = ShapeProps::new("meshes/cbox.serialized").with_shape_index(3);
        let err = load_shape(&vfs, &props, &[]).unwrap_err();
        match err {
            SerializedError::OutOfRange { name, index, count } => {
                assert_eq!(name, "cbox.serialized@3");
                assert_eq!((index, count), (3, 3));
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_open_container_counts_meshes() {
        let vfs = scene_vfs();
        let file = open_container(&vfs, "scene/meshes/cbox.serialized").unwrap();
        assert_eq!(container_mesh_count(file, "cbox.serialized").unwrap(), 3);
    }

    #[rstest]
    #[case::missing_file("scene/meshes/nope.serialized", "nope.serialized")]
    #[case::bad_path("scene/../cbox.serialized", "cbox.serialized")]
    fn test_open_container_not_found(#[case] path: &str, #[case] name: &str) {
        let vfs = scene_vfs();
        match open_container(&vfs, path) {
            Err(SerializedError::NotFound { name: got }) => assert_eq!(got, name),
            Err(other) => panic!("expected NotFound, got {other:?}"),
            Ok(_) => panic!("expected NotFound, got a file"),
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(ShapeProps::new("a/b/c.serialized").file_name(), "c.serialized");
        assert_eq!(ShapeProps::new("a\\c.serialized").file_name(), "c.serialized");
        assert_eq!(ShapeProps::new("c.serialized").file_name(), "c.serialized");
    }
}
