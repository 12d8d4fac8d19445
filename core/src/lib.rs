//! # Serialized Mesh Core
//!
//! Triangle mesh storage and the decoder for compressed serialized mesh
//! containers.

pub mod math;
pub mod mesh;
pub mod profiling;
pub mod serialized;

pub use mesh::TriangleMesh;
pub use serialized::{LoadOptions, SerializedError, container_mesh_count, load_serialized};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Start optional instrumentation and log the library version.
pub fn init() {
    profiling::init();
    log::info!("serialized-mesh-core v{} initialized", VERSION);
}
