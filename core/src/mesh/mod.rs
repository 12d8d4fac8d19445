//! CPU-side triangle mesh types.
//!
//! This module provides:
//!
//! - [`VertexLayout`] - Named, offset-addressed scalar fields of one vertex record
//! - [`FaceLayout`] - Three-index face record
//! - [`TriangleMesh`] - Indexed triangle mesh owning its vertex and face buffers
//! - Smooth normal recomputation and a sphere generator for reference geometry

mod data;
pub mod generators;
mod layout;
mod normals;

pub use data::{Scalar, TriangleMesh};
pub(crate) use data::{FaceStorage, VertexStorage};
pub use layout::{
    FaceLayout, IndexFormat, ScalarType, VertexAttributeSemantic, VertexField, VertexLayout,
};
