//! File resolution for serialized mesh loading.
//!
//! Provides a unified, synchronous API for opening mesh files from multiple
//! storage backends through the [`VfsProvider`] trait and the [`Vfs`] router.
//!
//! # Architecture
//!
//! Every operation blocks until it completes. [`Vfs::open`] hands back a
//! [`VfsFile`], a boxed `Read + Seek` handle that decoders consume directly:
//!
//! ```ignore
//! let file = vfs.open("scene/meshes/bunny.serialized")?;
//! let mesh = load_serialized(file, "bunny.serialized", &LoadOptions::default())?;
//! ```
//!
//! # Providers
//!
//! - [`MemoryProvider`]: in-memory storage for tests and embedded meshes
//! - [`FileSystemProvider`]: native filesystem access over one or more search roots
//!
//! Custom providers can implement the [`VfsProvider`] trait for packed archives
//! or other storage backends.

mod error;
#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
mod filesystem;
mod memory;
pub mod path;
mod provider;
mod vfs;

pub use error::VfsError;
#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
pub use filesystem::FileSystemProvider;
pub use memory::MemoryProvider;
pub use provider::{VfsFile, VfsProvider};
pub use vfs::Vfs;
