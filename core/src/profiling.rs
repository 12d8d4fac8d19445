//! Profiling support via Tracy.
//!
//! This module provides optional profiling instrumentation using the [Tracy profiler](https://github.com/wolfpld/tracy).
//! Profiling is enabled via the `profiling` Cargo feature:
//!
//! ```bash
//! cargo run --bin meshinfo --features profiling -- scene.serialized --all
//! ```
//!
//! Decoding stages (directory lookup, bulk reads, post-processing, normal
//! recomputation) are instrumented with the macros below. When profiling is
//! disabled (the default), all macros compile to no-ops.

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, Span, span};

/// Create a profiling span for the current scope.
///
/// The span automatically ends when the scope exits.
///
/// # Example
///
/// ```ignore
/// fn decode() {
///     {
///         profile_scope!("read_positions");
///         // ...
///     }
/// }
/// ```
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span for the entire function.
///
/// Place this at the start of a function to profile its entire execution.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a profiling span for function (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Start the Tracy client if profiling is enabled.
///
/// Call once at startup before any instrumented code runs.
pub fn init() {
    #[cfg(feature = "profiling")]
    {
        let _ = Client::start();
        log::info!("Tracy profiling enabled");
    }
}
