//! samplebank-core
//!
//! Core library for the training-sample repository used by shape classifiers.
//!
//! This crate defines the sample model (pixel runs, samples, tribes), the per-source
//! sample sheets, the descriptor registry that gives every sheet a content-addressed
//! identity, the SQLite-backed archives, and the `SampleRepository` tying them together.
//!
//! Feature extraction and classifier training live elsewhere; they consume the read-only
//! views exposed by [`repository::SampleRepository`].

pub mod model;
pub mod registry;
pub mod sheet;
pub mod store;
pub mod repository;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
