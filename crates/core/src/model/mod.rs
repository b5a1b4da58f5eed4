//! Core data model for training samples.
//!
//! - `RunTable`: run-length encoded binary raster, used both for sample silhouettes and
//!   for whole-sheet images.
//! - `Shape`: the classifier label attached to a sample.
//! - `Glyph` / `PixelSource`: what the recognition pipeline hands over when recording.
//! - `Sample`: one labeled exemplar, shared as [`SampleRef`].
//! - `Tribe`: a head sample plus its competing candidates.

mod glyph;
mod run_table;
mod sample;
mod shape;
mod tribe;

pub use glyph::{Glyph, PixelSource};
pub use run_table::{Orientation, Run, RunTable};
pub use sample::{Sample, SampleId, SampleRef};
pub use shape::Shape;
pub use tribe::Tribe;
