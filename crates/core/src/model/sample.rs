use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{PixelSource, RunTable, Shape};

static NEXT_SAMPLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one `Sample` instance.
///
/// Ids are never persisted: a sample read back from an archive is a new instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleId(u64);

impl SampleId {
    pub fn fresh() -> Self {
        Self(NEXT_SAMPLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared handle to an immutable sample.
pub type SampleRef = Arc<Sample>;

/// One labeled pixel exemplar.
///
/// Samples are immutable once built. They have no `PartialEq`: use
/// [`Sample::same_instance`] for identity and [`Sample::same_content`] for duplicate
/// detection.
#[derive(Debug, Serialize, Deserialize)]
pub struct Sample {
    #[serde(skip, default = "SampleId::fresh")]
    id: SampleId,
    left: i32,
    top: i32,
    runs: RunTable,
    interline: u32,
    shape: Shape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pitch: Option<f64>,
    /// Font-derived samples are reproducible and never persisted.
    #[serde(skip)]
    symbol: bool,
}

impl Sample {
    pub fn new(
        shape: Shape,
        left: i32,
        top: i32,
        runs: RunTable,
        interline: u32,
        pitch: Option<f64>,
    ) -> Self {
        Self { id: SampleId::fresh(), left, top, runs, interline, shape, pitch, symbol: false }
    }

    /// Build a sample from a glyph handed over by the recognition pipeline.
    pub fn from_glyph(
        shape: Shape,
        glyph: &dyn PixelSource,
        interline: u32,
        pitch: Option<f64>,
    ) -> Self {
        Self::new(shape, glyph.left(), glyph.top(), glyph.run_table(), interline, pitch)
    }

    /// Build a synthetic (font-derived) sample.
    pub fn synthetic(shape: Shape, runs: RunTable, interline: u32) -> Self {
        let mut sample = Self::new(shape, 0, 0, runs, interline, None);
        sample.symbol = true;
        sample
    }

    pub(crate) fn mark_symbol(&mut self) {
        self.symbol = true;
    }

    pub fn id(&self) -> SampleId {
        self.id
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn run_table(&self) -> &RunTable {
        &self.runs
    }

    /// Scale of the source staff (distance between staff lines, in pixels).
    pub fn interline(&self) -> u32 {
        self.interline
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn pitch(&self) -> Option<f64> {
        self.pitch
    }

    pub fn is_symbol(&self) -> bool {
        self.symbol
    }

    /// Foreground pixel count, used as a cheap pre-filter when looking for duplicates.
    pub fn weight(&self) -> u64 {
        self.runs.weight()
    }

    /// True only when both values are the very same instance.
    pub fn same_instance(&self, other: &Sample) -> bool {
        self.id == other.id
    }

    /// True when pixels, interline and shape all match.
    pub fn same_content(&self, other: &Sample) -> bool {
        self.same_pixels(other) && self.shape == other.shape
    }

    /// True when pixels and interline match, whatever the shape.
    pub fn same_pixels(&self, other: &Sample) -> bool {
        self.interline == other.interline && self.runs == other.runs
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sample{}{{{} w:{} i:{}", self.id, self.shape, self.weight(), self.interline)?;
        if let Some(pitch) = self.pitch {
            write!(f, " p:{pitch:.1}")?;
        }
        if self.symbol {
            f.write_str(" SYMBOL")?;
        }
        f.write_str("}")
    }
}
