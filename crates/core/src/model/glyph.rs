use crate::model::RunTable;

/// Anything that can hand over a positioned pixel silhouette.
///
/// The recognition pipeline implements this for its own glyph type; [`Glyph`] is the
/// plain value version.
pub trait PixelSource {
    /// Abscissa of the bounding box, in sheet coordinates.
    fn left(&self) -> i32;
    /// Ordinate of the bounding box, in sheet coordinates.
    fn top(&self) -> i32;
    /// Pixel runs relative to the bounding box.
    fn run_table(&self) -> RunTable;
}

/// Positioned pixel silhouette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub left: i32,
    pub top: i32,
    pub runs: RunTable,
}

impl Glyph {
    pub fn new(left: i32, top: i32, runs: RunTable) -> Self {
        Self { left, top, runs }
    }
}

impl PixelSource for Glyph {
    fn left(&self) -> i32 {
        self.left
    }

    fn top(&self) -> i32 {
        self.top
    }

    fn run_table(&self) -> RunTable {
        self.runs.clone()
    }
}
