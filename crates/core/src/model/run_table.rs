use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Direction along which runs are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// One sequence per row, runs progress along x.
    Horizontal,
    /// One sequence per column, runs progress along y.
    Vertical,
}

impl Orientation {
    fn ordinal(self) -> u8 {
        match self {
            Orientation::Horizontal => 0,
            Orientation::Vertical => 1,
        }
    }
}

/// A run of consecutive foreground pixels within one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
    pub start: u32,
    pub length: u32,
}

impl Run {
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }
}

/// Run-length encoded binary raster.
///
/// Equality and `Hash` are structural: two tables are equal when orientation, dimensions
/// and every run match. This is what the repository uses to prove that two sheet images
/// are the same, after [`RunTable::persistent_hash`] has narrowed the candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunTable {
    orientation: Orientation,
    width: u32,
    height: u32,
    sequences: Vec<Vec<Run>>,
}

impl RunTable {
    /// Build a table from already-encoded sequences.
    ///
    /// There must be one sequence per row (horizontal) or per column (vertical).
    pub fn new(orientation: Orientation, width: u32, height: u32, sequences: Vec<Vec<Run>>) -> Self {
        Self { orientation, width, height, sequences }
    }

    /// Build a horizontal table from text rows, where `#` or `X` is foreground.
    ///
    /// Handy for tests and for small synthetic glyphs.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as u32;
        let sequences = rows
            .iter()
            .map(|row| {
                let mut runs = Vec::new();
                let mut current: Option<Run> = None;
                for (x, c) in row.chars().enumerate() {
                    if c == '#' || c == 'X' {
                        match current.as_mut() {
                            Some(run) => run.length += 1,
                            None => current = Some(Run::new(x as u32, 1)),
                        }
                    } else if let Some(run) = current.take() {
                        runs.push(run);
                    }
                }
                runs.extend(current);
                runs
            })
            .collect();

        Self::new(Orientation::Horizontal, width, rows.len() as u32, sequences)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sequences(&self) -> &[Vec<Run>] {
        &self.sequences
    }

    /// Number of foreground pixels.
    pub fn weight(&self) -> u64 {
        self.sequences.iter().flatten().map(|run| u64::from(run.length)).sum()
    }

    /// Content hash that is stable across executions and platforms.
    ///
    /// SHA-256 over orientation, dimensions and every run, as a hex string. Equal tables
    /// always share a hash; the converse is only a strong hint.
    pub fn persistent_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update([self.orientation.ordinal()]);
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        for sequence in &self.sequences {
            hasher.update((sequence.len() as u32).to_le_bytes());
            for run in sequence {
                hasher.update(run.start.to_le_bytes());
                hasher.update(run.length.to_le_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}
