use serde::{Deserialize, Serialize};

/// Bounds used when splitting samples into train and test collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Minimum sample count per shape kept for test.
    pub min_count: usize,
    /// Maximum sample count per shape, for train and for test.
    pub max_count: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { min_count: 10, max_count: 100 }
    }
}

/// Serializable settings of a sample repository.
///
/// Read from `repository.json` (or `.yaml` / `.yml`) next to the global archives.
/// Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Persist and merge tribes.
    pub use_tribes: bool,
    /// Interline given to font-derived samples.
    pub standard_interline: u32,
    /// Log elapsed time per load stage.
    pub log_stage_timings: bool,
    pub split: SplitConfig,
    /// Optional per-shape cap applied by maintenance commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shrink_max_count: Option<usize>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            use_tribes: true,
            standard_interline: 20,
            log_stage_timings: false,
            split: SplitConfig::default(),
            shrink_max_count: None,
        }
    }
}
