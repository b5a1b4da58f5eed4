use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::model::{RunTable, SampleRef, Tribe};
use crate::registry::Descriptor;
use crate::store::ArchiveResult;

/// Folder holding the registry entry in the metadata archive.
pub const CONTAINER_FOLDER: &str = "META-INF";
/// Registry entry file name.
pub const CONTAINER_FILE: &str = "container.json";
/// Per-sheet samples entry in the metadata archive.
pub const SAMPLES_FILE: &str = "samples.json";
/// Per-sheet tribes entry in the metadata archive.
pub const TRIBES_FILE: &str = "tribes.json";
/// Per-sheet raster entry in the image archive.
pub const IMAGE_FILE: &str = "image.bin";

/// One manifest row: which artifacts a sheet has in the archives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestRecord {
    pub sheet: String,
    pub has_samples: bool,
    pub has_tribes: bool,
    pub has_image: bool,
    /// RFC 3339 timestamp of the last store touching this sheet.
    pub stored_at: String,
}

/// Persisted form of the descriptor registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub stored_at: String,
    /// Sorted by name.
    #[serde(default)]
    pub sheets: Vec<Descriptor>,
}

/// Persisted samples of one sheet.
#[derive(Debug, Serialize, Deserialize)]
pub struct SampleList {
    pub sheet: String,
    #[serde(default)]
    pub samples: Vec<SampleRef>,
}

/// Persisted tribes of one sheet.
#[derive(Debug, Serialize, Deserialize)]
pub struct TribeList {
    pub sheet: String,
    #[serde(default)]
    pub tribes: Vec<Tribe>,
}

pub fn encode_json<T: Serialize>(value: &T) -> ArchiveResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> ArchiveResult<T> {
    Ok(serde_json::from_slice(body)?)
}

pub fn encode_raster(image: &RunTable) -> ArchiveResult<Vec<u8>> {
    Ok(bincode::serialize(image)?)
}

pub fn decode_raster(body: &[u8]) -> ArchiveResult<RunTable> {
    Ok(bincode::deserialize(body)?)
}
