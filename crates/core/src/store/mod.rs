//! Archive layer and on-disk layout of a sample repository.
//!
//! This module provides:
//! - `ArchiveDb`: a SQLite file packing a `folder/file` tree plus the sheet manifest.
//! - Entry records (`ContainerRecord`, `SampleList`, `TribeList`, `ManifestRecord`).
//! - `RepositoryLayout`: computed archive paths for the global or a book repository.
//! - `RepositoryConfig`: serializable repository settings.
//! - `RepositoryContext`: layout, config and loaded repository bundled together.

mod archive_db;
mod config;
mod context;
mod layout;
mod models;
mod util;

pub use archive_db::{ArchiveDb, ArchiveError, ArchiveResult, CURRENT_SCHEMA_VERSION};
pub use config::{RepositoryConfig, SplitConfig};
pub use context::RepositoryContext;
pub use layout::{RepositoryLayout, CONFIG_FILES, IMAGES_ARCHIVE, SAMPLES_ARCHIVE};
pub use models::{
    decode_json, decode_raster, encode_json, encode_raster, ContainerRecord, ManifestRecord,
    SampleList, TribeList, CONTAINER_FILE, CONTAINER_FOLDER, IMAGE_FILE, SAMPLES_FILE,
    TRIBES_FILE,
};
pub use util::{load_repository_config, read_repository_config};
