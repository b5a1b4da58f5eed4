use std::path::{Path, PathBuf};

use crate::repository::{RepositoryError, RepositoryResult};

/// Metadata archive of the global repository.
pub const SAMPLES_ARCHIVE: &str = "samples.db";
/// Image archive of the global repository.
pub const IMAGES_ARCHIVE: &str = "images.db";
/// Optional configuration files, looked up in this order.
pub const CONFIG_FILES: [&str; 3] = ["repository.json", "repository.yaml", "repository.yml"];

/// Logical layout of a repository on disk.
///
/// This is derived from a folder and an optional book radix. It does *not* perform any
/// IO itself; archives are created on first store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLayout {
    /// Folder holding both archives.
    pub root: PathBuf,
    /// Book radix, `None` for the global repository.
    pub radix: Option<String>,
    /// Metadata archive (registry, samples, tribes).
    pub samples_path: PathBuf,
    /// Image archive (one raster per sheet).
    pub images_path: PathBuf,
}

impl RepositoryLayout {
    /// Layout of the global repository living in `train_dir`.
    pub fn global(train_dir: impl AsRef<Path>) -> Self {
        let root = train_dir.as_ref().to_path_buf();
        Self {
            samples_path: root.join(SAMPLES_ARCHIVE),
            images_path: root.join(IMAGES_ARCHIVE),
            root,
            radix: None,
        }
    }

    /// Layout of the repository of book `radix`, living in `book_dir`.
    pub fn for_book(book_dir: impl AsRef<Path>, radix: &str) -> Self {
        let root = book_dir.as_ref().to_path_buf();
        Self {
            samples_path: root.join(format!("{radix}-{SAMPLES_ARCHIVE}")),
            images_path: root.join(format!("{radix}-{IMAGES_ARCHIVE}")),
            root,
            radix: Some(radix.to_string()),
        }
    }

    /// Derive the layout from a metadata archive path: `(<radix>-)?samples.db`.
    pub fn from_samples_file(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let invalid = || RepositoryError::InvalidArchiveName(path.to_path_buf());
        let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();

        if file_name == SAMPLES_ARCHIVE {
            return Ok(Self::global(root));
        }
        match file_name.strip_suffix(SAMPLES_ARCHIVE).and_then(|p| p.strip_suffix('-')) {
            Some(radix) if !radix.is_empty() => Ok(Self::for_book(root, radix)),
            _ => Err(invalid()),
        }
    }

    pub fn is_global(&self) -> bool {
        self.radix.is_none()
    }

    /// True when the metadata archive is present on disk.
    pub fn samples_exist(&self) -> bool {
        self.samples_path.is_file()
    }

    pub fn images_exist(&self) -> bool {
        self.images_path.is_file()
    }

    /// First existing configuration file in `root`, if any.
    pub fn config_path(&self) -> Option<PathBuf> {
        CONFIG_FILES.iter().map(|name| self.root.join(name)).find(|path| path.is_file())
    }
}
