use std::path::Path;

use anyhow::Result;
use tracing::warn;

use crate::repository::{LoadReport, SampleRepository};
use crate::store::{load_repository_config, RepositoryConfig, RepositoryLayout};

/// Convenience wrapper bundling layout, config and a loaded repository.
#[derive(Debug)]
pub struct RepositoryContext {
    pub layout: RepositoryLayout,
    pub config: RepositoryConfig,
    pub repository: SampleRepository,
    pub load_report: LoadReport,
}

impl RepositoryContext {
    /// Load config and repository metadata for a train folder.
    ///
    /// `book` selects the `<book>-samples.db` repository of that folder instead of the
    /// global one.
    pub fn from_root(root: impl AsRef<Path>, book: Option<&str>) -> Result<Self> {
        let root = root.as_ref();
        let layout = match book {
            Some(radix) => RepositoryLayout::for_book(root, radix),
            None => RepositoryLayout::global(root),
        };
        // Settings always come from the train folder, whichever repository is addressed.
        let config = load_repository_config(&RepositoryLayout::global(root))?;
        let mut repository = SampleRepository::open(layout.clone(), config.clone());
        let load_report = repository.load_repository();
        if let Some(failure) = &load_report.failure {
            warn!("{} could not be read: {}", repository, failure);
        }
        Ok(Self { layout, config, repository, load_report })
    }
}
