use anyhow::{anyhow, Context, Result};
use samplebank_core::repository::{SampleRepository, StoreReport};
use samplebank_core::store::RepositoryContext;

use crate::canonicalize_or_current;

/// Global `--root` / `--book` selection shared by every command.
#[derive(Debug, Clone)]
pub struct RepositoryArgs {
    pub root: String,
    pub book: Option<String>,
}

impl RepositoryArgs {
    pub fn new(root: impl Into<String>, book: Option<String>) -> Self {
        Self { root: root.into(), book }
    }
}

/// Load config and repository for the selected folder (delegates to core helper).
pub fn open_repository(args: &RepositoryArgs) -> Result<RepositoryContext> {
    let root_path = canonicalize_or_current(&args.root)?;
    RepositoryContext::from_root(&root_path, args.book.as_deref())
        .with_context(|| format!("Failed to open repository in {}", root_path.display()))
}

/// Like [`open_repository`], but refuse to go on when the archive could not be read:
/// storing over it would lose its content.
pub fn open_repository_for_update(args: &RepositoryArgs) -> Result<RepositoryContext> {
    let ctx = open_repository(args)?;
    if let Some(failure) = &ctx.load_report.failure {
        return Err(anyhow!(
            "Cannot update {}: {}",
            ctx.layout.samples_path.display(),
            failure
        ));
    }
    Ok(ctx)
}

/// Store the repository when modified and print what was written.
pub fn save_repository(repository: &mut SampleRepository) -> Result<Option<StoreReport>> {
    let report = repository
        .check_for_save()
        .with_context(|| format!("Failed to store {}", repository))?;
    match &report {
        Some(report) => println!(
            "Stored {}: {} sheets, {} images, {} deleted",
            repository, report.sheets_stored, report.images_stored, report.sheets_deleted
        ),
        None => println!("{} unchanged", repository),
    }
    Ok(report)
}
