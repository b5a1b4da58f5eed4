use anyhow::{Context, Result};
use samplebank_core::model::SampleRef;
use samplebank_core::repository::SampleRepository;
use serde::Serialize;

use crate::canonicalize_or_current;
use crate::commands::{open_repository, open_repository_for_update, save_repository, RepositoryArgs};

#[derive(Serialize)]
pub struct CheckedSample {
    pub sheet: String,
    pub sample: String,
    pub shape: String,
}

#[derive(Serialize)]
pub struct CheckSummary {
    pub conflicting: Vec<CheckedSample>,
    pub redundant: Vec<CheckedSample>,
    pub removed: usize,
}

fn checked(repo: &SampleRepository, sample: &SampleRef) -> CheckedSample {
    CheckedSample {
        sheet: repo.sheet_name(sample).unwrap_or("?").to_string(),
        sample: sample.to_string(),
        shape: sample.shape().to_string(),
    }
}

/// Report conflicting and redundant samples, optionally removing the redundant ones.
pub fn check_command(args: &RepositoryArgs, remove_redundant: bool, json: bool) -> Result<()> {
    let mut ctx = if remove_redundant {
        open_repository_for_update(args)?
    } else {
        open_repository(args)?
    };
    let check = ctx.repository.check_all_samples();
    let mut summary = CheckSummary {
        conflicting: check.conflictings.iter().map(|s| checked(&ctx.repository, s)).collect(),
        redundant: check.redundants.iter().map(|s| checked(&ctx.repository, s)).collect(),
        removed: 0,
    };
    let repo = &mut ctx.repository;

    if remove_redundant {
        for sample in &check.redundants {
            repo.remove_sample(sample)
                .with_context(|| format!("Failed to remove redundant {}", sample))?;
            summary.removed += 1;
        }
    }

    if json {
        let serialized = serde_json::to_string_pretty(&summary)
            .context("Failed to serialize check summary to JSON")?;
        println!("{}", serialized);
    } else {
        println!("Conflicting samples ({}):", summary.conflicting.len());
        for entry in &summary.conflicting {
            println!("  - {}/{}", entry.sheet, entry.sample);
        }
        println!("Redundant samples ({}):", summary.redundant.len());
        for entry in &summary.redundant {
            println!("  - {}/{}", entry.sheet, entry.sample);
        }
        if remove_redundant {
            println!("Removed {} redundant samples", summary.removed);
        }
    }

    if remove_redundant {
        save_repository(repo)?;
    }
    Ok(())
}

/// Merge another repository, given by its `samples.db` / `<radix>-samples.db`.
pub fn include_command(args: &RepositoryArgs, from: &str) -> Result<()> {
    let mut ctx = open_repository_for_update(args)?;
    let repo = &mut ctx.repository;

    let source = canonicalize_or_current(from)?;
    let report = repo
        .include_samples_file(&source)
        .with_context(|| format!("Failed to include {}", source.display()))?;

    println!("Included {}:", source.display());
    println!("  Sheets: {}", report.sheets);
    println!("  Samples: {} ({} already present)", report.samples, report.skipped);
    println!("  Aliases: {}", report.aliases);
    println!("  Tribe samples: {}", report.tribe_samples);

    save_repository(repo)?;
    Ok(())
}

/// Remove empty sheets and descriptors left without a sheet.
pub fn purge_command(args: &RepositoryArgs) -> Result<()> {
    let mut ctx = open_repository_for_update(args)?;
    let repo = &mut ctx.repository;

    let sheets = repo.purge_sheets().context("Failed to purge empty sheets")?;
    let descriptors =
        repo.purge_orphan_descriptors().context("Failed to purge orphan descriptors")?;
    println!("Purged {} empty sheets and {} orphan descriptors", sheets, descriptors);

    save_repository(repo)?;
    Ok(())
}
