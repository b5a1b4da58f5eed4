use anyhow::{Context, Result};
use samplebank_core::repository::SampleRepository;
use samplebank_core::sheet::ImageStatus;
use samplebank_core::store::RepositoryConfig;
use serde::Serialize;

use crate::commands::{open_repository, RepositoryArgs};

#[derive(Serialize)]
pub struct RepositoryInfoSnapshot {
    pub name: String,
    pub root: String,
    pub samples_file: String,
    pub images_file: String,
    pub loaded: bool,
    pub sheets: usize,
    pub descriptors: usize,
    pub samples: usize,
    pub shapes: usize,
    pub tribes: usize,
    pub skipped_sheets: Vec<String>,
    pub orphan_entries: Vec<String>,
    pub load_failure: Option<String>,
    pub config: RepositoryConfig,
}

#[derive(Serialize)]
pub struct SheetInfo {
    pub name: String,
    pub aliases: Vec<String>,
    pub hash: Option<String>,
    pub samples: usize,
    pub tribes: usize,
    pub image: ImageStatus,
}

/// Show where the repository lives and what it holds.
pub fn info_command(args: &RepositoryArgs, json: bool) -> Result<()> {
    let ctx = open_repository(args)?;
    let repo = &ctx.repository;
    let snapshot = RepositoryInfoSnapshot {
        name: repo.to_string(),
        root: ctx.layout.root.display().to_string(),
        samples_file: ctx.layout.samples_path.display().to_string(),
        images_file: ctx.layout.images_path.display().to_string(),
        loaded: repo.is_loaded(),
        sheets: repo.sheet_count(),
        descriptors: repo.all_descriptors().len(),
        samples: repo.sample_count(),
        shapes: repo.shape_counts().len(),
        tribes: repo.all_tribes().len(),
        skipped_sheets: ctx.load_report.skipped.clone(),
        orphan_entries: ctx.load_report.orphans.clone(),
        load_failure: ctx.load_report.failure.clone(),
        config: ctx.config.clone(),
    };

    if json {
        let serialized = serde_json::to_string_pretty(&snapshot)
            .context("Failed to serialize repository info to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Sample Repository Info");
    println!("======================");
    println!("Name: {}", snapshot.name);
    println!("Root: {}", snapshot.root);
    println!("Samples file: {}", snapshot.samples_file);
    println!("Images file: {}", snapshot.images_file);
    println!("Loaded: {}", if snapshot.loaded { "yes" } else { "no" });
    println!("Sheets: {} ({} descriptors)", snapshot.sheets, snapshot.descriptors);
    println!("Samples: {} in {} shapes", snapshot.samples, snapshot.shapes);
    println!("Tribes: {}", snapshot.tribes);
    if let Some(failure) = &snapshot.load_failure {
        println!("Load failure: {}", failure);
    }
    for name in &snapshot.skipped_sheets {
        println!("  skipped sheet: {}", name);
    }
    for name in &snapshot.orphan_entries {
        println!("  orphan entry: {}", name);
    }

    Ok(())
}

fn sheet_infos(repo: &SampleRepository) -> Vec<SheetInfo> {
    repo.sheets()
        .map(|sheet| {
            let desc = repo.descriptor(sheet.name());
            SheetInfo {
                name: sheet.name().to_string(),
                aliases: desc.map(|d| d.aliases().to_vec()).unwrap_or_default(),
                hash: desc.and_then(|d| d.hash()).map(str::to_string),
                samples: sheet.sample_count(),
                tribes: sheet.tribes().len(),
                image: sheet.image_status(),
            }
        })
        .collect()
}

/// List every sheet with its aliases and sample count.
pub fn list_sheets_command(args: &RepositoryArgs, json: bool) -> Result<()> {
    let ctx = open_repository(args)?;
    let sheets = sheet_infos(&ctx.repository);

    if json {
        let serialized =
            serde_json::to_string_pretty(&sheets).context("Failed to serialize sheets to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Sheets ({}):", sheets.len());
    if sheets.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for sheet in sheets {
        let image = match sheet.image {
            ImageStatus::NoImage => "no image",
            ImageStatus::OnDisk => "image on disk",
            ImageStatus::Loaded => "image loaded",
        };
        if sheet.aliases.is_empty() {
            println!("  - {} [{} samples, {}]", sheet.name, sheet.samples, image);
        } else {
            println!(
                "  - {} [{} samples, {}] aliases: {}",
                sheet.name,
                sheet.samples,
                image,
                sheet.aliases.join(", ")
            );
        }
    }

    Ok(())
}

/// Print the sample count of every shape as a markdown table.
pub fn counts_command(args: &RepositoryArgs, json: bool) -> Result<()> {
    let ctx = open_repository(args)?;
    let counts = ctx.repository.shape_counts();

    if json {
        let by_name: Vec<(String, usize)> =
            counts.iter().map(|(shape, count)| (shape.to_string(), *count)).collect();
        let serialized = serde_json::to_string_pretty(&by_name)
            .context("Failed to serialize shape counts to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("| Shape | Count |");
    println!("| --- | ---: |");
    for (shape, count) in &counts {
        println!("| {} | {} |", shape, count);
    }
    println!("| **Total** | {} |", counts.values().sum::<usize>());

    Ok(())
}
