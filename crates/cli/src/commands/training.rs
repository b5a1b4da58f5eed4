use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use samplebank_core::model::SampleRef;
use serde::Serialize;
use tracing::debug;

use crate::commands::{open_repository, open_repository_for_update, save_repository, RepositoryArgs};

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            debug!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

/// Keep at most `max_count` samples per shape (from the flag or the config).
pub fn shrink_command(args: &RepositoryArgs, max_count: Option<usize>, seed: Option<u64>) -> Result<()> {
    let mut ctx = open_repository_for_update(args)?;
    let max_count = max_count.or(ctx.config.shrink_max_count).ok_or_else(|| {
        anyhow!("No maximum count: pass --max-count or set shrink_max_count in the config")
    })?;
    let repo = &mut ctx.repository;

    let removed = repo
        .shrink(&mut rng_from(seed), max_count)
        .with_context(|| format!("Failed to shrink {}", repo))?;
    println!("Removed {} samples, at most {} kept per shape", removed, max_count);

    save_repository(repo)?;
    Ok(())
}

#[derive(Serialize, Default)]
pub struct SplitCounts {
    pub train: usize,
    pub test: usize,
}

fn count_into(counts: &mut BTreeMap<String, SplitCounts>, samples: &[SampleRef], train: bool) {
    for sample in samples {
        let entry = counts.entry(sample.shape().to_string()).or_default();
        if train {
            entry.train += 1;
        } else {
            entry.test += 1;
        }
    }
}

/// Split samples into train and test collections and report the counts per shape.
pub fn split_command(args: &RepositoryArgs, seed: Option<u64>, json: bool) -> Result<()> {
    let mut ctx = open_repository(args)?;
    let split = ctx.repository.split_configured(&mut rng_from(seed));

    let mut counts: BTreeMap<String, SplitCounts> = BTreeMap::new();
    count_into(&mut counts, &split.train, true);
    count_into(&mut counts, &split.test, false);

    if json {
        let serialized = serde_json::to_string_pretty(&counts)
            .context("Failed to serialize split counts to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("| Shape | Train | Test |");
    println!("| --- | ---: | ---: |");
    for (shape, c) in &counts {
        println!("| {} | {} | {} |", shape, c.train, c.test);
    }
    println!("| **Total** | {} | {} |", split.train.len(), split.test.len());
    Ok(())
}
