use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::model::{RunTable, Sample, SampleRef, Shape};
use crate::repository::{is_symbols, symbols_sheet_name, RepositoryResult, SampleRepository};
use crate::sheet::SampleSheet;

/// Train and test collections built by [`SampleRepository::split_train_and_test`].
///
/// The two collections may overlap when a shape has few samples.
#[derive(Debug, Clone, Default)]
pub struct TrainTestSplit {
    pub train: Vec<SampleRef>,
    pub test: Vec<SampleRef>,
}

impl SampleRepository {
    /// Shuffle the samples of each shape and split them into train and test.
    ///
    /// Per shape of `n` samples, train gets the first `min(n, max_count)` and test gets
    /// the tail starting at `min(max(0, n - min_count), max(max_count, n - max_count))`.
    /// Redundant font-based samples are flagged first and left out.
    pub fn split_train_and_test<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        min_count: usize,
        max_count: usize,
    ) -> TrainTestSplit {
        self.check_font_samples();

        let mut split = TrainTestSplit::default();
        for mut list in self.samples_by_shape(true).into_values() {
            list.shuffle(rng);
            let size = list.len();
            split.train.extend_from_slice(&list[..size.min(max_count)]);

            let i1 = size.saturating_sub(min_count);
            let i2 = max_count.max(size.saturating_sub(max_count));
            split.test.extend_from_slice(&list[i1.min(i2)..]);
        }

        info!("Train: {}, Test: {}", split.train.len(), split.test.len());
        split
    }

    /// Split using the bounds of the repository configuration.
    pub fn split_configured<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TrainTestSplit {
        let bounds = self.config.split;
        self.split_train_and_test(rng, bounds.min_count, bounds.max_count)
    }

    /// Keep at most `max_count` randomly chosen samples per shape; returns how many
    /// were removed. Font-based samples are never removed.
    pub fn shrink<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        max_count: usize,
    ) -> RepositoryResult<usize> {
        let mut removed = 0;
        for mut list in self.samples_by_shape(false).into_values() {
            list.retain(|sample| !sample.is_symbol());
            if list.len() <= max_count {
                continue;
            }
            list.shuffle(rng);
            for sample in &list[max_count..] {
                self.remove_sample(sample)?;
                removed += 1;
            }
        }

        info!("{} shrunk to {} samples per shape, {} removed", self, max_count, removed);
        Ok(removed)
    }

    fn samples_by_shape(&self, skip_ignored: bool) -> BTreeMap<Shape, Vec<SampleRef>> {
        let mut by_shape: BTreeMap<Shape, Vec<SampleRef>> = BTreeMap::new();
        for sample in self.all_samples() {
            if skip_ignored && self.is_ignored(&sample) {
                continue;
            }
            by_shape.entry(sample.shape().clone()).or_default().push(sample);
        }
        by_shape
    }

    /// Remove every sheet without samples, font sheets excepted; returns the count.
    pub fn purge_sheets(&mut self) -> RepositoryResult<usize> {
        let empty: Vec<String> = self
            .sheets
            .values()
            .filter(|sheet| sheet.is_empty() && !is_symbols(sheet.name()))
            .map(|sheet| sheet.name().to_string())
            .collect();
        for name in &empty {
            info!("Empty {}", name);
            self.remove_sheet(name)?;
        }

        info!("{} empty sheets purged: {}", self, empty.len());
        Ok(empty.len())
    }

    /// Remove descriptors that have no resident sheet; returns the count.
    ///
    /// Sheets left out of the load because their samples were unreadable are kept.
    pub fn purge_orphan_descriptors(&mut self) -> RepositoryResult<usize> {
        let orphans: Vec<String> = self
            .registry
            .all_descriptors()
            .into_iter()
            .filter(|desc| {
                !self.sheets.contains_key(desc.name()) && !self.unreadable.contains(desc.name())
            })
            .map(|desc| desc.name().to_string())
            .collect();
        for name in &orphans {
            self.registry.remove_descriptor(name)?;
            info!("{} removed orphan descriptor: {}", self, name);
        }
        Ok(orphans.len())
    }

    /// Font-derived sample of `shape`, at the standard interline.
    pub fn build_symbol_sample(&self, shape: Shape, runs: RunTable) -> Sample {
        Sample::synthetic(shape, runs, self.config.standard_interline)
    }

    /// Register the symbols of a font family as a synthetic sheet.
    ///
    /// Such sheets are rebuilt by the caller at each session: they are never stored,
    /// and adding them leaves the repository unmodified. They survive later loads.
    /// Samples already present (same content) are skipped. Returns the sheet name.
    pub fn add_symbol_sheet(
        &mut self,
        family: &str,
        samples: Vec<Sample>,
    ) -> RepositoryResult<String> {
        let name = symbols_sheet_name(family);
        self.sheets.entry(name.clone()).or_insert_with(|| SampleSheet::new(&name));
        self.register_symbol_sheets();

        let mut added = 0;
        for mut sample in samples {
            sample.mark_symbol();
            if self.sheets.get(&name).is_some_and(|s| s.contains_content(&sample)) {
                continue;
            }
            self.add_sample(Arc::new(sample), &name)?;
            added += 1;
        }

        info!("{} added {} symbols of font {}", self, added, family);
        Ok(name)
    }
}
