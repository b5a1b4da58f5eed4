#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use samplebank_core::model::{RunTable, Sample, Shape};
use samplebank_core::repository::SampleRepository;
use samplebank_core::store::{RepositoryConfig, RepositoryLayout};

fn sample(shape: &str, rows: &[&str]) -> Arc<Sample> {
    Arc::new(Sample::new(Shape::new(shape), 0, 0, RunTable::from_rows(rows), 20, None))
}

/// Global repository with one imaged sheet `p1` (alias `book/p1`) holding
/// dot x2 (identical), flat and sharp (same pixels), plus a declared sheet
/// `empty` that never gets stored.
pub fn seed_global(root: &Path) {
    let mut repo =
        SampleRepository::open(RepositoryLayout::global(root), RepositoryConfig::default());
    let image = Arc::new(RunTable::from_rows(&["#.", ".#"]));
    let p1 = repo
        .find_sample_sheet("p1", Some("book/p1"), Some(image))
        .expect("sheet p1")
        .name()
        .to_string();
    for sample in [
        sample("dot", &["##"]),
        sample("dot", &["##"]),
        sample("flat", &["#.#"]),
        sample("sharp", &["#.#"]),
    ] {
        repo.add_sample(sample, &p1).expect("add sample");
    }
    repo.find_sample_sheet("empty", None, None).expect("sheet empty");
    repo.store_repository().expect("store global");
}

/// Book repository `opus` with one imaged sheet holding a single natural.
pub fn seed_book(root: &Path) {
    let mut repo =
        SampleRepository::open(RepositoryLayout::for_book(root, "opus"), RepositoryConfig::default());
    let image = Arc::new(RunTable::from_rows(&["###", "..."]));
    let sheet = repo
        .find_sample_sheet("opus#1", None, Some(image))
        .expect("sheet")
        .name()
        .to_string();
    repo.add_sample(sample("natural", &["###"]), &sheet).expect("add sample");
    repo.store_repository().expect("store book");
}

/// Reload the global repository of `root`.
pub fn reload_global(root: &Path) -> SampleRepository {
    let mut repo =
        SampleRepository::open(RepositoryLayout::global(root), RepositoryConfig::default());
    let report = repo.load_repository();
    assert!(report.failure.is_none(), "reload failed: {:?}", report.failure);
    repo
}
