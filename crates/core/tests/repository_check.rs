use std::path::Path;
use std::sync::Arc;

use samplebank_core::model::{RunTable, Sample, SampleRef, Shape};
use samplebank_core::repository::SampleRepository;
use samplebank_core::store::{RepositoryConfig, RepositoryLayout};
use tempfile::tempdir;

fn global_repo(dir: &Path) -> SampleRepository {
    SampleRepository::open(RepositoryLayout::global(dir), RepositoryConfig::default())
}

fn sample(shape: &str, rows: &[&str], interline: u32) -> SampleRef {
    Arc::new(Sample::new(Shape::new(shape), 0, 0, RunTable::from_rows(rows), interline, None))
}

fn sheet(repo: &mut SampleRepository, name: &str) -> String {
    repo.find_sample_sheet(name, None, None).expect("sheet").name().to_string()
}

#[test]
fn identical_samples_yield_exactly_one_redundant() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());
    let a = sheet(&mut repo, "a");
    let b = sheet(&mut repo, "b");
    let first = sample("dot", &["##", "##"], 20);
    let second = sample("dot", &["##", "##"], 20);
    repo.add_sample(Arc::clone(&first), &a).expect("add");
    repo.add_sample(Arc::clone(&second), &b).expect("add");
    // Same weight, other pixels: never compared as equal.
    repo.add_sample(sample("dot", &["####"], 20), &a).expect("add");

    let check = repo.check_all_samples();
    assert!(check.conflictings.is_empty());
    assert_eq!(check.redundants.len(), 1);
    assert!(check.redundants[0].same_instance(&second), "the later sheet in order is redundant");
    assert_eq!(repo.sample_count(), 3, "check removes nothing");
}

#[test]
fn same_pixels_with_other_shape_are_conflicting() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());
    let a = sheet(&mut repo, "a");
    repo.add_sample(sample("dot", &["#.#"], 20), &a).expect("add");
    repo.add_sample(sample("staccato", &["#.#"], 20), &a).expect("add");
    // Different interline: not the same sample.
    repo.add_sample(sample("dot", &["#.#"], 16), &a).expect("add");

    let check = repo.check_all_samples();
    assert_eq!(check.conflictings.len(), 2);
    assert!(check.redundants.is_empty());
    assert!(!check.is_clean());
}

#[test]
fn conflicting_and_redundant_sets_stay_disjoint() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());
    let a = sheet(&mut repo, "a");
    repo.add_sample(sample("dot", &["###"], 20), &a).expect("add");
    repo.add_sample(sample("flat", &["###"], 20), &a).expect("add");
    repo.add_sample(sample("flat", &["###"], 20), &a).expect("add");

    let check = repo.check_all_samples();
    assert_eq!(check.conflictings.len(), 3);
    for redundant in &check.redundants {
        assert!(!check.conflictings.iter().any(|c| c.same_instance(redundant)));
    }
}

#[test]
fn font_samples_are_never_redundant_but_can_be_ignored() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());
    let runs = RunTable::from_rows(&["##"]);
    let symbols = vec![
        repo.build_symbol_sample(Shape::new("dot"), runs.clone()),
        repo.build_symbol_sample(Shape::new("dot"), RunTable::from_rows(&["#.#"])),
    ];
    repo.add_symbol_sheet("Bravura", symbols).expect("symbols");
    let other = vec![repo.build_symbol_sample(Shape::new("dot"), runs)];
    repo.add_symbol_sheet("Leland", other).expect("symbols");

    let check = repo.check_all_samples();
    assert!(check.redundants.is_empty());

    assert_eq!(repo.check_font_samples(), 1);
    let ignored: Vec<_> = repo.all_samples().into_iter().filter(|s| repo.is_ignored(s)).collect();
    assert_eq!(ignored.len(), 1);
    assert_eq!(repo.check_font_samples(), 0, "already flagged");
}
