use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use samplebank_core::model::{Orientation, Run, RunTable, Sample, Shape};
use samplebank_core::repository::{RepositoryError, RepositoryEvent, SampleRepository};
use samplebank_core::sheet::ImageStatus;
use samplebank_core::store::{RepositoryConfig, RepositoryLayout};
use tempfile::tempdir;

fn global_repo(dir: &Path) -> SampleRepository {
    SampleRepository::open(RepositoryLayout::global(dir), RepositoryConfig::default())
}

/// One-row image whose only run starts at `offset`.
fn image(offset: u32) -> Arc<RunTable> {
    Arc::new(RunTable::new(Orientation::Horizontal, 64, 1, vec![vec![Run::new(offset, 3)]]))
}

fn find(repo: &mut SampleRepository, name: &str, image: Option<Arc<RunTable>>) -> String {
    repo.find_sample_sheet(name, None, image).expect("find sheet").name().to_string()
}

#[test]
fn same_image_resolves_to_same_sheet_whatever_the_name() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());

    let first = find(&mut repo, "page-1", Some(image(1)));
    let second = find(&mut repo, "renamed", Some(image(1)));
    assert_eq!(first, "page-1");
    assert_eq!(second, first);
    assert_eq!(repo.sheet_count(), 1);
    assert_eq!(repo.all_descriptors().len(), 1);
}

#[test]
fn name_collisions_with_different_images_get_numbered() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());

    assert_eq!(find(&mut repo, "foo", Some(image(1))), "foo");
    assert_eq!(find(&mut repo, "foo", Some(image(2))), "foo_01");
    assert_eq!(find(&mut repo, "foo", Some(image(3))), "foo_02");
    assert_eq!(repo.sheet_count(), 3);
    // The plain name keeps designating the first sheet only.
    assert_eq!(repo.descriptor("foo").map(|d| d.name()), Some("foo"));
}

#[test]
fn aliases_accumulate_on_one_descriptor() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());

    let name = repo
        .find_sample_sheet("a", Some("Book A#1"), Some(image(7)))
        .expect("find")
        .name()
        .to_string();
    find(&mut repo, "b", Some(image(7)));

    let desc = repo.descriptor(&name).expect("descriptor");
    assert_eq!(desc.name(), "a");
    assert!(desc.aliases().iter().any(|a| a == "Book A#1"));
    assert!(desc.aliases().iter().any(|a| a == "b"));
    assert_eq!(repo.descriptor("a").map(|d| d.name()), Some("a"));
    assert_eq!(repo.descriptor("b").map(|d| d.name()), Some("a"));
    assert_eq!(repo.all_descriptors().len(), 1);
}

#[test]
fn find_needs_a_name_or_an_image() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());

    let err = repo.find_sample_sheet("", None, None).unwrap_err();
    assert!(matches!(err, RepositoryError::MissingIdentity));

    assert_eq!(find(&mut repo, "", Some(image(4))), "sheet");
}

#[test]
fn name_only_path_resolves_through_aliases() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());

    let sheet = repo.find_sample_sheet("x", Some("Book/x"), None).expect("find");
    assert_eq!(sheet.image_status(), ImageStatus::NoImage);
    assert_eq!(find(&mut repo, "book/X", None), "x");
    assert!(repo.descriptor("x").expect("x").hash().is_none());
    assert_eq!(repo.sheet_count(), 1);
}

#[test]
fn stored_image_is_matched_after_reload() {
    let dir = tempdir().expect("tempdir");
    {
        let mut repo = global_repo(dir.path());
        let name = find(&mut repo, "page", Some(image(9)));
        let sample = Arc::new(Sample::new(Shape::new("dot"), 0, 0, RunTable::from_rows(&["##"]), 20, None));
        repo.add_sample(sample, &name).expect("add");
        repo.store_repository().expect("store");
    }

    let mut repo = global_repo(dir.path());
    let report = repo.load_repository();
    assert_eq!(report.loaded, 1);
    assert_eq!(repo.image_status("page"), Some(ImageStatus::OnDisk));

    // A fresh image value with the same content, under another name.
    assert_eq!(find(&mut repo, "page (copy)", Some(image(9))), "page");
    assert_eq!(repo.image_status("page"), Some(ImageStatus::Loaded));
    assert_eq!(repo.sheet("page (copy)").map(|s| s.sample_count()), Some(1));
    assert_eq!(find(&mut repo, "page", Some(image(10))), "page_01");
}

#[test]
fn indexes_follow_sample_and_sheet_removals() {
    let dir = tempdir().expect("tempdir");
    let mut repo = global_repo(dir.path());
    let name = find(&mut repo, "p", Some(image(1)));

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let id = repo.add_listener(move |event: &RepositoryEvent| {
        let label = match event {
            RepositoryEvent::SampleAdded { .. } => "added",
            RepositoryEvent::SampleRemoved { .. } => "removed",
            RepositoryEvent::SheetRemoved { .. } => "sheet-removed",
        };
        sink.borrow_mut().push(label);
    });

    let a = Arc::new(Sample::new(Shape::new("dot"), 0, 0, RunTable::from_rows(&["#"]), 20, None));
    let b = Arc::new(Sample::new(Shape::new("flat"), 0, 0, RunTable::from_rows(&["##"]), 20, None));
    repo.add_sample(Arc::clone(&a), &name).expect("add a");
    repo.add_sample(Arc::clone(&b), &name).expect("add b");
    assert_eq!(repo.sheet_name(&a), Some("p"));
    assert_eq!(repo.descriptor_of(&b).map(|d| d.name()), Some("p"));
    assert_eq!(repo.sample_count(), 2);

    let again = repo.add_sample(Arc::clone(&a), &name).unwrap_err();
    assert!(matches!(again, RepositoryError::SampleAlreadyPresent(_)));
    let unknown = repo.add_sample(Arc::new(Sample::new(Shape::new("dot"), 0, 0, RunTable::from_rows(&["#"]), 20, None)), "nowhere").unwrap_err();
    assert!(matches!(unknown, RepositoryError::UnknownSheet(_)));

    repo.remove_sample(&a).expect("remove a");
    assert!(repo.sample_sheet(&a).is_none());
    assert!(matches!(repo.remove_sample(&a), Err(RepositoryError::UnknownSample(_))));

    let removed = repo.remove_sheet("p").expect("remove sheet");
    assert_eq!(removed.name(), "p");
    assert_eq!(repo.sample_count(), 0);
    assert!(repo.sheet_name(&b).is_none());
    assert_eq!(repo.registry().defunct().len(), 1);

    // The image is free again: it now creates a brand new sheet.
    assert_eq!(find(&mut repo, "p", Some(image(1))), "p");

    assert!(repo.remove_listener(id));
    assert_eq!(*events.borrow(), vec!["added", "added", "removed", "sheet-removed"]);
}
