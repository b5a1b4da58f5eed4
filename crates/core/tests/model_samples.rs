use std::sync::Arc;

use samplebank_core::model::{Glyph, Orientation, Run, RunTable, Sample, Shape, Tribe};

fn dot() -> RunTable {
    RunTable::from_rows(&[".##.", "####", ".##."])
}

#[test]
fn run_table_from_rows_counts_foreground() {
    let table = dot();
    assert_eq!(table.orientation(), Orientation::Horizontal);
    assert_eq!(table.width(), 4);
    assert_eq!(table.height(), 3);
    assert_eq!(table.sequences()[0], vec![Run::new(1, 2)]);
    assert_eq!(table.weight(), 8);
}

#[test]
fn persistent_hash_is_stable_and_content_based() {
    let a = dot();
    let b = RunTable::new(
        Orientation::Horizontal,
        4,
        3,
        vec![vec![Run::new(1, 2)], vec![Run::new(0, 4)], vec![Run::new(1, 2)]],
    );
    assert_eq!(a, b);
    assert_eq!(a.persistent_hash(), b.persistent_hash());
    assert_eq!(a.persistent_hash().len(), 64);

    let other = RunTable::from_rows(&["##", "##"]);
    assert_ne!(a.persistent_hash(), other.persistent_hash());
}

#[test]
fn samples_compare_by_instance_and_by_content() {
    let a = Sample::new(Shape::new("dot"), 3, 4, dot(), 20, Some(-1.0));
    let b = Sample::new(Shape::new("dot"), 30, 40, dot(), 20, None);
    let c = Sample::new(Shape::new("staccato"), 3, 4, dot(), 20, None);
    let d = Sample::new(Shape::new("dot"), 3, 4, dot(), 16, None);

    assert!(a.same_instance(&a));
    assert!(!a.same_instance(&b));
    assert_ne!(a.id(), b.id());

    assert!(a.same_content(&b), "location and pitch are not content");
    assert!(!a.same_content(&c));
    assert!(a.same_pixels(&c));
    assert!(!a.same_pixels(&d), "interline is part of the pixels identity");
}

#[test]
fn sample_from_glyph_keeps_position() {
    let glyph = Glyph::new(12, 34, dot());
    let sample = Sample::from_glyph(Shape::new("dot"), &glyph, 18, Some(2.0));
    assert_eq!(sample.left(), 12);
    assert_eq!(sample.top(), 34);
    assert_eq!(sample.interline(), 18);
    assert_eq!(sample.pitch(), Some(2.0));
    assert!(!sample.is_symbol());
    assert_eq!(sample.weight(), 8);
}

#[test]
fn deserialized_samples_are_new_instances() {
    let sample = Sample::new(Shape::new("dot"), 1, 2, dot(), 20, None);
    let json = serde_json::to_string(&sample).expect("serialize");
    let back: Sample = serde_json::from_str(&json).expect("deserialize");
    assert!(back.same_content(&sample));
    assert!(!back.same_instance(&sample));
    assert!(!back.is_symbol());
}

#[test]
fn tribe_entries_behave_as_content_sets() {
    let head = Arc::new(Sample::new(Shape::new("dot"), 0, 0, dot(), 20, None));
    let mut tribe = Tribe::new(Arc::clone(&head));
    assert!(!tribe.is_modified());

    let good = Arc::new(Sample::new(Shape::new("dot"), 0, 0, RunTable::from_rows(&["###"]), 20, None));
    let twin = Arc::new(Sample::new(Shape::new("dot"), 5, 5, RunTable::from_rows(&["###"]), 20, None));
    assert!(tribe.add_good(Arc::clone(&good)));
    assert!(!tribe.add_good(twin), "same content is not added twice");
    assert!(!tribe.add_member(Arc::clone(&head)), "head is never a member");
    assert_eq!(tribe.goods().len(), 1);
    assert!(tribe.is_modified());

    let copy = Sample::new(Shape::new("dot"), 9, 9, dot(), 20, None);
    assert!(tribe.is_headed_by(&copy));
    let other_shape = Sample::new(Shape::new("staccato"), 0, 0, dot(), 20, None);
    assert!(!tribe.is_headed_by(&other_shape));
}
