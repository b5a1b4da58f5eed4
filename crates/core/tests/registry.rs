use samplebank_core::registry::{Descriptor, RegistryError, SheetRegistry, MAX_UNIQUE_SUFFIX};

#[test]
fn descriptors_are_bucketed_by_hash_and_found_by_alias() {
    let mut registry = SheetRegistry::new();
    registry
        .add_descriptor(Descriptor::new("page-1", Some("abc".into())))
        .expect("add page-1");
    registry
        .add_descriptor(Descriptor::new("page-2", Some("abc".into())))
        .expect("add page-2");
    registry.add_descriptor(Descriptor::new("loose", None)).expect("add loose");
    assert!(registry.is_modified());

    assert_eq!(registry.descriptors("abc").len(), 2);
    assert!(registry.descriptors("zzz").is_empty());
    assert_eq!(registry.descriptor_count(), 3);

    assert!(registry.add_alias("page-1", "Book/page-1").expect("alias"));
    assert_eq!(registry.descriptor("book/PAGE-1").map(Descriptor::name), Some("page-1"));
    assert!(registry.descriptor("nothing").is_none());

    let names: Vec<&str> = registry.all_descriptors().into_iter().map(Descriptor::name).collect();
    assert_eq!(names, vec!["loose", "page-1", "page-2"]);
}

#[test]
fn duplicate_names_are_rejected() {
    let mut registry = SheetRegistry::new();
    registry.add_descriptor(Descriptor::new("foo", None)).expect("add");
    let err = registry.add_descriptor(Descriptor::new("FOO", None)).unwrap_err();
    assert_eq!(err, RegistryError::DuplicateName("FOO".into()));
}

#[test]
fn forge_unique_tries_numbered_suffixes() {
    let mut registry = SheetRegistry::new();
    assert_eq!(registry.forge_unique("foo").expect("free"), "foo");

    registry.add_descriptor(Descriptor::new("foo", None)).expect("add foo");
    assert_eq!(registry.forge_unique("foo").expect("forge"), "foo_01");

    registry.add_descriptor(Descriptor::new("foo_01", None)).expect("add foo_01");
    assert_eq!(registry.forge_unique("foo").expect("forge"), "foo_02");
    assert_eq!(registry.forge_unique("foo_01").expect("forge"), "foo_02");
}

#[test]
fn forge_unique_fails_when_every_slot_is_taken() {
    let mut registry = SheetRegistry::new();
    registry.add_descriptor(Descriptor::new("full", None)).expect("add");
    for i in 1..=MAX_UNIQUE_SUFFIX {
        registry.add_descriptor(Descriptor::new(format!("full_{i:02}"), None)).expect("add");
    }
    let err = registry.forge_unique("full").unwrap_err();
    assert_eq!(err, RegistryError::NameExhausted { radix: "full".into() });
}

#[test]
fn alias_owned_by_another_descriptor_is_not_added() {
    let mut registry = SheetRegistry::new();
    registry.add_descriptor(Descriptor::new("a", None)).expect("add a");
    registry.add_descriptor(Descriptor::new("b", None)).expect("add b");
    registry.set_modified(false);

    assert!(!registry.add_alias("b", "a").expect("alias"));
    assert!(!registry.add_alias("a", "a").expect("alias"));
    assert!(!registry.is_modified());
    assert!(registry.descriptor_by_name("b").expect("b").aliases().is_empty());

    let err = registry.add_alias("nobody", "x").unwrap_err();
    assert_eq!(err, RegistryError::UnknownDescriptor("nobody".into()));
}

#[test]
fn removed_descriptors_stay_pending_until_taken() {
    let mut registry = SheetRegistry::from_descriptors(vec![
        Descriptor::new("one", Some("h1".into())),
        Descriptor::new("two", Some("h1".into())).with_aliases(["deux"]),
        Descriptor::new("one", None),
    ]);
    assert!(!registry.is_modified(), "rebuilt registry starts clean");
    assert_eq!(registry.descriptor_count(), 2, "duplicated name dropped");

    let removed = registry.remove_descriptor("two").expect("remove");
    assert_eq!(removed.aliases_string().as_deref(), Some("deux"));
    assert!(registry.descriptor("deux").is_none());
    assert_eq!(registry.descriptors("h1").len(), 1);
    assert!(registry.is_modified());
    assert_eq!(registry.defunct().len(), 1);

    let taken = registry.take_defunct();
    assert_eq!(taken[0].name(), "two");
    assert!(registry.defunct().is_empty());

    assert!(matches!(
        registry.remove_descriptor("two"),
        Err(RegistryError::UnknownDescriptor(_))
    ));
}
