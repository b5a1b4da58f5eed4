use rusqlite::Connection;
use samplebank_core::model::RunTable;
use samplebank_core::store::{
    decode_raster, encode_raster, ArchiveDb, ArchiveError, ManifestRecord, CURRENT_SCHEMA_VERSION,
};
use tempfile::tempdir;

fn manifest(sheet: &str, has_image: bool) -> ManifestRecord {
    ManifestRecord {
        sheet: sheet.to_string(),
        has_samples: true,
        has_tribes: false,
        has_image,
        stored_at: "2026-01-01T00:00:00+00:00".to_string(),
    }
}

#[test]
fn fresh_archive_is_migrated_to_current_schema() {
    let tmp = tempdir().expect("temp dir");
    let path = tmp.path().join("samples.db");
    let db = ArchiveDb::open(&path).expect("open archive");

    let version: i32 = db
        .connection()
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("read user_version");
    assert_eq!(version, CURRENT_SCHEMA_VERSION);

    // Reopening an up-to-date archive is a no-op.
    drop(db);
    ArchiveDb::open(&path).expect("reopen archive");
}

#[test]
fn entries_are_replaced_listed_and_deleted() {
    let tmp = tempdir().expect("temp dir");
    let db = ArchiveDb::open(&tmp.path().join("samples.db")).expect("open archive");

    db.put_entry("b", "samples.json", b"one").expect("put");
    db.put_entry("b", "samples.json", b"two").expect("replace");
    db.put_entry("a", "samples.json", b"three").expect("put");
    db.put_entry("a", "tribes.json", b"four").expect("put");

    assert_eq!(db.entry("b", "samples.json").expect("read"), Some(b"two".to_vec()));
    assert_eq!(db.entry("c", "samples.json").expect("read"), None);
    assert!(db.has_entry("a", "tribes.json").expect("has entry"));
    assert_eq!(db.folders_with("samples.json").expect("list"), vec!["a", "b"]);

    assert!(db.delete_entry("b", "samples.json").expect("delete"));
    assert!(!db.delete_entry("b", "samples.json").expect("delete again"));
    assert_eq!(db.delete_folder("a").expect("delete folder"), 2);
    assert!(db.folders_with("samples.json").expect("list").is_empty());
}

#[test]
fn manifest_keeps_has_image_once_declared() {
    let tmp = tempdir().expect("temp dir");
    let db = ArchiveDb::open(&tmp.path().join("samples.db")).expect("open archive");

    db.upsert_manifest(&manifest("p1", true)).expect("upsert");
    db.upsert_manifest(&manifest("p1", false)).expect("upsert again");
    db.upsert_manifest(&manifest("p0", false)).expect("upsert");

    let rows = db.manifest().expect("manifest");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].sheet, "p0", "manifest is ordered by sheet");
    let p1 = db.manifest_entry("p1").expect("read").expect("p1 row");
    assert!(p1.has_image, "has_image must be sticky");

    assert!(db.delete_manifest("p1").expect("delete"));
    assert!(db.manifest_entry("p1").expect("read").is_none());
}

#[test]
fn rolled_back_transaction_leaves_no_entries() {
    let tmp = tempdir().expect("temp dir");
    let db = ArchiveDb::open(&tmp.path().join("samples.db")).expect("open archive");

    {
        let _tx = db.begin().expect("begin");
        db.put_entry("p1", "samples.json", b"[]").expect("put");
        // Dropped without commit.
    }
    assert!(!db.has_entry("p1", "samples.json").expect("has entry"));
}

#[test]
fn raster_entries_round_trip_through_bincode() {
    let image = RunTable::from_rows(&["#..#", ".##.", "####"]);
    let body = encode_raster(&image).expect("encode");
    assert_eq!(decode_raster(&body).expect("decode"), image);
    assert!(matches!(decode_raster(&body[..2]), Err(ArchiveError::Raster(_))));
}

#[test]
fn open_errors_on_unsupported_schema_version() {
    let tmp = tempdir().expect("temp dir");
    let path = tmp.path().join("images.db");
    {
        let conn = Connection::open(&path).expect("open raw sqlite db");
        conn.pragma_update(None, "user_version", 99_i32).expect("set user_version pragma");
    }

    match ArchiveDb::open(&path) {
        Err(ArchiveError::UnsupportedSchemaVersion { found, min_supported, max_supported }) => {
            assert_eq!(found, 99);
            assert_eq!(min_supported, 0);
            assert_eq!(max_supported, CURRENT_SCHEMA_VERSION);
        }
        Err(err) => panic!("expected UnsupportedSchemaVersion, got {err}"),
        Ok(_) => panic!("expected UnsupportedSchemaVersion, got Ok(_)"),
    }
}
