use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use thiserror::Error;

use crate::store::ManifestRecord;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh archive).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The archive was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// A JSON entry could not be encoded or decoded.
    #[error("JSON entry error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A raster entry could not be encoded or decoded.
    #[error("Raster entry error: {0}")]
    Raster(#[from] bincode::Error),
}

/// Convenience result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// SQLite-backed archive: a directory tree of `folder/file` entries packed in one file.
///
/// Both the metadata archive and the image archive use this type. It is responsible for:
/// - Opening/creating the archive file.
/// - Applying schema migrations.
/// - Reading, writing and deleting entries, and maintaining the sheet manifest.
#[derive(Debug)]
pub struct ArchiveDb {
    conn: Connection,
}

impl ArchiveDb {
    /// Open (or create) an archive at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Start a transaction; every helper called before `commit` belongs to it.
    pub fn begin(&self) -> ArchiveResult<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Insert or replace the entry `folder/file`.
    pub fn put_entry(&self, folder: &str, file: &str, body: &[u8]) -> ArchiveResult<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO entries (folder, file, body)
            VALUES (?1, ?2, ?3)
            "#,
            params![folder, file, body],
        )?;
        Ok(())
    }

    /// Read the entry `folder/file`, if present.
    pub fn entry(&self, folder: &str, file: &str) -> ArchiveResult<Option<Vec<u8>>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM entries WHERE folder = ?1 AND file = ?2",
                params![folder, file],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(body)
    }

    pub fn has_entry(&self, folder: &str, file: &str) -> ArchiveResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE folder = ?1 AND file = ?2",
            params![folder, file],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List folders holding a `file` entry (ordered by folder).
    pub fn folders_with(&self, file: &str) -> ArchiveResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT folder FROM entries
            WHERE file = ?1
            ORDER BY folder
            "#,
        )?;
        let rows = stmt.query_map(params![file], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Delete one entry; returns whether it existed.
    pub fn delete_entry(&self, folder: &str, file: &str) -> ArchiveResult<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM entries WHERE folder = ?1 AND file = ?2", params![folder, file])?;
        Ok(affected > 0)
    }

    /// Delete a whole folder; returns the number of entries removed.
    pub fn delete_folder(&self, folder: &str) -> ArchiveResult<usize> {
        let affected = self.conn.execute("DELETE FROM entries WHERE folder = ?1", params![folder])?;
        Ok(affected)
    }

    /// Insert or refresh the manifest row of a sheet.
    ///
    /// `has_image` is sticky: once an image was stored it stays declared.
    pub fn upsert_manifest(&self, record: &ManifestRecord) -> ArchiveResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO manifest (sheet, has_samples, has_tribes, has_image, stored_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(sheet) DO UPDATE SET
                has_samples = excluded.has_samples,
                has_tribes  = excluded.has_tribes,
                has_image   = MAX(manifest.has_image, excluded.has_image),
                stored_at   = excluded.stored_at
            "#,
            params![
                record.sheet,
                record.has_samples,
                record.has_tribes,
                record.has_image,
                record.stored_at
            ],
        )?;
        Ok(())
    }

    /// List the manifest (ordered by sheet name).
    pub fn manifest(&self) -> ArchiveResult<Vec<ManifestRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT sheet, has_samples, has_tribes, has_image, stored_at
            FROM manifest
            ORDER BY sheet
            "#,
        )?;
        let rows = stmt.query_map([], map_manifest)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn manifest_entry(&self, sheet: &str) -> ArchiveResult<Option<ManifestRecord>> {
        let record = self
            .conn
            .query_row(
                r#"
                SELECT sheet, has_samples, has_tribes, has_image, stored_at
                FROM manifest
                WHERE sheet = ?1
                "#,
                params![sheet],
                map_manifest,
            )
            .optional()?;
        Ok(record)
    }

    pub fn delete_manifest(&self, sheet: &str) -> ArchiveResult<bool> {
        let affected = self.conn.execute("DELETE FROM manifest WHERE sheet = ?1", params![sheet])?;
        Ok(affected > 0)
    }
}

fn map_manifest(row: &rusqlite::Row<'_>) -> rusqlite::Result<ManifestRecord> {
    Ok(ManifestRecord {
        sheet: row.get(0)?,
        has_samples: row.get(1)?,
        has_tribes: row.get(2)?,
        has_image: row.get(3)?,
        stored_at: row.get(4)?,
    })
}

/// Apply schema migrations to bring the archive to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: entries table (folder/file/body)
/// - 2: manifest table listing sheets and their stored artifacts
fn apply_migrations(conn: &Connection) -> ArchiveResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject archives created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(ArchiveError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS entries (
                folder TEXT NOT NULL,
                file   TEXT NOT NULL,
                body   BLOB NOT NULL,
                PRIMARY KEY(folder, file)
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS manifest (
                sheet       TEXT PRIMARY KEY,
                has_samples INTEGER NOT NULL DEFAULT 0,
                has_tribes  INTEGER NOT NULL DEFAULT 0,
                has_image   INTEGER NOT NULL DEFAULT 0,
                stored_at   TEXT NOT NULL
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> ArchiveResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
