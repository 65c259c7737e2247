//! SQLite-backed sink.
//!
//! One `sayit.db` file in WAL mode holding instances, sections, speakers,
//! speeches and the import log. Each document is written inside its own
//! transaction. Opened with `commit = false` the sink still reads existing
//! rows, so saved entities are found, but everything new is kept in memory
//! under unsaved ids and nothing is written.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use sayit_core::{dates, EntityId};

use crate::error::{Result, StoreError};
use crate::sink::{ImportEntry, NewEntity, NewSpeech, Sink};

const SCHEMA_SQL: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS instances (
    id INTEGER PRIMARY KEY,
    label TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS sections (
    id INTEGER PRIMARY KEY,
    instance_id INTEGER NOT NULL REFERENCES instances(id),
    parent_id INTEGER REFERENCES sections(id),
    title TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sections_lookup ON sections(instance_id, title);

CREATE TABLE IF NOT EXISTS speakers (
    id INTEGER PRIMARY KEY,
    instance_id INTEGER NOT NULL REFERENCES instances(id),
    name TEXT NOT NULL,
    UNIQUE(instance_id, name)
);

CREATE TABLE IF NOT EXISTS speeches (
    id INTEGER PRIMARY KEY,
    instance_id INTEGER NOT NULL REFERENCES instances(id),
    section_id INTEGER NOT NULL REFERENCES sections(id),
    speaker_id INTEGER REFERENCES speakers(id),
    speaker_display TEXT,
    kind TEXT NOT NULL,
    text TEXT NOT NULL,
    start_date TEXT,
    start_time TEXT,
    source_line INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_speeches_section ON speeches(section_id);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    instance TEXT NOT NULL,
    document TEXT NOT NULL,
    digest TEXT NOT NULL,
    speeches INTEGER NOT NULL,
    imported_at TEXT NOT NULL,
    UNIQUE(instance, digest)
);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// A row of the import log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub instance: String,
    pub document: String,
    pub digest: String,
    pub speeches: usize,
    pub imported_at: String,
}

pub struct SqliteSink {
    conn: Connection,
    commit: bool,
    in_document: bool,
    /// Entities a dry run pretended to create.
    unsaved: HashMap<NewEntity, EntityId>,
    /// Keys added to `unsaved` by the open document.
    pending: Vec<NewEntity>,
    /// Imports a dry run pretended to record.
    dry_imports: Vec<(String, String)>,
    next_unsaved: u64,
}

impl SqliteSink {
    /// Open an existing database.
    pub fn open(db_path: &Path, commit: bool) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let sink = Self::with_connection(conn, commit);
        sink.apply_pragmas()?;
        Ok(sink)
    }

    /// Open or create the database with the full schema.
    pub fn open_or_create(db_path: &Path, commit: bool) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        let sink = Self::with_connection(conn, commit);
        sink.apply_pragmas()?;
        sink.apply_schema()?;
        Ok(sink)
    }

    fn with_connection(conn: Connection, commit: bool) -> Self {
        Self {
            conn,
            commit,
            in_document: false,
            unsaved: HashMap::new(),
            pending: Vec::new(),
            dry_imports: Vec::new(),
            next_unsaved: 0,
        }
    }

    fn apply_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    fn apply_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('version', '1')",
            [],
        )?;
        Ok(())
    }

    /// Import log, oldest first.
    pub fn imports(&self) -> Result<Vec<ImportRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT instance, document, digest, speeches, imported_at
             FROM imports ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ImportRow {
                    instance: row.get(0)?,
                    document: row.get(1)?,
                    digest: row.get(2)?,
                    speeches: row.get::<_, i64>(3)? as usize,
                    imported_at: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn speech_count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM speeches", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    // ── Lookups ──

    fn find(&self, entity: &NewEntity) -> Result<Option<i64>> {
        let id = match entity {
            NewEntity::Instance { label } => self
                .conn
                .query_row(
                    "SELECT id FROM instances WHERE label = ?1",
                    params![label],
                    |row| row.get(0),
                )
                .optional()?,
            NewEntity::Section {
                instance,
                title,
                parent,
            } => {
                let (Some(instance), Some(parent)) = (saved(*instance), saved_opt(*parent)) else {
                    return Ok(None);
                };
                self.conn
                    .query_row(
                        "SELECT id FROM sections
                         WHERE instance_id = ?1 AND title = ?2 AND parent_id IS ?3
                         ORDER BY id LIMIT 1",
                        params![instance, title, parent],
                        |row| row.get(0),
                    )
                    .optional()?
            }
            NewEntity::Speaker { instance, name } => {
                let Some(instance) = saved(*instance) else {
                    return Ok(None);
                };
                self.conn
                    .query_row(
                        "SELECT id FROM speakers WHERE instance_id = ?1 AND name = ?2",
                        params![instance, name],
                        |row| row.get(0),
                    )
                    .optional()?
            }
        };
        Ok(id)
    }

    fn insert(&self, entity: &NewEntity) -> Result<i64> {
        match entity {
            NewEntity::Instance { label } => {
                self.conn
                    .execute("INSERT INTO instances (label) VALUES (?1)", params![label])?;
            }
            NewEntity::Section {
                instance,
                title,
                parent,
            } => {
                let instance = require(*instance, "section instance")?;
                let parent = match parent {
                    Some(p) => Some(require(*p, "section parent")?),
                    None => None,
                };
                self.conn.execute(
                    "INSERT INTO sections (instance_id, parent_id, title) VALUES (?1, ?2, ?3)",
                    params![instance, parent, title],
                )?;
            }
            NewEntity::Speaker { instance, name } => {
                let instance = require(*instance, "speaker instance")?;
                self.conn.execute(
                    "INSERT INTO speakers (instance_id, name) VALUES (?1, ?2)",
                    params![instance, name],
                )?;
            }
        }
        Ok(self.conn.last_insert_rowid())
    }

    fn allocate(&mut self) -> EntityId {
        self.next_unsaved += 1;
        EntityId::Unsaved(self.next_unsaved)
    }
}

fn saved(id: EntityId) -> Option<i64> {
    match id {
        EntityId::Saved(n) => Some(n),
        EntityId::Unsaved(_) => None,
    }
}

/// `Some(None)` for no parent, `None` when the parent only exists in memory.
fn saved_opt(id: Option<EntityId>) -> Option<Option<i64>> {
    match id {
        None => Some(None),
        Some(id) => saved(id).map(Some),
    }
}

fn require(id: EntityId, what: &'static str) -> Result<i64> {
    saved(id).ok_or(StoreError::UnsavedReference(what))
}

impl Sink for SqliteSink {
    fn commits(&self) -> bool {
        self.commit
    }

    fn get_or_create(&mut self, entity: &NewEntity) -> Result<(EntityId, bool)> {
        if let Some(id) = self.unsaved.get(entity) {
            return Ok((*id, false));
        }
        if let Some(id) = self.find(entity)? {
            return Ok((EntityId::Saved(id), false));
        }
        if self.commit {
            let id = self.insert(entity)?;
            tracing::debug!(kind = entity.kind(), id, "created");
            return Ok((EntityId::Saved(id), true));
        }
        let id = self.allocate();
        self.unsaved.insert(entity.clone(), id);
        self.pending.push(entity.clone());
        Ok((id, true))
    }

    fn add_speech(&mut self, speech: &NewSpeech) -> Result<EntityId> {
        if !self.commit {
            return Ok(self.allocate());
        }
        let speaker = match speech.speaker {
            Some(id) => Some(require(id, "speech speaker")?),
            None => None,
        };
        self.conn.execute(
            "INSERT INTO speeches
             (instance_id, section_id, speaker_id, speaker_display, kind, text,
              start_date, start_time, source_line)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                require(speech.instance, "speech instance")?,
                require(speech.section, "speech section")?,
                speaker,
                speech.speaker_display,
                speech.kind,
                speech.text,
                speech.start_date.map(dates::iso_date),
                speech.start_time.map(dates::clock),
                speech.source_line as i64,
            ],
        )?;
        Ok(EntityId::Saved(self.conn.last_insert_rowid()))
    }

    fn begin_document(&mut self) -> Result<()> {
        if self.commit {
            self.conn.execute_batch("BEGIN")?;
        }
        self.pending.clear();
        self.in_document = true;
        Ok(())
    }

    fn finish_document(&mut self, ok: bool) -> Result<()> {
        if !self.in_document {
            return Err(StoreError::NoTransaction);
        }
        self.in_document = false;
        if self.commit {
            self.conn
                .execute_batch(if ok { "COMMIT" } else { "ROLLBACK" })?;
        } else if !ok {
            for entity in self.pending.drain(..) {
                self.unsaved.remove(&entity);
            }
        }
        self.pending.clear();
        Ok(())
    }

    fn already_imported(&mut self, instance: &str, digest: &str) -> Result<bool> {
        if self
            .dry_imports
            .iter()
            .any(|(i, d)| i == instance && d == digest)
        {
            return Ok(true);
        }
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM imports WHERE instance = ?1 AND digest = ?2",
                params![instance, digest],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn record_import(&mut self, entry: &ImportEntry) -> Result<()> {
        if !self.commit {
            self.dry_imports
                .push((entry.instance.clone(), entry.digest.clone()));
            return Ok(());
        }
        let now = OffsetDateTime::now_utc().format(&Rfc3339)?;
        self.conn.execute(
            "INSERT INTO imports (instance, document, digest, speeches, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.instance,
                entry.document,
                entry.digest,
                entry.speeches as i64,
                now
            ],
        )?;
        Ok(())
    }
}

impl Drop for SqliteSink {
    fn drop(&mut self) {
        if self.commit && self.in_document {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
        let _ = self
            .conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);");
    }
}
