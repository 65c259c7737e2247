//! The persistence seam between the import driver and a database.

use time::{Date, Time};

use sayit_core::EntityId;

use crate::error::Result;

/// Identity attributes of an entity the driver wants to exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NewEntity {
    Instance {
        label: String,
    },
    Section {
        instance: EntityId,
        title: String,
        parent: Option<EntityId>,
    },
    Speaker {
        instance: EntityId,
        name: String,
    },
}

impl NewEntity {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Instance { .. } => "instance",
            Self::Section { .. } => "section",
            Self::Speaker { .. } => "speaker",
        }
    }
}

/// One speech ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpeech {
    pub instance: EntityId,
    pub section: EntityId,
    pub speaker: Option<EntityId>,
    pub speaker_display: Option<String>,
    /// Paragraph markup.
    pub text: String,
    pub kind: &'static str,
    pub start_date: Option<Date>,
    pub start_time: Option<Time>,
    /// Line of the source document the speech started on.
    pub source_line: usize,
}

/// A document that has been imported, keyed by a digest of its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub instance: String,
    pub document: String,
    pub digest: String,
    pub speeches: usize,
}

/// Where parsed speeches go.
///
/// Speeches and entities created between [`Sink::begin_document`] and
/// [`Sink::finish_document`] are kept or discarded together. A sink that
/// does not commit hands out [`EntityId::Unsaved`] ids, remembering them so
/// the same attributes keep resolving to the same id.
pub trait Sink {
    /// Whether anything is actually written.
    fn commits(&self) -> bool;

    /// Find the entity with these attributes or create it. The flag is true
    /// when it was created by this call.
    fn get_or_create(&mut self, entity: &NewEntity) -> Result<(EntityId, bool)>;

    fn add_speech(&mut self, speech: &NewSpeech) -> Result<EntityId>;

    fn begin_document(&mut self) -> Result<()>;

    /// Keep the document's writes when `ok`, discard them otherwise.
    fn finish_document(&mut self, ok: bool) -> Result<()>;

    /// Whether a document with this digest was already imported.
    fn already_imported(&mut self, instance: &str, digest: &str) -> Result<bool>;

    fn record_import(&mut self, entry: &ImportEntry) -> Result<()>;
}
