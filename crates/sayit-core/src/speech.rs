use std::cell::OnceCell;
use std::rc::Rc;

use serde::{Serialize, Serializer};
use time::{Date, Time};

use crate::dates;

// ── Entities ──

/// Handle to an entity held by a persistence sink.
///
/// `Unsaved` handles come from dry runs: the entity exists only in memory but
/// still deduplicates by identity for the rest of the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum EntityId {
    Saved(i64),
    Unsaved(u64),
}

// ── Sections ──

/// A heading seen in the document, resolved to a real section lazily.
#[derive(Debug)]
pub struct SectionPlaceholder {
    pub title: String,
    object: OnceCell<EntityId>,
}

impl SectionPlaceholder {
    pub fn new(title: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            title: title.into(),
            object: OnceCell::new(),
        })
    }

    /// Backing entity, once resolved.
    pub fn object(&self) -> Option<EntityId> {
        self.object.get().copied()
    }

    /// Resolve with `create` on first call; later calls return the same id.
    pub fn resolve_with<E>(
        &self,
        create: impl FnOnce(&str) -> Result<EntityId, E>,
    ) -> Result<EntityId, E> {
        if let Some(id) = self.object.get() {
            return Ok(*id);
        }
        let id = create(&self.title)?;
        Ok(*self.object.get_or_init(|| id))
    }
}

// ── Speeches ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechKind {
    Speech,
    Question,
    Answer,
    Narrative,
    Scene,
    Summary,
    Other,
}

impl SpeechKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Speech => "speech",
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Narrative => "narrative",
            Self::Scene => "scene",
            Self::Summary => "summary",
            Self::Other => "other",
        }
    }
}

/// The speech being accumulated. Date, time and section are copied from the
/// parse state when the buffer is created and never follow later changes.
#[derive(Debug, Clone)]
pub struct SpeechBuffer {
    pub speaker: Option<String>,
    pub speaker_display: Option<String>,
    pub paragraphs: Vec<Vec<String>>,
    pub section: Option<Rc<SectionPlaceholder>>,
    pub date: Option<Date>,
    pub time: Option<Time>,
    pub kind: SpeechKind,
    pub line: usize,
}

impl SpeechBuffer {
    /// A speaker line with nothing after the name opens with an empty
    /// fragment; the first real text takes its place.
    fn opened_empty(&self) -> bool {
        matches!(self.paragraphs.as_slice(), [para] if para.len() == 1 && para[0].is_empty())
    }

    pub fn add_text(&mut self, text: impl Into<String>) {
        if self.opened_empty() {
            self.paragraphs[0][0] = text.into();
            return;
        }
        match self.paragraphs.last_mut() {
            Some(para) => para.push(text.into()),
            None => self.paragraphs.push(vec![text.into()]),
        }
    }

    pub fn add_para(&mut self, text: impl Into<String>) {
        if self.opened_empty() {
            self.paragraphs[0][0] = text.into();
            return;
        }
        self.paragraphs.push(vec![text.into()]);
    }

    /// Move the last fragment of the current paragraph into a paragraph of
    /// its own. No-op when the current paragraph has a single fragment.
    pub fn promote_last_fragment(&mut self) {
        let Some(para) = self.paragraphs.last_mut() else {
            return;
        };
        if para.len() < 2 {
            return;
        }
        if let Some(last) = para.pop() {
            self.paragraphs.push(vec![last]);
        }
    }

    pub fn finish(self) -> SpeechRecord {
        SpeechRecord {
            speaker: self.speaker,
            speaker_display: self.speaker_display,
            paragraphs: self.paragraphs,
            section: self.section,
            date: self.date,
            time: self.time,
            kind: self.kind,
            line: self.line,
        }
    }
}

/// A finished speech, in document order.
#[derive(Debug, Clone)]
pub struct SpeechRecord {
    pub speaker: Option<String>,
    pub speaker_display: Option<String>,
    /// Fragments per paragraph, exactly as accumulated.
    pub paragraphs: Vec<Vec<String>>,
    pub section: Option<Rc<SectionPlaceholder>>,
    pub date: Option<Date>,
    pub time: Option<Time>,
    pub kind: SpeechKind,
    /// Line the speech started on.
    pub line: usize,
}

impl SpeechRecord {
    /// Paragraph texts: each paragraph's fragments joined by one space.
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(|p| p.join(" ")).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs
            .iter()
            .all(|p| p.iter().all(|f| f.trim().is_empty()))
    }

    pub fn same_section(&self, other: &SpeechRecord) -> bool {
        match (&self.section, &other.section) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

#[derive(Serialize)]
struct RecordView<'a> {
    line: usize,
    kind: SpeechKind,
    speaker: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker_display: Option<&'a str>,
    section: Option<&'a str>,
    date: Option<String>,
    time: Option<String>,
    paragraphs: Vec<String>,
}

impl Serialize for SpeechRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecordView {
            line: self.line,
            kind: self.kind,
            speaker: self.speaker.as_deref(),
            speaker_display: self.speaker_display.as_deref(),
            section: self.section.as_deref().map(|s| s.title.as_str()),
            date: self.date.map(dates::iso_date),
            time: self.time.map(dates::clock),
            paragraphs: self.paragraph_texts(),
        }
        .serialize(serializer)
    }
}
