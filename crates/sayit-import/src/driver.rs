//! Maps speech records through a sink, one transaction per document.

use sayit_core::{EntityId, Grammar, SpeechRecord, Speeches};
use sayit_scrapers::Source;
use sayit_store::{ImportEntry, NewEntity, NewSpeech, Sink};

use crate::document::SourceDocument;
use crate::error::{ImportError, Result};

/// What happened to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    Imported { speeches: usize },
    /// Same content already imported into the same instance.
    Duplicate,
    /// Known to be unparseable for its source.
    Skipped,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub imported: Vec<(String, usize)>,
    pub duplicates: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<(String, ImportError)>,
}

impl BatchReport {
    pub fn speeches(&self) -> usize {
        self.imported.iter().map(|(_, n)| n).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Importer<'s> {
    sink: &'s mut dyn Sink,
    instance_prefix: Option<String>,
}

impl<'s> Importer<'s> {
    pub fn new(sink: &'s mut dyn Sink) -> Self {
        Self {
            sink,
            instance_prefix: None,
        }
    }

    /// Prefix every instance label, e.g. to keep test imports apart.
    pub fn with_instance_prefix(mut self, prefix: Option<String>) -> Self {
        self.instance_prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    fn instance_label(&self, grammar: &dyn Grammar) -> String {
        match &self.instance_prefix {
            Some(prefix) => format!("{prefix}{}", grammar.instance()),
            None => grammar.instance().to_string(),
        }
    }

    pub fn import_document(&mut self, source: Source, doc: &SourceDocument) -> Result<DocumentOutcome> {
        let grammar = source.grammar();
        if grammar.skip_document(&doc.meta) {
            tracing::info!(%source, doc = %doc.meta.id, "skipped, known unparseable");
            return Ok(DocumentOutcome::Skipped);
        }
        let label = self.instance_label(grammar.as_ref());
        let digest = doc.digest();
        if self.sink.already_imported(&label, &digest)? {
            tracing::info!(%source, doc = %doc.meta.id, "already imported");
            return Ok(DocumentOutcome::Duplicate);
        }

        self.sink.begin_document()?;
        let result = self.write_document(source, grammar, doc, &label, &digest);
        match result {
            Ok(speeches) => {
                self.sink.finish_document(true)?;
                tracing::info!(
                    %source,
                    doc = %doc.meta.id,
                    speeches,
                    committed = self.sink.commits(),
                    "imported"
                );
                Ok(DocumentOutcome::Imported { speeches })
            }
            Err(e) => {
                if let Err(rollback) = self.sink.finish_document(false) {
                    tracing::warn!(doc = %doc.meta.id, error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    fn write_document(
        &mut self,
        source: Source,
        grammar: Box<dyn Grammar>,
        doc: &SourceDocument,
        label: &str,
        digest: &str,
    ) -> Result<usize> {
        // Display names come from a second grammar value; the first is moved
        // into the parse.
        let names = source.grammar();
        let (instance, _) = self.sink.get_or_create(&NewEntity::Instance {
            label: label.to_string(),
        })?;
        let top_title = names
            .top_section_title(&doc.meta)
            .unwrap_or_else(|| doc.meta.id.clone());
        let (top, _) = self.sink.get_or_create(&NewEntity::Section {
            instance,
            title: top_title,
            parent: None,
        })?;

        let mut speeches = 0;
        for record in Speeches::new(grammar, doc.lines.clone(), doc.meta.clone()).records() {
            let record = record?;
            if record.is_empty() {
                tracing::debug!(line = record.line, "empty speech dropped");
                continue;
            }
            let section = self.section_for(&record, names.as_ref(), instance, top)?;
            let speaker = match &record.speaker {
                Some(name) => Some(
                    self.sink
                        .get_or_create(&NewEntity::Speaker {
                            instance,
                            name: names.prettify(name),
                        })?
                        .0,
                ),
                None => None,
            };
            self.sink.add_speech(&NewSpeech {
                instance,
                section,
                speaker,
                speaker_display: record.speaker_display.clone(),
                text: markup(&record),
                kind: record.kind.as_str(),
                start_date: record.date.or(doc.meta.date),
                start_time: record.time,
                source_line: record.line,
            })?;
            speeches += 1;
        }

        self.sink.record_import(&ImportEntry {
            instance: label.to_string(),
            document: doc.meta.id.clone(),
            digest: digest.to_string(),
            speeches,
        })?;
        Ok(speeches)
    }

    /// The record's own section, resolved on first use and hung under the
    /// document's top section, or the top section itself.
    fn section_for(
        &mut self,
        record: &SpeechRecord,
        names: &dyn Grammar,
        instance: EntityId,
        top: EntityId,
    ) -> Result<EntityId> {
        let Some(placeholder) = &record.section else {
            return Ok(top);
        };
        let sink = &mut *self.sink;
        let id = placeholder.resolve_with(|title| {
            sink.get_or_create(&NewEntity::Section {
                instance,
                title: names.prettify(title),
                parent: Some(top),
            })
            .map(|(id, _)| id)
        })?;
        Ok(id)
    }

    /// Import every document, continuing past failures.
    pub fn import_batch<I>(&mut self, source: Source, docs: I) -> BatchReport
    where
        I: IntoIterator<Item = SourceDocument>,
    {
        let mut report = BatchReport::default();
        for doc in docs {
            let id = doc.meta.id.clone();
            match self.import_document(source, &doc) {
                Ok(DocumentOutcome::Imported { speeches }) => report.imported.push((id, speeches)),
                Ok(DocumentOutcome::Duplicate) => report.duplicates.push(id),
                Ok(DocumentOutcome::Skipped) => report.skipped.push(id),
                Err(e) => {
                    tracing::warn!(%source, doc = %id, error = %e, "document failed");
                    report.failures.push((id, e));
                }
            }
        }
        report
    }
}

/// `<p>…</p>` per paragraph, newline separated.
pub fn markup(record: &SpeechRecord) -> String {
    record
        .paragraph_texts()
        .iter()
        .map(|p| format!("<p>{p}</p>"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sayit_core::{dates, DocumentMeta};
    use sayit_store::{MemorySink, SqliteSink, StoreError};

    const COUNCIL: &str = "\
          CITY OF PHILADELPHIA
\u{c}
                                                  2
 1                STATED MEETING
 2   COUNCIL PRESIDENT CLARKE: Good morning.
 3   The meeting will come to order.
 4       Will everyone please rise.
 5                (Pledge of Allegiance.)
 6   MS. JONES: Thank you.
 7                    - - -
";

    const BROKEN_COUNCIL: &str = "\
          CITY OF PHILADELPHIA
\u{c}
                                                  2
 1                STATED MEETING
 2   COUNCIL PRESIDENT CLARKE: Good morning.
 3                (Pledge of Allegiance.)
 4   MS. JONES: Thank you.
\u{c}
                                                  9
";

    const FOMC: &str = "\
Board of Governors of the Federal Reserve System
          Transcript of the Federal Open Market Committee Meeting on
                                 March 18, 2008

MR. BERNANKE. Good morning.
          March 18, 2008 - Afternoon Session
MS. DANKER. Roll call.
MR. KOHN. Thank you.
";

    fn council(id: &str, text: &str) -> SourceDocument {
        let date = dates::parse_iso_date("2014-03-27").unwrap();
        SourceDocument::from_text(DocumentMeta::new(id).with_date(date), text)
    }

    fn fomc() -> SourceDocument {
        let meta = DocumentMeta::new("FOMC20080318meeting").with_title("Meeting, March 18 2008");
        SourceDocument::from_text(meta, FOMC)
    }

    /// Counts section lookups on top of a memory sink.
    #[derive(Default)]
    struct Counting {
        inner: MemorySink,
        section_calls: usize,
    }

    impl Sink for Counting {
        fn commits(&self) -> bool {
            false
        }
        fn get_or_create(&mut self, entity: &NewEntity) -> sayit_store::Result<(EntityId, bool)> {
            if entity.kind() == "section" {
                self.section_calls += 1;
            }
            self.inner.get_or_create(entity)
        }
        fn add_speech(&mut self, speech: &NewSpeech) -> sayit_store::Result<EntityId> {
            self.inner.add_speech(speech)
        }
        fn begin_document(&mut self) -> sayit_store::Result<()> {
            self.inner.begin_document()
        }
        fn finish_document(&mut self, ok: bool) -> sayit_store::Result<()> {
            self.inner.finish_document(ok)
        }
        fn already_imported(&mut self, instance: &str, digest: &str) -> sayit_store::Result<bool> {
            self.inner.already_imported(instance, digest)
        }
        fn record_import(&mut self, entry: &ImportEntry) -> sayit_store::Result<()> {
            self.inner.record_import(entry)
        }
    }

    #[test]
    fn council_speeches_with_markup() {
        let mut sink = MemorySink::new();
        let outcome = Importer::new(&mut sink)
            .import_document(Source::Philadelphia, &council("sm032714", COUNCIL))
            .unwrap();
        assert_eq!(outcome, DocumentOutcome::Imported { speeches: 3 });

        assert_eq!(
            sink.speeches[0].text,
            "<p>Good morning. The meeting will come to order.</p>\n<p>Will everyone please rise.</p>"
        );
        assert_eq!(sink.speeches[1].kind, "narrative");
        assert!(sink.speeches[1].speaker.is_none());
        assert_eq!(sink.speeches[2].start_date, dates::parse_iso_date("2014-03-27"));

        let labels: Vec<_> = sink.entities.iter().map(|(_, e)| e.clone()).collect();
        assert!(labels.contains(&NewEntity::Instance {
            label: "philadelphia".into()
        }));
        let top = sink.entities.iter().find_map(|(_, e)| match e {
            NewEntity::Section { title, .. } => Some(title.clone()),
            _ => None,
        });
        assert_eq!(top.as_deref(), Some("Council meeting, 27 March 2014"));
        assert_eq!(sink.imports.len(), 1);
        assert_eq!(sink.imports[0].speeches, 3);
    }

    #[test]
    fn placeholder_resolved_once_per_document() {
        let mut sink = Counting::default();
        let outcome = Importer::new(&mut sink)
            .import_document(Source::FederalReserve, &fomc())
            .unwrap();
        assert_eq!(outcome, DocumentOutcome::Imported { speeches: 3 });
        // Top section plus the afternoon session, shared by two speeches.
        assert_eq!(sink.section_calls, 2);

        let speeches = &sink.inner.speeches;
        assert_eq!(speeches[1].section, speeches[2].section);
        assert_ne!(speeches[0].section, speeches[1].section);
        let afternoon = sink.inner.entity(speeches[1].section).unwrap();
        assert!(matches!(
            afternoon,
            NewEntity::Section { parent: Some(p), .. } if *p == speeches[0].section
        ));
    }

    #[test]
    fn dry_run_is_repeatable() {
        let run = || {
            let mut sink = MemorySink::new();
            Importer::new(&mut sink)
                .import_document(Source::FederalReserve, &fomc())
                .unwrap();
            sink.speeches
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn failed_document_rolled_back_and_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = SqliteSink::open_or_create(&dir.path().join("sayit.db"), true).unwrap();
        let report = Importer::new(&mut sink).import_batch(
            Source::Philadelphia,
            vec![
                council("sm-broken", BROKEN_COUNCIL),
                council("sm032714", COUNCIL),
            ],
        );

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "sm-broken");
        assert!(matches!(report.failures[0].1, ImportError::Parse(_)));
        assert_eq!(report.imported, vec![("sm032714".to_string(), 3)]);
        assert!(!report.is_clean());

        assert_eq!(sink.speech_count().unwrap(), 3);
        let imports = sink.imports().unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].document, "sm032714");
    }

    #[test]
    fn duplicate_import_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = SqliteSink::open_or_create(&dir.path().join("sayit.db"), true).unwrap();
        let docs = || vec![council("sm032714", COUNCIL)];

        let first = Importer::new(&mut sink).import_batch(Source::Philadelphia, docs());
        assert_eq!(first.speeches(), 3);
        let second = Importer::new(&mut sink).import_batch(Source::Philadelphia, docs());
        assert_eq!(second.duplicates, vec!["sm032714".to_string()]);
        assert_eq!(sink.speech_count().unwrap(), 3);

        // A different prefix is a different instance.
        let third = Importer::new(&mut sink)
            .with_instance_prefix(Some("test-".into()))
            .import_batch(Source::Philadelphia, docs());
        assert_eq!(third.speeches(), 3);
    }

    #[test]
    fn dry_run_sqlite_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = SqliteSink::open_or_create(&dir.path().join("sayit.db"), false).unwrap();
        let report = Importer::new(&mut sink)
            .import_batch(Source::Philadelphia, vec![council("sm032714", COUNCIL)]);
        assert_eq!(report.speeches(), 3);
        assert_eq!(sink.speech_count().unwrap(), 0);
        assert!(sink.imports().unwrap().is_empty());
    }

    #[test]
    fn known_bad_document_skipped() {
        let mut sink = MemorySink::new();
        let doc = SourceDocument::from_text(DocumentMeta::new("2011-11-21pm"), "anything");
        let outcome = Importer::new(&mut sink)
            .import_document(Source::Leveson, &doc)
            .unwrap();
        assert_eq!(outcome, DocumentOutcome::Skipped);
        assert!(sink.entities.is_empty());
    }

    #[test]
    fn store_errors_surface() {
        let err: ImportError = StoreError::NoTransaction.into();
        assert!(err.to_string().starts_with("store:"));
    }
}
