//! The per-source grammar seam and the lazy speech iterator.

use std::iter::FusedIterator;

use time::Date;

use crate::accumulator::{Accumulator, Step};
use crate::error::{ErrorKind, ParseError, Result};
use crate::event::LineEvent;
use crate::line::{self, Line};
use crate::names::{self, NameTable};
use crate::patch::{DocumentPatches, Patch};
use crate::rule::Cursor;
use crate::speech::SpeechRecord;
use crate::state::{ParseState, ScanMode};

/// What the caller knows about a document before parsing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    /// Stable identifier: a hearing date, date plus session, or URL fragment.
    /// Patch keys are matched against it.
    pub id: String,
    pub date: Option<Date>,
    pub title: Option<String>,
}

impl DocumentMeta {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// One source's transcript layout.
///
/// A grammar value is created fresh for each document and may keep
/// document-local layout state of its own (title page row, detected indent)
/// alongside the shared [`ParseState`].
pub trait Grammar {
    /// Short source name used on the command line.
    fn name(&self) -> &'static str;

    /// SayIt instance the speeches belong to.
    fn instance(&self) -> &'static str;

    /// Classify one line. Must return an event for every line; the table's
    /// last rule is a catch-all.
    fn classify(&mut self, cursor: &mut Cursor<'_>, state: &mut ParseState) -> Result<LineEvent>;

    fn patches(&self) -> &'static [Patch] {
        &[]
    }

    fn corrections(&self) -> NameTable {
        NameTable::empty()
    }

    /// Canonical form of a printed speaker name.
    fn fix_name(&self, name: &str) -> String {
        names::normalize_name(name, &self.corrections())
    }

    /// Display form of a speaker or section title when it is persisted.
    fn prettify(&self, name: &str) -> String {
        name.to_string()
    }

    /// Documents known to be unparseable.
    fn skip_document(&self, _doc: &DocumentMeta) -> bool {
        false
    }

    /// Title of the section every speech of the document sits under.
    fn top_section_title(&self, doc: &DocumentMeta) -> Option<String> {
        doc.title.clone()
    }

    /// Rearrange lines before the scan (layout reconstruction). Runs after
    /// patches are applied.
    fn prepare(&mut self, lines: Vec<Line>, _doc: &DocumentMeta) -> Result<Vec<Line>> {
        Ok(lines)
    }

    fn begin(&mut self, _doc: &DocumentMeta, _state: &mut ParseState) -> Result<()> {
        Ok(())
    }

    /// Called once after the last line.
    fn finish(&mut self, _state: &mut ParseState) -> Result<()> {
        Ok(())
    }
}

/// Lazily parse one document into speech records.
///
/// Yields `Ok(None)` at a boundary with no speech in progress; use
/// [`Speeches::records`] to drop those. Fused after the first error.
pub struct Speeches {
    grammar: Box<dyn Grammar>,
    doc: DocumentMeta,
    pending: Option<Vec<Line>>,
    lines: Vec<Line>,
    pos: usize,
    state: ParseState,
    acc: Accumulator,
    done: bool,
}

impl Speeches {
    pub fn new(grammar: Box<dyn Grammar>, lines: Vec<Line>, doc: DocumentMeta) -> Self {
        Self {
            grammar,
            doc,
            pending: Some(lines),
            lines: Vec::new(),
            pos: 0,
            state: ParseState::new(),
            acc: Accumulator::new(),
            done: false,
        }
    }

    pub fn from_text(grammar: Box<dyn Grammar>, text: &str, doc: DocumentMeta) -> Self {
        Self::new(grammar, line::split_document(text), doc)
    }

    /// Start from a prepared state instead of a fresh one.
    pub fn with_state(mut self, state: ParseState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    pub fn grammar(&self) -> &dyn Grammar {
        self.grammar.as_ref()
    }

    pub fn records(self) -> impl Iterator<Item = Result<SpeechRecord>> {
        self.filter_map(Result::transpose)
    }

    fn start(&mut self, lines: Vec<Line>) -> Result<()> {
        let patches = DocumentPatches::select(self.grammar.patches(), &self.doc.id)
            .map_err(|e| ParseError::new(0, ErrorKind::Layout(e.to_string())))?;
        patches.seed(&mut self.state);
        let lines = patches.apply(lines);
        self.lines = self.grammar.prepare(lines, &self.doc)?;
        if self.state.current_date.is_none() {
            self.state.current_date = self.doc.date;
        }
        self.grammar.begin(&self.doc, &mut self.state)?;
        tracing::debug!(
            source = self.grammar.name(),
            doc = %self.doc.id,
            lines = self.lines.len(),
            "parse started"
        );
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Option<SpeechRecord>>> {
        if let Some(lines) = self.pending.take() {
            self.start(lines)?;
        }
        while self.pos < self.lines.len() && self.state.mode != ScanMode::Index {
            let i = self.pos;
            self.pos += 1;
            let line = &self.lines[i];
            let prev = i.checked_sub(1).map(|p| self.lines[p].text.as_str());
            let next = self.lines.get(i + 1).map(|l| l.text.as_str());
            let mut cursor = Cursor::new(line, prev, next);
            let event = self.grammar.classify(&mut cursor, &mut self.state)?;
            if let Step::Yield(record) = self.acc.apply(event, &mut self.state, line.number)? {
                return Ok(Some(record));
            }
        }
        self.grammar.finish(&mut self.state)?;
        self.done = true;
        Ok(Some(self.acc.finish()))
    }
}

impl Iterator for Speeches {
    type Item = Result<Option<SpeechRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(item) => item.map(Ok),
            Err(e) => {
                self.done = true;
                tracing::debug!(doc = %self.doc.id, error = %e, "parse failed");
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Speeches {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::QaRole;
    use crate::rule::{classify, Paragraphs, Rule, RuleResult};

    /// A toy layout: `NAME: text` speakers, `# heading`, `Q.`/`A.`, and
    /// indented paragraphs.
    struct Toy;

    fn blank(_: &mut Toy, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
        Ok(line::is_blank(&cursor.text).then_some(LineEvent::BlankLine))
    }

    fn heading(_: &mut Toy, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
        Ok(cursor
            .trimmed()
            .strip_prefix("# ")
            .map(|t| LineEvent::HeadingLine(t.to_string())))
    }

    fn qa(_: &mut Toy, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
        let text = cursor.trimmed();
        let role = match text.get(..2) {
            Some("Q.") => QaRole::Question,
            Some("A.") => QaRole::Answer,
            _ => return Ok(None),
        };
        Ok(Some(LineEvent::SpeakerQA {
            role,
            text: text[2..].trim().to_string(),
        }))
    }

    fn speaker(_: &mut Toy, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
        Ok(cursor
            .trimmed()
            .split_once(": ")
            .filter(|(name, _)| name.chars().all(|c| c.is_ascii_uppercase() || c == ' '))
            .map(|(name, text)| LineEvent::named(name, text)))
    }

    fn text(_: &mut Toy, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
        Ok(Some(Paragraphs::Indent { threshold: 4 }.event(cursor, state)))
    }

    const RULES: &[Rule<Toy>] = &[
        Rule::new("blank", blank),
        Rule::new("heading", heading),
        Rule::new("qa", qa),
        Rule::new("speaker", speaker),
        Rule::new("text", text),
    ];

    const PATCHES: &[Patch] = &[Patch::Drop {
        doc: "broken",
        pattern: "^GARBAGE",
    }];

    impl Grammar for Toy {
        fn name(&self) -> &'static str {
            "toy"
        }

        fn instance(&self) -> &'static str {
            "toy"
        }

        fn patches(&self) -> &'static [Patch] {
            PATCHES
        }

        fn classify(&mut self, cursor: &mut Cursor<'_>, state: &mut ParseState) -> Result<LineEvent> {
            classify(RULES, self, cursor, state)
        }
    }

    const DOC: &str = "# Opening\nCHAIR: Welcome.\nall of you\n    Second point.\nQ. Ready?\nA. Yes.\n# Opening\nCHAIR: Again.";

    fn parse(text: &str, id: &str) -> Speeches {
        Speeches::from_text(Box::new(Toy), text, DocumentMeta::new(id))
            .with_state(ParseState::new().with_witness("Mr Witness").with_interviewer("Chair"))
    }

    #[test]
    fn one_record_per_speech_boundary() {
        let records: Vec<_> = parse(DOC, "doc").records().collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].speaker.as_deref(), Some("CHAIR"));
        assert_eq!(
            records[0].paragraph_texts(),
            vec!["Welcome. all of you", "Second point."]
        );
        assert_eq!(records[1].speaker.as_deref(), Some("Chair"));
        assert_eq!(records[2].speaker.as_deref(), Some("Mr Witness"));
        assert!(records[0].same_section(&records[3]));
    }

    #[test]
    fn every_fragment_appears_once_in_order() {
        let records: Vec<_> = parse(DOC, "doc").records().collect::<Result<_>>().unwrap();
        let fragments: Vec<String> = records
            .iter()
            .flat_map(|r| r.paragraphs.iter().flatten().cloned())
            .collect();
        assert_eq!(
            fragments,
            vec!["Welcome.", "all of you", "Second point.", "Ready?", "Yes.", "Again."]
        );
    }

    #[test]
    fn boundaries_without_speech_yield_none() {
        let items: Vec<_> = parse(DOC, "doc").collect::<Result<_>>().unwrap();
        assert!(items[0].is_none());
        assert_eq!(items.iter().filter(|i| i.is_some()).count(), 4);
    }

    #[test]
    fn fused_after_error() {
        let mut speeches = Speeches::from_text(Box::new(Toy), "stray text\nCHAIR: hi", DocumentMeta::new("doc"));
        let err = speeches.next().unwrap().unwrap_err();
        assert_eq!(err.line, 1);
        assert!(matches!(err.kind, ErrorKind::TextBeforeSpeech { .. }));
        assert!(speeches.next().is_none());
    }

    #[test]
    fn patches_run_before_classification() {
        let text = "CHAIR: Hello.\nGARBAGE\nCHAIR: Again.";
        let unpatched: Vec<_> = parse(text, "other").records().collect::<Result<_>>().unwrap();
        assert_eq!(unpatched[0].paragraph_texts(), vec!["Hello. GARBAGE"]);
        let records: Vec<_> = parse(text, "broken-doc").records().collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn document_date_seeds_state() {
        let date = Date::from_calendar_date(2008, time::Month::January, 7).unwrap();
        let doc = DocumentMeta::new("2008-01-07").with_date(date);
        let records: Vec<_> = Speeches::from_text(Box::new(Toy), "CHAIR: Hello.", doc)
            .records()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records[0].date, Some(date));
    }
}
