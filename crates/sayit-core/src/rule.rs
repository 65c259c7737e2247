//! Priority-ordered classification rules.
//!
//! A grammar is a table of named rules tried top to bottom; the first rule
//! returning an event wins. Rules may also rewrite the working text (strip a
//! line number, blank out a timestamp) and fall through to the next rule.

use crate::error::{ErrorKind, ParseError, Result};
use crate::event::LineEvent;
use crate::line::{self, Line};
use crate::state::ParseState;

/// One line under classification, with its raw neighbours.
#[derive(Debug)]
pub struct Cursor<'a> {
    pub line: &'a Line,
    /// Working copy of the line, rewritten by rules as they go.
    pub text: String,
    pub prev: Option<&'a str>,
    pub next: Option<&'a str>,
}

impl<'a> Cursor<'a> {
    pub fn new(line: &'a Line, prev: Option<&'a str>, next: Option<&'a str>) -> Self {
        Self {
            line,
            text: line.text.clone(),
            prev,
            next,
        }
    }

    pub fn number(&self) -> usize {
        self.line.number
    }

    pub fn raw(&self) -> &'a str {
        &self.line.text
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn indent(&self) -> usize {
        line::indent(&self.text)
    }

    /// The start of the document counts as blank.
    pub fn prev_is_blank(&self) -> bool {
        self.prev.map_or(true, line::is_blank)
    }

    pub fn next_indent(&self) -> Option<usize> {
        self.next.map(line::indent)
    }

    pub fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(self.number(), kind)
    }
}

pub type RuleResult = Result<Option<LineEvent>>;

pub type RuleFn<G> = fn(&mut G, &mut Cursor<'_>, &mut ParseState) -> RuleResult;

pub struct Rule<G> {
    pub name: &'static str,
    pub apply: RuleFn<G>,
}

impl<G> Rule<G> {
    pub const fn new(name: &'static str, apply: RuleFn<G>) -> Self {
        Self { name, apply }
    }
}

/// Run `rules` in order against `cursor`.
pub fn classify<G>(
    rules: &[Rule<G>],
    grammar: &mut G,
    cursor: &mut Cursor<'_>,
    state: &mut ParseState,
) -> Result<LineEvent> {
    for rule in rules {
        if let Some(event) = (rule.apply)(grammar, cursor, state)? {
            tracing::trace!(line = cursor.number(), rule = rule.name, ?event, "classified");
            return Ok(event);
        }
    }
    Err(cursor.error(ErrorKind::Unclassified {
        text: cursor.text.clone(),
    }))
}

// ── Paragraphs ──

/// How a grammar tells a new paragraph from a continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paragraphs {
    /// Indented at least `threshold` columns: new paragraph.
    Indent { threshold: usize },
    /// Only a line after a blank line can open a paragraph, and then only
    /// when indented at least `threshold` columns. The first such line after
    /// a page break is settled by comparing its indentation with the next
    /// line's.
    BlankAware { threshold: usize },
}

impl Paragraphs {
    pub fn event(self, cursor: &Cursor<'_>, state: &ParseState) -> LineEvent {
        let text = cursor.trimmed().to_string();
        let indent = cursor.indent();
        let new_paragraph = match self {
            Self::Indent { threshold } => indent >= threshold,
            Self::BlankAware { threshold } => {
                if !cursor.prev_is_blank() {
                    false
                } else if state.after_page_break {
                    cursor.next_indent() != Some(indent)
                } else {
                    indent >= threshold
                }
            }
        };
        if new_paragraph {
            LineEvent::NewParagraph(text)
        } else {
            LineEvent::ContinuationLine(text)
        }
    }
}
