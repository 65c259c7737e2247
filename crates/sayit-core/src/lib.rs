//! Line-oriented transcript parsing for SayIt.
//!
//! A source grammar classifies each line of a document into a [`LineEvent`];
//! the [`Accumulator`] turns the events into [`SpeechRecord`]s, threading an
//! explicit [`ParseState`] through the scan. [`Speeches`] drives the whole
//! thing lazily for one document.

pub mod accumulator;
pub mod dates;
pub mod error;
pub mod event;
pub mod line;
pub mod names;
pub mod parse;
pub mod patch;
pub mod rule;
pub mod speech;
pub mod state;

pub use accumulator::{Accumulator, Step};
pub use error::{ErrorKind, ParseError, Result};
pub use event::{LineEvent, QaRole};
pub use line::{split_document, Line};
pub use names::NameTable;
pub use parse::{DocumentMeta, Grammar, Speeches};
pub use patch::{DocumentPatches, Patch};
pub use rule::{Cursor, Paragraphs, Rule, RuleResult};
pub use speech::{EntityId, SectionPlaceholder, SpeechBuffer, SpeechKind, SpeechRecord};
pub use state::{ParseState, ScanMode};
