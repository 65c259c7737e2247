use thiserror::Error;

/// A document could not be parsed with the selected grammar.
///
/// Always fatal for the document: the scan stops at the first one. Known
/// anomalies belong in the patch table and ambiguous layout is settled by
/// heuristics, so neither ever surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based position of the offending line in the original document.
    pub line: usize,
    pub kind: ErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("expected line number {expected} on page {page}, got {text:?}")]
    LineNumberMismatch {
        page: u32,
        expected: u32,
        text: String,
    },

    #[error("expected page number {expected}, got {text:?}")]
    PageNumberMismatch { expected: u32, text: String },

    #[error("answer with no witness established: {text:?}")]
    NoWitness { text: String },

    #[error("question with no interviewer established: {text:?}")]
    NoInterviewer { text: String },

    #[error("presiding judge referenced before being established")]
    NoPresidingJudge,

    #[error("unexpected title page row {row}: {text:?}")]
    UnexpectedTitleLine { row: u32, text: String },

    #[error("title page date {found} does not match document date {expected}")]
    DateMismatch { expected: String, found: String },

    #[error("unparseable time {0:?}")]
    BadTime(String),

    #[error("unparseable date {0:?}")]
    BadDate(String),

    #[error("text before any speech: {text:?}")]
    TextBeforeSpeech { text: String },

    #[error("never found the start of the transcript")]
    NeverStarted,

    #[error("no rule matched {text:?}")]
    Unclassified { text: String },

    #[error("layout reconstruction failed: {0}")]
    Layout(String),
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;
