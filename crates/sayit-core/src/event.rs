use time::{Date, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaRole {
    Question,
    Answer,
}

/// The classified outcome of one line. Every grammar speaks this vocabulary;
/// the accumulator gives each event the same meaning for every source.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent {
    PageBreak,
    BlankLine,
    PageNumberLine(u32),
    IndexStart,
    /// Header, footer or other line that carries nothing.
    Skip,
    HeadingLine(String),
    SessionStart {
        title: String,
        date: Date,
        morning: bool,
    },
    DateMark(Date),
    TimeMark(Time),
    PresidingJudge(String),
    InterviewerChange(String),
    WitnessArrival {
        name: String,
        heading: String,
    },
    SpeakerQA {
        role: QaRole,
        text: String,
    },
    NamedSpeakerLine {
        name: String,
        display: Option<String>,
        text: String,
        /// Also track this speaker as the interviewer when none is known.
        sets_interviewer: bool,
    },
    Narrative(String),
    AdjournmentStart(String),
    ContinuationLine(String),
    NewParagraph(String),
    /// The previous fragment turned out to open a paragraph: split it off,
    /// then continue with this text.
    ReflowContinuation(String),
    /// The line starts with the last words of the current speech and goes on
    /// to something else.
    Trailing { text: String, then: Box<LineEvent> },
}

impl LineEvent {
    /// Events that finish the current speech.
    pub fn is_boundary(&self) -> bool {
        if let Self::Trailing { then, .. } = self {
            return then.is_boundary();
        }
        self.opens_speech()
            || matches!(
                self,
                Self::HeadingLine(_) | Self::SessionStart { .. } | Self::WitnessArrival { .. }
            )
    }

    /// Boundaries that also start a new speech.
    pub fn opens_speech(&self) -> bool {
        if let Self::Trailing { then, .. } = self {
            return then.opens_speech();
        }
        matches!(
            self,
            Self::SpeakerQA { .. }
                | Self::NamedSpeakerLine { .. }
                | Self::Narrative(_)
                | Self::AdjournmentStart(_)
        )
    }

    pub fn named(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::NamedSpeakerLine {
            name: name.into(),
            display: None,
            text: text.into(),
            sets_interviewer: false,
        }
    }
}
