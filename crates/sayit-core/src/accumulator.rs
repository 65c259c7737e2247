use crate::error::{ErrorKind, ParseError, Result};
use crate::event::{LineEvent, QaRole};
use crate::speech::{SpeechBuffer, SpeechKind, SpeechRecord};
use crate::state::ParseState;

/// What the scan should do after an event has been applied.
#[derive(Debug)]
pub enum Step {
    Continue,
    /// A boundary was reached: hand the previous speech to the caller. `None`
    /// when no speech was in progress.
    Yield(Option<SpeechRecord>),
}

/// Builds one speech at a time from line events.
#[derive(Debug, Default)]
pub struct Accumulator {
    current: Option<SpeechBuffer>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&SpeechBuffer> {
        self.current.as_ref()
    }

    /// Apply `event`, read at 1-based position `line`.
    pub fn apply(&mut self, event: LineEvent, state: &mut ParseState, line: usize) -> Result<Step> {
        if !matches!(
            event,
            LineEvent::PageBreak | LineEvent::PageNumberLine(_) | LineEvent::BlankLine | LineEvent::Skip
        ) {
            state.after_page_break = false;
        }

        match event {
            LineEvent::PageBreak | LineEvent::PageNumberLine(_) => {
                state.after_page_break = true;
                Ok(Step::Continue)
            }
            LineEvent::BlankLine | LineEvent::Skip | LineEvent::IndexStart => Ok(Step::Continue),
            LineEvent::DateMark(date) => {
                state.current_date = Some(date);
                Ok(Step::Continue)
            }
            LineEvent::TimeMark(time) => {
                state.current_time = Some(time);
                Ok(Step::Continue)
            }
            LineEvent::PresidingJudge(name) => {
                state.presiding = Some(name);
                Ok(Step::Continue)
            }
            LineEvent::InterviewerChange(name) => {
                state.current_interviewer = Some(name);
                Ok(Step::Continue)
            }
            LineEvent::HeadingLine(title) => {
                state.enter_section(&title);
                Ok(self.close())
            }
            LineEvent::SessionStart {
                title,
                date,
                morning,
            } => {
                state.start_session(morning);
                state.current_date = Some(date);
                state.enter_section(&title);
                Ok(self.close())
            }
            LineEvent::WitnessArrival { name, heading } => {
                state.current_witness = Some(name);
                state.enter_section(&heading);
                Ok(self.close())
            }
            LineEvent::SpeakerQA { role, text } => {
                let (speaker, kind) = match role {
                    QaRole::Answer => {
                        let witness = state.current_witness.clone().ok_or_else(|| {
                            ParseError::new(line, ErrorKind::NoWitness { text: text.clone() })
                        })?;
                        (witness, SpeechKind::Answer)
                    }
                    QaRole::Question => {
                        let interviewer = state.interviewer().map(str::to_string).ok_or_else(|| {
                            ParseError::new(line, ErrorKind::NoInterviewer { text: text.clone() })
                        })?;
                        (interviewer, SpeechKind::Question)
                    }
                };
                Ok(self.open(state, Some(speaker), None, text, kind, line))
            }
            LineEvent::NamedSpeakerLine {
                name,
                display,
                text,
                sets_interviewer,
            } => {
                if sets_interviewer && state.current_interviewer.is_none() {
                    state.current_interviewer = Some(name.clone());
                }
                Ok(self.open(state, Some(name), display, text, SpeechKind::Speech, line))
            }
            LineEvent::Narrative(text) | LineEvent::AdjournmentStart(text) => {
                Ok(self.open(state, None, None, text, SpeechKind::Narrative, line))
            }
            LineEvent::ContinuationLine(text) => {
                self.buffer(line, &text)?.add_text(text);
                Ok(Step::Continue)
            }
            LineEvent::NewParagraph(text) => {
                self.buffer(line, &text)?.add_para(text);
                Ok(Step::Continue)
            }
            LineEvent::ReflowContinuation(text) => {
                let buffer = self.buffer(line, &text)?;
                buffer.promote_last_fragment();
                buffer.add_text(text);
                Ok(Step::Continue)
            }
            LineEvent::Trailing { text, then } => {
                self.buffer(line, &text)?.add_text(text);
                self.apply(*then, state, line)
            }
        }
    }

    /// Hand out whatever is left at the end of the document.
    pub fn finish(&mut self) -> Option<SpeechRecord> {
        self.current.take().map(SpeechBuffer::finish)
    }

    fn close(&mut self) -> Step {
        Step::Yield(self.finish())
    }

    fn open(
        &mut self,
        state: &ParseState,
        speaker: Option<String>,
        speaker_display: Option<String>,
        text: String,
        kind: SpeechKind,
        line: usize,
    ) -> Step {
        let previous = self.current.replace(SpeechBuffer {
            speaker,
            speaker_display,
            paragraphs: vec![vec![text]],
            section: state.current_section.clone(),
            date: state.current_date,
            time: state.current_time,
            kind,
            line,
        });
        Step::Yield(previous.map(SpeechBuffer::finish))
    }

    fn buffer(&mut self, line: usize, text: &str) -> Result<&mut SpeechBuffer> {
        self.current.as_mut().ok_or_else(|| {
            ParseError::new(
                line,
                ErrorKind::TextBeforeSpeech {
                    text: text.to_string(),
                },
            )
        })
    }
}
