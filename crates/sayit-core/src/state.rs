use std::collections::HashMap;
use std::rc::Rc;

use time::{Date, Time};

use crate::speech::SectionPlaceholder;

/// Where the scan is within the document, for grammars that need more than
/// one line of context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Text,
    /// Past the start of the index; everything else is ignored.
    Index,
    /// Inside a multi-line adjournment message.
    Adjournment,
    /// The previous line announced a witness.
    Witness,
    /// The next line was already consumed by a two-line rule.
    SkipNext,
}

/// Mutable context for the scan of exactly one document.
///
/// Holds `Rc` handles, so it cannot cross threads: concurrent parses each
/// need their own state.
#[derive(Debug, Default)]
pub struct ParseState {
    pub current_date: Option<Date>,
    pub current_time: Option<Time>,
    pub current_section: Option<Rc<SectionPlaceholder>>,
    pub current_witness: Option<String>,
    pub current_interviewer: Option<String>,
    pub presiding: Option<String>,
    /// Interviewer to fall back on when a question arrives with none tracked.
    pub interviewer_seed: Option<String>,
    /// Presiding judge known to be wrong on the title page.
    pub presiding_override: Option<String>,
    /// Current page, 1-based.
    pub page: u32,
    /// Running line number expected on the next numbered line.
    pub expected_line: u32,
    pub mode: ScanMode,
    /// Set by a page break and cleared by the next line carrying text.
    pub after_page_break: bool,
    /// Pages whose line numbering does not restart at the usual line.
    pub page_starts: Vec<(u32, u32)>,
    sections: HashMap<String, Rc<SectionPlaceholder>>,
}

impl ParseState {
    pub fn new() -> Self {
        Self {
            page: 1,
            expected_line: 1,
            ..Self::default()
        }
    }

    pub fn with_witness(mut self, name: impl Into<String>) -> Self {
        self.current_witness = Some(name.into());
        self
    }

    pub fn with_interviewer(mut self, name: impl Into<String>) -> Self {
        self.current_interviewer = Some(name.into());
        self
    }

    pub fn with_date(mut self, date: Date) -> Self {
        self.current_date = Some(date);
        self
    }

    /// The interviewer, adopting the seed when none has been tracked yet.
    pub fn interviewer(&mut self) -> Option<&str> {
        if self.current_interviewer.is_none() {
            self.current_interviewer = self.interviewer_seed.clone();
        }
        self.current_interviewer.as_deref()
    }

    pub fn presiding_judge(&self) -> Option<&str> {
        self.presiding_override.as_deref().or(self.presiding.as_deref())
    }

    /// Placeholder for `title`. The same title always yields the same
    /// placeholder for the rest of the document.
    pub fn section(&mut self, title: &str) -> Rc<SectionPlaceholder> {
        if let Some(existing) = self.sections.get(title) {
            return Rc::clone(existing);
        }
        let section = SectionPlaceholder::new(title);
        self.sections.insert(title.to_string(), Rc::clone(&section));
        section
    }

    pub fn enter_section(&mut self, title: &str) {
        self.current_section = Some(self.section(title));
    }

    /// A new sitting. Time always resets; a morning session also forgets the
    /// witness and section. The date is kept.
    pub fn start_session(&mut self, morning: bool) {
        self.current_time = None;
        if morning {
            self.current_section = None;
            self.current_witness = None;
        }
    }

    /// Move to the next page, restarting the running line counter at
    /// `first_line` unless the page has a known different start.
    pub fn next_page(&mut self, first_line: u32) {
        self.page += 1;
        self.expected_line = self
            .page_starts
            .iter()
            .find(|(page, _)| *page == self.page)
            .map_or(first_line, |(_, line)| *line);
        self.after_page_break = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_title_same_placeholder() {
        let mut state = ParseState::new();
        let a = state.section("Housekeeping");
        let b = state.section("Housekeeping");
        let c = state.section("Discussion");
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &c));
    }

    #[test]
    fn morning_session_clears_witness_not_date() {
        let date = Date::from_calendar_date(2008, time::Month::March, 18).unwrap();
        let mut state = ParseState::new().with_witness("Mr X").with_date(date);
        state.enter_section("Morning Session");
        state.start_session(false);
        assert!(state.current_witness.is_some());
        state.start_session(true);
        assert!(state.current_witness.is_none());
        assert!(state.current_section.is_none());
        assert_eq!(state.current_date, Some(date));
    }

    #[test]
    fn interviewer_seed_fills_gap_presiding_override_wins() {
        let mut state = ParseState::new();
        state.interviewer_seed = Some("Mr Munyard".into());
        assert_eq!(state.interviewer(), Some("Mr Munyard"));
        state.current_interviewer = Some("Mr Griffiths".into());
        assert_eq!(state.interviewer(), Some("Mr Griffiths"));

        state.presiding = Some("Justice Teresa Doherty".into());
        assert_eq!(state.presiding_judge(), Some("Justice Teresa Doherty"));
        state.presiding_override = Some("Justice Richard Lussick".into());
        assert_eq!(state.presiding_judge(), Some("Justice Richard Lussick"));
    }

    #[test]
    fn next_page_restarts_counter() {
        let mut state = ParseState::new();
        state.expected_line = 26;
        state.next_page(1);
        assert_eq!(state.page, 2);
        assert_eq!(state.expected_line, 1);
        assert!(state.after_page_break);
    }
}
