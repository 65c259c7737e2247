//! Federal Open Market Committee meeting transcripts, 2002 to 2008.
//!
//! Prose layout without line numbers. Everything before the transcript title
//! is ignored; headings sit ten or more columns in; speakers are upper-case
//! names followed by a full stop.

use std::sync::LazyLock;

use regex::Regex;
use time::Date;

use sayit_core::dates;
use sayit_core::error::{ErrorKind, ParseError, Result};
use sayit_core::event::LineEvent;
use sayit_core::line;
use sayit_core::names::NameTable;
use sayit_core::parse::{DocumentMeta, Grammar};
use sayit_core::rule::{classify, Cursor, Paragraphs, Rule, RuleResult};
use sayit_core::state::ParseState;

const PARAGRAPHS: Paragraphs = Paragraphs::BlankAware { threshold: 1 };

const CORRECTIONS: NameTable = NameTable::new(&[
    ("Chairman Greenpan", "Chairman Greenspan"),
    ("Chairman Greenpsan", "Chairman Greenspan"),
    ("Chairman Greespan", "Chairman Greenspan"),
    ("Mr Moscow", "Mr Moskow"),
]);

macro_rules! months {
    () => {
        "(?:January|February|March|April|May|June|July|August|September|October|November|December)"
    };
}

static PAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!("^", months!(), r" (?:\d+|\d+...\d+), 200\d *(\d+) of (\d+)$")).unwrap()
});
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {10,}(\[.*\])$").unwrap());
static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Transcript of (the )?Federal Open Market Committee (Meeting|Conference Call) (on|of)$")
        .unwrap()
});
static DATE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(concat!("^", months!(), r" \d+-\d+, 200\d$")).unwrap());
static SINGLE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(concat!("^", months!(), r" \d+, 200\d$")).unwrap());
static DATE_THEN_SESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "^(?P<d>",
        months!(),
        r" \d+(?:, 200\d)?)...(?P<s>(?:Morning|Afternoon) Session)"
    ))
    .unwrap()
});
static SESSION_THEN_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!("^(?P<s>Afternoon Session)...(?P<d>", months!(), r" \d+, 200\d)")).unwrap()
});
static FOOTNOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]$").unwrap());
static SPEAKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *((?:M[RS][. ]+|CHAIRMAN |VICE CHAIRMAN )[A-Z]+|PARTICIPANTS)[.:]? ?[0-9]? ?(.*)")
        .unwrap()
});
static VOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"  (Yes|No|With some reluctance, I will vote yes\.)$").unwrap()
});

/// Columns of indentation that mark a heading.
const HEADING_INDENT: usize = 10;

/// The FOMC transcript grammar.
#[derive(Debug, Default)]
pub struct FederalReserve {
    year: Option<i32>,
    started: bool,
    /// A footnote has started; nothing more of interest until the next page.
    ignore_rest_of_page: bool,
}

impl FederalReserve {
    pub fn new() -> Self {
        Self::default()
    }
}

const RULES: &[Rule<FederalReserve>] = &[
    Rule::new("page_break", page_break),
    Rule::new("blank", blank),
    Rule::new("page_number", page_number),
    Rule::new("bracketed", bracketed),
    Rule::new("heading", heading),
    Rule::new("preamble", preamble),
    Rule::new("footnote", footnote),
    Rule::new("speaker", speaker),
    Rule::new("text", text),
];

fn page_break(_: &mut FederalReserve, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(line::is_page_break(cursor.raw()).then_some(LineEvent::PageBreak))
}

fn blank(_: &mut FederalReserve, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(line::is_blank(&cursor.text).then_some(LineEvent::BlankLine))
}

/// "March 18, 2008     12 of 120" heads every page.
fn page_number(g: &mut FederalReserve, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    let Some(page) = PAGE_LINE
        .captures(&cursor.text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
    else {
        return Ok(None);
    };
    state.page = page;
    g.ignore_rest_of_page = false;
    Ok(Some(LineEvent::PageNumberLine(page)))
}

/// Lunch breaks and other bracketed notes.
/// Kept before the title too.
fn bracketed(_: &mut FederalReserve, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(BRACKETED
        .captures(&cursor.text)
        .map(|caps| LineEvent::Narrative(caps[1].to_string())))
}

fn heading(g: &mut FederalReserve, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    if cursor.indent() < HEADING_INDENT {
        return Ok(None);
    }
    let text = cursor.trimmed();
    if TITLE.is_match(text) {
        g.started = true;
        return Ok(Some(LineEvent::Skip));
    }
    if text == "END OF MEETING" || DATE_RANGE.is_match(text) {
        return Ok(Some(LineEvent::Skip));
    }
    if SINGLE_DATE.is_match(text) {
        let date = dates::parse_date(text, &[dates::US_DATE])
            .ok_or_else(|| cursor.error(ErrorKind::BadDate(text.to_string())))?;
        return Ok(Some(LineEvent::DateMark(date)));
    }
    match g.session(text) {
        Some(Ok((title, date, morning))) => Ok(Some(LineEvent::SessionStart {
            title,
            date,
            morning,
        })),
        Some(Err(bad)) => Err(cursor.error(ErrorKind::BadDate(bad))),
        None => Ok(None),
    }
}

impl FederalReserve {
    /// Title, date and morning flag of a session heading such as
    /// "March 18 - Morning Session". `Err` holds a date that did not parse.
    fn session(&self, text: &str) -> Option<std::result::Result<(String, Date, bool), String>> {
        let caps = DATE_THEN_SESSION
            .captures(text)
            .or_else(|| SESSION_THEN_DATE.captures(text))?;
        let session = &caps["s"];
        let mut day = caps["d"].to_string();
        if !day.contains("200") {
            match self.year {
                Some(year) => day = format!("{day}, {year}"),
                None => return Some(Err(day)),
            }
        }
        // The first morning of a two-day meeting is misprinted.
        if day == "December 15, 2008" && session == "Morning Session" {
            day = "December 16, 2008".to_string();
        }
        let Some(date) = dates::parse_date(&day, &[dates::US_DATE]) else {
            return Some(Err(day));
        };
        Some(Ok((
            format!("{session}, {day}"),
            date,
            session == "Morning Session",
        )))
    }
}

fn preamble(g: &mut FederalReserve, _: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok((!g.started).then_some(LineEvent::Skip))
}

/// Footnotes are always "see materials".
fn footnote(g: &mut FederalReserve, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    if FOOTNOTE.is_match(&cursor.text) {
        g.ignore_rest_of_page = true;
    }
    Ok(g.ignore_rest_of_page.then_some(LineEvent::Skip))
}

fn speaker(g: &mut FederalReserve, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    let Some(caps) = SPEAKER.captures(&cursor.text) else {
        return Ok(None);
    };
    let name = g.fix_name(&caps[1]);
    // One speaker for Bernanke as governor and as chairman.
    let (name, display) = if name == "Mr Bernanke" {
        ("Chairman Bernanke".to_string(), Some(name))
    } else {
        (name, None)
    };
    Ok(Some(LineEvent::NamedSpeakerLine {
        name,
        display,
        text: caps[2].trim().to_string(),
        sets_interviewer: false,
    }))
}

fn text(_: &mut FederalReserve, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !cursor.prev_is_blank() && VOTE.is_match(&cursor.text) {
        return Ok(Some(LineEvent::ContinuationLine(format!(
            "<br/>{}",
            cursor.trimmed()
        ))));
    }
    Ok(Some(PARAGRAPHS.event(cursor, state)))
}

impl Grammar for FederalReserve {
    fn name(&self) -> &'static str {
        "federal_reserve"
    }

    fn instance(&self) -> &'static str {
        "federal-reserve"
    }

    fn corrections(&self) -> NameTable {
        CORRECTIONS
    }

    fn begin(&mut self, doc: &DocumentMeta, _: &mut ParseState) -> Result<()> {
        self.year = doc.date.map(|d| d.year()).or_else(|| {
            doc.id
                .split(|c: char| !c.is_ascii_digit())
                .find(|digits| digits.len() >= 4)
                .and_then(|digits| digits[..4].parse().ok())
        });
        Ok(())
    }

    fn finish(&mut self, _: &mut ParseState) -> Result<()> {
        if self.started {
            Ok(())
        } else {
            Err(ParseError::new(0, ErrorKind::NeverStarted))
        }
    }

    fn classify(&mut self, cursor: &mut Cursor<'_>, state: &mut ParseState) -> Result<LineEvent> {
        classify(RULES, self, cursor, state)
    }
}
