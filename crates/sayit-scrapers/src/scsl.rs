//! Special Court for Sierra Leone: the Charles Taylor trial.
//!
//! Page 1 is a title page read row by row. Every later page carries running
//! line numbers from 1, a running header and a footer, with `HH:MM:SS`
//! timestamps in the left margin.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use time::{Date, Month};

use sayit_core::dates;
use sayit_core::error::{ErrorKind, ParseError, Result};
use sayit_core::event::{LineEvent, QaRole};
use sayit_core::line;
use sayit_core::names::{self, NameTable};
use sayit_core::parse::{DocumentMeta, Grammar};
use sayit_core::patch::Patch;
use sayit_core::rule::{classify, Cursor, Paragraphs, Rule, RuleResult};
use sayit_core::state::{ParseState, ScanMode};

const PARAGRAPHS: Paragraphs = Paragraphs::Indent { threshold: 7 };

const CORRECTIONS: NameTable = NameTable::new(&[
    ("MR WITNESS", "THE WITNESS"),
    ("WITNESS", "THE WITNESS"),
]);

const PATCHES: &[Patch] = &[
    // No line 1 on the second page.
    Patch::PageStart {
        doc: "2006-09-22",
        page: 2,
        line: 2,
    },
    // Running header split over several lines.
    Patch::Drop {
        doc: "2007-07-03",
        pattern: r"^\s*(3|OPEN|3 +OPEN|SESSION|2 +JULY +2007|2 +JULY +2007 +OPEN|OPEN +SESSION|2 +JULY +2007 +OPEN +SESSION)\s*$",
    },
    Patch::Rewrite {
        doc: "2008-05-19",
        pattern: r"^(\s*\d+\s+\[Lunch break taken at 1\.30 p\.m\.\]) *\[Upon",
        replacement: "$1",
    },
    Patch::Rewrite {
        doc: "2008-05-19",
        pattern: r"^(\s*\d+\s+)resuming at 2\.30 p\.m\.\]",
        replacement: "${1}[Upon resuming at 2.30 p.m.]",
    },
    // Questions straight after a private session.
    Patch::Interviewer {
        doc: "2010-05-21",
        name: "MS HOLLIS",
    },
    Patch::Interviewer {
        doc: "2010-04-21",
        name: "MR KOUMJIAN",
    },
    Patch::Interviewer {
        doc: "2008-11-26",
        name: "MR KOUMJIAN",
    },
    Patch::Interviewer {
        doc: "2008-08-26",
        name: "MR MUNYARD",
    },
    Patch::Interviewer {
        doc: "2008-06-13",
        name: "MR BANGURA",
    },
    Patch::Presiding {
        doc: "2008-10-13",
        name: "RICHARD LUSSICK",
    },
    Patch::Presiding {
        doc: "2008-10-15",
        name: "RICHARD LUSSICK",
    },
];

// ── Title page ──

/// Rows of the title page that vary between hearings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TitleLayout {
    time_row: u32,
    heading_row: Option<u32>,
    location_row: u32,
}

impl TitleLayout {
    const STANDARD: Self = Self {
        time_row: 7,
        heading_row: Some(8),
        location_row: 9,
    };

    fn for_document(id: &str) -> Self {
        LAYOUTS
            .iter()
            .find(|(doc, _)| id.contains(doc))
            .map_or(Self::STANDARD, |(_, layout)| *layout)
    }
}

const LAYOUTS: &[(&str, TitleLayout)] = &[
    (
        "2008-03-06",
        TitleLayout {
            time_row: 8,
            heading_row: Some(7),
            location_row: 9,
        },
    ),
    (
        "2007-07-03",
        TitleLayout {
            time_row: 7,
            heading_row: None,
            location_row: 8,
        },
    ),
    (
        "2007-06-25",
        TitleLayout {
            time_row: 7,
            heading_row: None,
            location_row: 8,
        },
    ),
];

/// The case number printed in pieces over four lines.
const CASE_NUMBER_PIECES: &[&str] = &["Case No. SCSL-", "SCSL-2003-", "2003-01-", "01-PT"];

const HEARING_TYPES: &[&str] = &[
    "ORAL HEARING",
    "APPEALS JUDGEMENT",
    "STATUS CONFERENCE",
    "SENTENCING HEARING",
    "JUDGEMENT",
    "HEARING",
    "DEFENCE FINAL SUBMISSIONS",
    "PROSECUTION FINAL SUBMISSIONS",
    "PROCEEDINGS",
    "TRIAL",
    "PROSECUTION OPENING STATEMENT",
    "PRE-TRIAL CONFERENCE",
    "INITIAL APPEARANCE",
];

const CHAMBERS: &[&str] = &["APPEALS CHAMBER", "TRIAL CHAMBER II", "TRIAL CHAMBER II."];

static CASE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Case No\. SCSL-2003-01-([AT]|PT)").unwrap());
static TITLE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2})[.:](\d{2}) *([ap])\.?m\.?$").unwrap());
static PRESIDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:Before the )?Judges:(?: *Justice,?)?|Justice) *(.*?),? \(?[Pp]residing(?: Judge)?\)?$")
        .unwrap()
});

// ── Running text ──

static INDEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"I N D E X$").unwrap());
static ACCUSED_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(CHARLES TAYLOR|CHARLES GHANKAY TAYLOR|TAYLOR|ACCUSED NAME) * (?:Page )?(\d+)(?: *PAG)?$")
        .unwrap()
});
static REISSUE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^2[23].01.2013 * (\d+)$").unwrap());
static COURT_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Special Court for Sierra Leone *\(Open Session\) *SCSL 2003-01-A$").unwrap()
});
static CHAMBER_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^SCSL - (APPEALS CHAMBER|TRIAL CHAMBER II|TRIAL CHAMBER)").unwrap()
});
static STAMP_AND_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d\d):(\d\d):(\d\d) (\d+)  ").unwrap());
static STAMP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^((\d\d):(\d\d):(\d\d)) ").unwrap());
static DATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *((Mon|Tues|Wednes|Thurs|Fri)day,? ?)?\d+ (August|September|October|November|December|January|February|March|April|May|June|July) (200[6-9]|201[0123])$")
        .unwrap()
});
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\^ )?[(\[].*[\])]\.?$").unwrap());
static MONDAY_ADJOURNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *Monday\. *\[Whereupon the hearing adjourned at").unwrap()
});
static ADJOURNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^ *\[(Due to|Whereupon|At this point|Proceedings adjourned)").unwrap()
});
static ADJOURNMENT_UNBRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *(Whereupon the hearing adjourned at |Whereupon commencing at )").unwrap()
});
static EXAMINATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:FURTHER )?(?:EXAMINATION(?:-| )IN-CHIEF|CROSS-EXAMINATION|CROSS-EXAMINED|RE-EXAMINATION) BY ([A-Z ]*):?(?: *\[Cont(?:(?:inue|')d|\.)?\])?:?\.?$")
        .unwrap()
});
static BENCH_QUESTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^QUESTIONS BY (THE BENCH):$").unwrap());
static ACCUSED_WITNESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(DANKPANNAH DR CHARLES GHANKAY TAYLOR):(?: \[Affirmed\])?$").unwrap()
});
static NUMBERED_WITNESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^WITNESS: *([A-Z0-9 -]+):? \[(.*)\]\.?$").unwrap());
static INDENTED_QA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {7,}[QA]\.").unwrap());
static QUESTION_ANSWER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([QA])\. (.*)").unwrap());
static COUNSEL_ALONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(M[RS] [A-Z]+):$").unwrap());
static SPEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *((?:[A-Z -]|De|Mc)+): (.*)").unwrap());
/// Capitalised words before a colon that quote a document rather than name
/// a speaker.
static NOT_A_SPEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(ECOWAS|H-O-U-Y-E|C|OBASANJO|TAYLOR):").unwrap());
static COUNSEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^M(R|S|RS) ").unwrap());

/// The Charles Taylor trial grammar.
#[derive(Debug)]
pub struct Scsl {
    date: Option<Date>,
    layout: TitleLayout,
    session_header: Option<Regex>,
}

impl Scsl {
    pub fn new() -> Self {
        Self {
            date: None,
            layout: TitleLayout::STANDARD,
            session_header: None,
        }
    }
}

impl Default for Scsl {
    fn default() -> Self {
        Self::new()
    }
}

const RULES: &[Rule<Scsl>] = &[
    Rule::new("page_break", page_break),
    Rule::new("blank", blank),
    Rule::new("index", index),
    Rule::new("title_page", title_page),
    Rule::new("running_header", running_header),
    Rule::new("timestamp", timestamp),
    Rule::new("line_number", line_number),
    Rule::new("caption", caption),
    Rule::new("blank_after_number", blank),
    Rule::new("date_line", date_line),
    Rule::new("adjournment_continued", adjournment_continued),
    Rule::new("bracketed", bracketed),
    Rule::new("monday_adjournment", monday_adjournment),
    Rule::new("adjournment", adjournment),
    Rule::new("examination", examination),
    Rule::new("witness", witness),
    Rule::new("indented_qa", indented_qa),
    Rule::new("question_answer", question_answer),
    Rule::new("counsel_alone", counsel_alone),
    Rule::new("speaker", speaker),
    Rule::new("text", text),
];

fn page_break(_: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !line::is_page_break(cursor.raw()) {
        return Ok(None);
    }
    state.next_page(1);
    Ok(Some(LineEvent::PageBreak))
}

fn blank(_: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(line::is_blank(&cursor.text).then_some(LineEvent::BlankLine))
}

fn index(_: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !INDEX.is_match(&cursor.text) {
        return Ok(None);
    }
    state.mode = ScanMode::Index;
    Ok(Some(LineEvent::IndexStart))
}

fn title_page(g: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if state.page != 1 {
        return Ok(None);
    }
    let text = cursor.trimmed().to_string();
    let row = state.expected_line;
    let unexpected = || {
        cursor.error(ErrorKind::UnexpectedTitleLine {
            row,
            text: text.clone(),
        })
    };
    let mut event = LineEvent::Skip;

    match row {
        1 => {
            if CASE_NUMBER_PIECES.contains(&text.as_str()) {
                if text == "01-PT" {
                    state.expected_line += 1;
                }
                return Ok(Some(LineEvent::Skip));
            }
            if !CASE_NUMBER.is_match(&text) {
                return Err(unexpected());
            }
        }
        2 => {
            if "SCSL-2003-01-".contains(text.as_str()) {
                return Ok(Some(LineEvent::Skip));
            }
            if text == "THE PROSECUTOR OF SPECIAL COURT" {
                state.expected_line += 1;
            } else if !matches!(text.as_str(), "THE PROSECUTOR OF" | "THE PROSECUTOR OF THE") {
                return Err(unexpected());
            }
        }
        3 if !matches!(text.as_str(), "THE SPECIAL COURT" | "SPECIAL COURT") => {
            return Err(unexpected());
        }
        4 if text != "V." => return Err(unexpected()),
        5 if !matches!(text.as_str(), "CHARLES GHANKAY TAYLOR" | "CHARLES GHANKAY TAYLOR.") => {
            return Err(unexpected());
        }
        6 => event = LineEvent::DateMark(g.check_title_date(cursor, &text)?),
        r if r == g.layout.time_row => {
            event = LineEvent::TimeMark(parse_title_time(&text).ok_or_else(|| {
                cursor.error(ErrorKind::BadTime(text.clone()))
            })?);
        }
        r if Some(r) == g.layout.heading_row => {
            if !HEARING_TYPES.contains(&text.to_uppercase().as_str()) {
                return Err(unexpected());
            }
        }
        r if r == g.layout.location_row => {
            if !CHAMBERS.contains(&text.as_str()) {
                return Err(unexpected());
            }
        }
        _ => {}
    }

    if let Some(caps) = PRESIDING.captures(&text) {
        event = LineEvent::PresidingJudge(g.fix_name(caps[1].trim()));
    } else if text.contains("residing") {
        return Err(unexpected());
    }

    state.expected_line += 1;
    Ok(Some(event))
}

impl Scsl {
    fn check_title_date(&mut self, cursor: &Cursor<'_>, text: &str) -> Result<Date> {
        let found = dates::parse_date(
            text,
            &[
                dates::WEEKDAY_LONG_DATE,
                dates::WEEKDAY_LONG_DATE_TIGHT,
                dates::LONG_DATE,
            ],
        )
        .ok_or_else(|| cursor.error(ErrorKind::BadDate(text.to_string())))?;
        match self.date {
            Some(expected) if expected != found => Err(cursor.error(ErrorKind::DateMismatch {
                expected: dates::iso_date(expected),
                found: dates::iso_date(found),
            })),
            _ => {
                self.date = Some(found);
                Ok(found)
            }
        }
    }

    fn session_header_matches(&self, text: &str) -> bool {
        self.session_header
            .as_ref()
            .is_some_and(|re| re.is_match(text))
    }
}

/// "9.30 a.m.", "2:30 PM" and the like.
fn parse_title_time(text: &str) -> Option<time::Time> {
    let caps = TITLE_TIME.captures(text)?;
    let hour = caps[1].parse().ok()?;
    let minute = caps[2].parse().ok()?;
    dates::clock_12(hour, minute, caps[3].eq_ignore_ascii_case("p"))
}

fn running_header(g: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    let text = cursor.trimmed();
    let header = ACCUSED_HEADER.is_match(text)
        || REISSUE_HEADER.is_match(text)
        || g.session_header_matches(text)
        || COURT_BANNER.is_match(text)
        || CHAMBER_BANNER.is_match(text);
    Ok(header.then_some(LineEvent::Skip))
}

fn stamp_time(cursor: &Cursor<'_>, caps: &Captures<'_>, first: usize) -> Result<time::Time> {
    let part = |i: usize| caps[first + i].parse::<u8>().ok();
    let time = match (part(0), part(1), part(2)) {
        (Some(h), Some(m), Some(s)) => dates::clock_24(h, m, s),
        _ => None,
    };
    time.ok_or_else(|| cursor.error(ErrorKind::BadTime(caps[0].trim().to_string())))
}

/// Margin timestamps set the time and are blanked out of the line.
fn timestamp(_: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    let trimmed = cursor.trimmed().to_string();
    if let Some(caps) = STAMP_AND_NUMBER.captures(&trimmed) {
        state.current_time = Some(stamp_time(cursor, &caps, 1)?);
        let replacement = format!("{}{}", " ".repeat(11), &caps[4]);
        cursor.text = cursor.text.replacen(&caps[0], &replacement, 1);
    } else if let Some(caps) = STAMP.captures(&trimmed) {
        state.current_time = Some(stamp_time(cursor, &caps, 2)?);
        cursor.text = cursor.text.replacen(&caps[1], &" ".repeat(8), 1);
    }
    Ok(None)
}

fn line_number(_: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    let expected = state.expected_line;
    match line::strip_line_number(&cursor.text, expected, " ") {
        Some(rest) => {
            cursor.text = rest.to_string();
            state.expected_line += 1;
            Ok(None)
        }
        None => Err(cursor.error(ErrorKind::LineNumberMismatch {
            page: state.page,
            expected,
            text: cursor.text.clone(),
        })),
    }
}

fn caption(_: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(cursor
        .trimmed()
        .starts_with("The Prosecutor of the Special Court v. Charles Ghankay Taylor")
        .then_some(LineEvent::Skip))
}

fn date_line(_: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(DATE_LINE.is_match(&cursor.text).then_some(LineEvent::Skip))
}

fn adjournment_continued(_: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if state.mode != ScanMode::Adjournment {
        return Ok(None);
    }
    let text = cursor.trimmed().to_string();
    if text.ends_with(']') {
        state.mode = ScanMode::Text;
    }
    Ok(Some(LineEvent::ContinuationLine(text)))
}

fn bracketed(_: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    let text = cursor.trimmed();
    Ok(BRACKETED
        .is_match(text)
        .then(|| LineEvent::Narrative(text.to_string())))
}

/// "Monday. [Whereupon the hearing adjourned at ..." finishes the previous
/// speech before the adjournment notice starts.
fn monday_adjournment(_: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !MONDAY_ADJOURNMENT.is_match(&cursor.text) {
        return Ok(None);
    }
    let rest = cursor.text.replacen("Monday. ", "", 1);
    state.mode = ScanMode::Adjournment;
    Ok(Some(LineEvent::Trailing {
        text: "Monday.".to_string(),
        then: Box::new(LineEvent::AdjournmentStart(rest.trim().to_string())),
    }))
}

fn adjournment(_: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !ADJOURNMENT.is_match(&cursor.text) && !ADJOURNMENT_UNBRACKETED.is_match(&cursor.text) {
        return Ok(None);
    }
    state.mode = ScanMode::Adjournment;
    Ok(Some(LineEvent::AdjournmentStart(cursor.trimmed().to_string())))
}

fn examination(g: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    let text = cursor.trimmed();
    if text.starts_with("cross-examination") {
        return Ok(None);
    }
    let caps = EXAMINATION
        .captures(text)
        .or_else(|| BENCH_QUESTIONS.captures(text));
    Ok(caps.map(|caps| LineEvent::InterviewerChange(g.fix_name(caps[1].trim()))))
}

fn witness(g: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    let text = cursor.trimmed();
    let caps = ACCUSED_WITNESS
        .captures(text)
        .or_else(|| NUMBERED_WITNESS.captures(text));
    Ok(caps.map(|caps| LineEvent::WitnessArrival {
        name: g.fix_name(caps[1].trim()),
        heading: text.to_string(),
    }))
}

fn indented_qa(_: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(INDENTED_QA
        .is_match(&cursor.text)
        .then(|| LineEvent::NewParagraph(cursor.trimmed().to_string())))
}

fn question_answer(_: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    let Some(caps) = QUESTION_ANSWER.captures(cursor.trimmed()) else {
        return Ok(None);
    };
    let role = if &caps[1] == "A" {
        QaRole::Answer
    } else {
        QaRole::Question
    };
    Ok(Some(LineEvent::SpeakerQA {
        role,
        text: caps[2].to_string(),
    }))
}

/// Counsel's name alone on a line introduces their questions.
fn counsel_alone(g: &mut Scsl, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(COUNSEL_ALONE
        .captures(cursor.trimmed())
        .map(|caps| LineEvent::InterviewerChange(g.fix_name(&caps[1]))))
}

fn speaker(g: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if NOT_A_SPEAKER.is_match(&cursor.text) {
        return Ok(None);
    }
    let Some(caps) = SPEAKER.captures(&cursor.text) else {
        return Ok(None);
    };
    let text = caps[2].trim().to_string();
    let name = match g.fix_name(caps[1].trim()) {
        name if name == "PRESIDING JUDGE" => state
            .presiding_judge()
            .map(str::to_string)
            .ok_or_else(|| cursor.error(ErrorKind::NoPresidingJudge))?,
        name if name == "THE WITNESS" => state
            .current_witness
            .clone()
            .ok_or_else(|| cursor.error(ErrorKind::NoWitness { text: text.clone() }))?,
        name => name,
    };
    Ok(Some(LineEvent::NamedSpeakerLine {
        sets_interviewer: COUNSEL.is_match(&name),
        name,
        display: None,
        text,
    }))
}

fn text(_: &mut Scsl, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    Ok(Some(PARAGRAPHS.event(cursor, state)))
}

impl Grammar for Scsl {
    fn name(&self) -> &'static str {
        "scsl"
    }

    fn instance(&self) -> &'static str {
        "charles-taylor"
    }

    fn patches(&self) -> &'static [Patch] {
        PATCHES
    }

    fn corrections(&self) -> NameTable {
        CORRECTIONS
    }

    /// Names stay upper case while parsing so the aliases can be spotted;
    /// [`Grammar::prettify`] title-cases them on the way out.
    fn fix_name(&self, name: &str) -> String {
        let name = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        CORRECTIONS.correct(name)
    }

    fn prettify(&self, name: &str) -> String {
        names::title_case(name)
            .replace("Dct-", "DCT-")
            .replace("Tfi-", "TF1-")
            .replace("Tf1-", "TF1-")
    }

    fn skip_document(&self, doc: &DocumentMeta) -> bool {
        // Garbled beyond repair.
        let garbled = Date::from_calendar_date(2006, Month::July, 21).ok();
        doc.id.contains("2006-07-21") || (doc.date.is_some() && doc.date == garbled)
    }

    fn top_section_title(&self, doc: &DocumentMeta) -> Option<String> {
        doc.date
            .map(|date| format!("Hearing, {}", dates::long_date(date)))
            .or_else(|| doc.title.clone())
    }

    fn begin(&mut self, doc: &DocumentMeta, _: &mut ParseState) -> Result<()> {
        self.date = doc
            .date
            .or_else(|| doc.id.get(..10).and_then(dates::parse_iso_date));
        self.layout = TitleLayout::for_document(&doc.id);

        let mut forms = vec!["DATE".to_string()];
        if let Some(date) = self.date {
            forms.push(format!("0?{}", regex::escape(&dates::long_date(date))));
            forms.push(regex::escape(&dates::us_header_date(date)));
        }
        let pattern = format!(
            r"(?i)^({}) * (OPEN OR CLOSED|OPEN|CLOSED|PRIVATE) SESSION",
            forms.join("|")
        );
        let header = Regex::new(&pattern)
            .map_err(|e| ParseError::new(0, ErrorKind::Layout(e.to_string())))?;
        self.session_header = Some(header);
        Ok(())
    }

    fn classify(&mut self, cursor: &mut Cursor<'_>, state: &mut ParseState) -> Result<LineEvent> {
        classify(RULES, self, cursor, state)
    }
}
