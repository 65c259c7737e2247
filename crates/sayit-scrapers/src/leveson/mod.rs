//! The Leveson Inquiry into the culture, practices and ethics of the press.
//!
//! Pages carry 25 numbered lines followed by the page number. The gap
//! between line number and text is 7 or 3 columns depending on how the PDF
//! was produced, and is detected from the first numbered line. Questioning is
//! mostly `Q.`/`A.` with counsel announced by a "Questions by" line.

mod fourup;
pub mod names;

use std::sync::LazyLock;

use regex::Regex;
use time::Time;

use sayit_core::dates;
use sayit_core::error::{ErrorKind, Result};
use sayit_core::event::{LineEvent, QaRole};
use sayit_core::line::{self, Line};
use sayit_core::names::NameTable;
use sayit_core::parse::{DocumentMeta, Grammar};
use sayit_core::patch::Patch;
use sayit_core::rule::{classify, Cursor, Paragraphs, Rule, RuleResult};
use sayit_core::state::{ParseState, ScanMode};

const PARAGRAPHS: Paragraphs = Paragraphs::Indent { threshold: 8 };

/// Hearings whose paragraphs are told apart by indentation relative to the
/// page's first line rather than by absolute column.
const RELATIVE_INDENT: &[&str] = &["2011-10-04", "2011-09-06"];

/// Published as four transcript pages per sheet.
const FOUR_UP: &str = "2011-10-04";

/// Page whose paragraphs all sit at one fixed column.
const FIXED_INDENT_PAGE: u32 = 113;

/// Line numbers per page, plus one for the page number.
const PAGE_NUMBER_ROW: u32 = 26;

const PATCHES: &[Patch] = &[
    Patch::Rewrite {
        doc: "",
        pattern: r"Leveson Inquiry transcript www\.levesoninquiry\.org\.uk",
        replacement: "",
    },
    Patch::Rewrite {
        doc: "",
        pattern: r"\(2\.43$",
        replacement: "(2.43 pm)",
    },
    Patch::Rewrite {
        doc: "",
        pattern: r"\((3\.23 pm|3\.07 pm|11\.15 am)$",
        replacement: "($1)",
    },
    // Correction notice printed above line 4 of the first page.
    Patch::DropUntil {
        doc: "2011-12-06am",
        pattern: r"^ +4",
    },
    Patch::StartAt {
        doc: "2011-12-06am",
        page: 1,
        line: 4,
    },
    Patch::StartAt {
        doc: "2012-05-23pm",
        page: 110,
        line: 7,
    },
    Patch::Rewrite {
        doc: "2011-11-30am",
        pattern: r"^( *\d+ +)Q\.$",
        replacement: "${1}Q. From the police.",
    },
];

/// Joint witness lines and the one person who actually gives the answers.
const WITNESS_ALIASES: NameTable = NameTable::new(&[
    ("Dr Gerald Patrick McCann and Dr Kate Marie McCann", "Mr McCann"),
    ("Mr James Watson and Mrs Margaret Watson", "Mrs Watson"),
    ("Mr Matthew Bell and Mr Christopher Johnson", "Mr Piers Pughe-Morgan"),
]);

static INDEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ *\d+ +I ?N ?D ?E ?X$").unwrap());
static PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ +(\d+)$").unwrap());
static DATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *((Mon|Tues|Wednes|Thurs|Fri)day,? ?)?\d+ (September|October|November|December|January|February|March|April|May|June|July) 201[12]$")
        .unwrap()
});
static PARENTHESISED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(\(.*\))(?:break|s)?$").unwrap());
static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\((\d{1,2})\.(\d{1,2}) ([AaPp][Mm])\)$").unwrap());
static ADJOURNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ *\(The (hearing|Inquiry|court) adjourned").unwrap());
static QUESTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Further questions from ([A-Z ]*)|Question(?:s|ed|) (?:from by|from|by) (.*?)(?: \(continued\))?)$")
        .unwrap()
});
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:Reply to the Responses to his Application by [A-Z ]*",
        r"|Response to .* Application",
        r"|Directions [Hh]earing.*",
        r"|Application by [A-Z ]*",
        r"|Application to become a core participant",
        r"|Reading of evidence of [A-Z ]*",
        r"|RULING|Ruling",
        r"|(?:Opening|Closing|Reply) submissions (?:(?:on|for) Module 3 )?by [A-Z ]*",
        r"|Statement by (?:[A-Z ]*|Lord Justice Leveson)",
        r"|Submissions? by (?:[A-Z ]*|Mr Garnham)",
        r"|Discussion",
        r"|Discussion re (?:procedure|timetable|administrative matters)",
        r"|Housekeeping)$",
    ))
    .unwrap()
});
static WITNESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *((?:[A-Z]|Mr)(?:[A-Z' ,-]|Mc|Mr|and)+) \((.*)\)$").unwrap()
});
static QUESTION_ANSWER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([QA])\. (.*)").unwrap());
static SPEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *((?:[A-Z -]|Mc)+): (.*)").unwrap());

/// The Leveson Inquiry grammar.
#[derive(Debug, Default)]
pub struct Leveson {
    /// Gap between line number and text, once detected.
    separator: Option<&'static str>,
    relative_indent: bool,
    /// Indentation of the first text line on the page, for
    /// [`RELATIVE_INDENT`] hearings.
    first_indent: Option<usize>,
}

impl Leveson {
    pub fn new() -> Self {
        Self::default()
    }
}

const RULES: &[Rule<Leveson>] = &[
    Rule::new("page_break", page_break),
    Rule::new("blank", blank),
    Rule::new("index", index),
    Rule::new("page_number", page_number),
    Rule::new("line_number", line_number),
    Rule::new("blank_after_number", blank),
    Rule::new("date_line", date_line),
    Rule::new("adjournment_continued", adjournment_continued),
    Rule::new("parenthesised", parenthesised),
    Rule::new("adjournment", adjournment),
    Rule::new("questions", questions),
    Rule::new("heading", heading),
    Rule::new("witness", witness),
    Rule::new("question_answer", question_answer),
    Rule::new("speaker", speaker),
    Rule::new("text", text),
];

fn page_break(g: &mut Leveson, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !line::is_page_break(cursor.raw()) {
        return Ok(None);
    }
    state.next_page(1);
    g.first_indent = None;
    Ok(Some(LineEvent::PageBreak))
}

fn blank(_: &mut Leveson, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(line::is_blank(&cursor.text).then_some(LineEvent::BlankLine))
}

fn index(_: &mut Leveson, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !INDEX.is_match(&cursor.text) && !cursor.text.contains("...............") {
        return Ok(None);
    }
    state.mode = ScanMode::Index;
    Ok(Some(LineEvent::IndexStart))
}

fn page_number(_: &mut Leveson, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if state.expected_line != PAGE_NUMBER_ROW {
        return Ok(None);
    }
    let printed = PAGE_NUMBER
        .captures(&cursor.text)
        .and_then(|caps| caps[1].parse::<u32>().ok());
    match printed {
        Some(page) if page == state.page => Ok(Some(LineEvent::PageNumberLine(page))),
        _ => Err(cursor.error(ErrorKind::PageNumberMismatch {
            expected: state.page,
            text: cursor.text.clone(),
        })),
    }
}

fn line_number(g: &mut Leveson, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    let expected = state.expected_line;
    if line::strip_line_number(&cursor.text, expected, " ").is_none() {
        return Err(cursor.error(ErrorKind::LineNumberMismatch {
            page: state.page,
            expected,
            text: cursor.text.clone(),
        }));
    }

    if g.separator.is_none() {
        g.separator = match cursor.indent() {
            1 => Some("       "),
            11 | 13 => Some("   "),
            _ => None,
        };
    }
    let separator = g.separator.unwrap_or(" ");
    let stripped = line::strip_line_number(&cursor.text, expected, separator)
        .or_else(|| line::strip_line_number(&cursor.text, expected, " "))
        .unwrap_or_default()
        .to_string();
    cursor.text = stripped;
    state.expected_line += 1;
    Ok(None)
}

fn date_line(_: &mut Leveson, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(DATE_LINE.is_match(&cursor.text).then_some(LineEvent::Skip))
}

/// The adjournment notice runs on to the line that closes its parenthesis.
fn adjournment_continued(_: &mut Leveson, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if state.mode != ScanMode::Adjournment {
        return Ok(None);
    }
    state.mode = ScanMode::Text;
    let text = cursor.trimmed();
    Ok(text
        .ends_with(')')
        .then(|| LineEvent::ContinuationLine(text.to_string())))
}

/// "(2.43 pm)", "(14.05 pm)": the hour is 24-hour from 13 on, whatever the
/// suffix says.
fn parse_clock(text: &str) -> Option<Time> {
    let caps = CLOCK.captures(text)?;
    let hour: u8 = caps[1].parse().ok()?;
    let minute: u8 = caps[2].parse().ok()?;
    if (13..=19).contains(&hour) {
        dates::clock_24(hour, minute, 0)
    } else {
        dates::clock_12(hour, minute, caps[3].eq_ignore_ascii_case("pm"))
    }
}

/// Times in parentheses, and the other bracketed stage directions.
fn parenthesised(_: &mut Leveson, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    if cursor.text.contains("published on the Hacked Off website at the time") {
        return Ok(None);
    }
    if let Some(caps) = PARENTHESISED.captures(&cursor.text) {
        let text = caps[1].replace("O2", "02");
        return Ok(Some(match parse_clock(&text) {
            Some(time) => LineEvent::TimeMark(time),
            None => LineEvent::Narrative(text),
        }));
    }
    let direction = cursor.text.contains("[Alarm sounded]") || cursor.text.contains("Evidence by videolink");
    Ok(direction.then(|| LineEvent::Narrative(cursor.trimmed().to_string())))
}

fn adjournment(_: &mut Leveson, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !ADJOURNMENT.is_match(&cursor.text) {
        return Ok(None);
    }
    state.mode = ScanMode::Adjournment;
    Ok(Some(LineEvent::AdjournmentStart(cursor.trimmed().to_string())))
}

fn questions(g: &mut Leveson, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    let Some(caps) = QUESTIONS.captures(cursor.trimmed()) else {
        return Ok(None);
    };
    let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
    Ok(Some(LineEvent::InterviewerChange(g.fix_name(name))))
}

fn heading(_: &mut Leveson, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    let text = cursor.trimmed();
    Ok(HEADING
        .is_match(text)
        .then(|| LineEvent::HeadingLine(text.to_string())))
}

/// A witness line; two in a row are one joint appearance under one heading.
fn witness(g: &mut Leveson, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    let Some(caps) = WITNESS.captures(&cursor.text) else {
        if state.mode == ScanMode::Witness {
            state.mode = ScanMode::Text;
        }
        return Ok(None);
    };
    let name = WITNESS_ALIASES.correct(g.fix_name(&caps[1]));
    let text = cursor.trimmed();
    let heading = match (&state.mode, &state.current_section) {
        (ScanMode::Witness, Some(previous)) => format!("{} / {}", previous.title, text),
        _ => text.to_string(),
    };
    state.mode = ScanMode::Witness;
    Ok(Some(LineEvent::WitnessArrival { name, heading }))
}

fn question_answer(_: &mut Leveson, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    let Some(caps) = QUESTION_ANSWER.captures(&cursor.text) else {
        return Ok(None);
    };
    let role = if &caps[1] == "A" {
        QaRole::Answer
    } else {
        QaRole::Question
    };
    Ok(Some(LineEvent::SpeakerQA {
        role,
        text: caps[2].trim().to_string(),
    }))
}

fn speaker(g: &mut Leveson, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(SPEAKER.captures(&cursor.text).map(|caps| LineEvent::NamedSpeakerLine {
        name: g.fix_name(&caps[1]),
        display: None,
        text: caps[2].trim().to_string(),
        sets_interviewer: true,
    }))
}

fn text(g: &mut Leveson, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !g.relative_indent {
        return Ok(Some(PARAGRAPHS.event(cursor, state)));
    }

    let indent = cursor.indent();
    let left = if indent == 5 { 4 } else { indent };
    let mut reflow = false;
    let first = if state.page == FIXED_INDENT_PAGE {
        3
    } else {
        match g.first_indent {
            None | Some(0) => left,
            // The page's first line was a paragraph opening after all.
            Some(first) if first > left + 1 => {
                reflow = true;
                left
            }
            Some(first) => first,
        }
    };
    g.first_indent = Some(first);

    let text = cursor.trimmed().to_string();
    Ok(Some(if reflow {
        LineEvent::ReflowContinuation(text)
    } else if indent >= first + 2 {
        LineEvent::NewParagraph(text)
    } else {
        LineEvent::ContinuationLine(text)
    }))
}

impl Grammar for Leveson {
    fn name(&self) -> &'static str {
        "leveson"
    }

    fn instance(&self) -> &'static str {
        "leveson"
    }

    fn patches(&self) -> &'static [Patch] {
        PATCHES
    }

    fn corrections(&self) -> NameTable {
        names::CORRECTIONS
    }

    fn fix_name(&self, name: &str) -> String {
        names::fix_name(name)
    }

    fn skip_document(&self, doc: &DocumentMeta) -> bool {
        // Transcripts that repeat or garble earlier sessions.
        ["2011-11-21pm", "2011-12-15am"]
            .iter()
            .any(|id| doc.id.contains(id))
    }

    fn top_section_title(&self, doc: &DocumentMeta) -> Option<String> {
        doc.date
            .map(|date| format!("Hearing, {}", dates::long_date(date)))
            .or_else(|| doc.title.clone())
    }

    fn prepare(&mut self, lines: Vec<Line>, doc: &DocumentMeta) -> Result<Vec<Line>> {
        if doc.id.contains(FOUR_UP) {
            fourup::reconstruct(lines)
        } else {
            Ok(lines)
        }
    }

    fn begin(&mut self, doc: &DocumentMeta, _: &mut ParseState) -> Result<()> {
        self.relative_indent = RELATIVE_INDENT.iter().any(|id| doc.id.contains(id));
        Ok(())
    }

    fn classify(&mut self, cursor: &mut Cursor<'_>, state: &mut ParseState) -> Result<LineEvent> {
        classify(RULES, self, cursor, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sayit_core::parse::Speeches;
    use sayit_core::speech::{SpeechKind, SpeechRecord};

    /// Lay `rows` out as one numbered transcript page, padded to 25 lines and
    /// followed by the page number.
    fn page(number: u32, rows: &[&str]) -> String {
        let mut out = String::new();
        for n in 1..=25 {
            match rows.get(n - 1) {
                Some(row) if !row.is_empty() => out.push_str(&format!("{n:>2}       {row}\n")),
                _ => out.push_str(&format!("{n:>2}\n")),
            }
        }
        out.push_str(&format!("    {number}\n"));
        out
    }

    fn doc(id: &str) -> DocumentMeta {
        let meta = DocumentMeta::new(id);
        match dates::parse_iso_date(&id[..10]) {
            Some(date) => meta.with_date(date),
            None => meta,
        }
    }

    fn parse(text: &str, id: &str) -> Result<Vec<SpeechRecord>> {
        Speeches::from_text(Box::new(Leveson::new()), text, doc(id))
            .records()
            .collect()
    }

    #[test]
    fn witness_questions_and_adjournment() {
        let text = page(
            1,
            &[
                "(10.00 am)",
                "LORD JUSTICE LEVESON: Good morning.",
                "MR PAUL DACRE (sworn)",
                "Questions by MR JAY",
                "Q. Mr Dacre, good morning.",
                "A. Good morning.",
                "Q. Tell us about the",
                "Daily Mail.",
                "(11.15 am)",
                "(The hearing adjourned until",
                "10 am tomorrow)",
            ],
        );
        let records = parse(&text, "2012-02-06am").unwrap();
        let speakers: Vec<_> = records.iter().map(|r| r.speaker.as_deref()).collect();
        assert_eq!(
            speakers,
            vec![
                Some("Lord Justice Leveson"),
                Some("Mr Jay"),
                Some("Mr Paul Dacre"),
                Some("Mr Jay"),
                None
            ]
        );
        assert_eq!(records[0].time.map(dates::clock).as_deref(), Some("10:00:00"));
        assert_eq!(records[1].kind, SpeechKind::Question);
        assert_eq!(records[1].section.as_ref().unwrap().title, "MR PAUL DACRE (sworn)");
        assert_eq!(
            records[3].paragraph_texts(),
            vec!["Tell us about the Daily Mail."]
        );
        assert_eq!(records[4].time.map(dates::clock).as_deref(), Some("11:15:00"));
        assert_eq!(
            records[4].paragraph_texts(),
            vec!["(The hearing adjourned until 10 am tomorrow)"]
        );
    }

    #[test]
    fn page_number_must_match() {
        let text = page(2, &["MR JAY: Sir."]);
        let err = parse(&text, "2012-02-06am").unwrap_err();
        assert_eq!(err.line, 26);
        assert!(matches!(err.kind, ErrorKind::PageNumberMismatch { expected: 1, .. }));
    }

    #[test]
    fn second_page_continues_numbering() {
        let text = format!(
            "{}\u{c}{}",
            page(1, &["MR JAY: Sir, the first page"]),
            page(2, &["ends here."])
        );
        let records = parse(&text, "2012-02-06am").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].paragraph_texts(), vec!["Sir, the first page ends here."]);
    }

    #[test]
    fn line_number_drift_is_fatal() {
        let text = " 1       MR JAY: Sir.\n 3       Q. Next?";
        let err = parse(text, "2012-02-06am").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(
            err.kind,
            ErrorKind::LineNumberMismatch { page: 1, expected: 2, .. }
        ));
    }

    #[test]
    fn joint_witnesses_share_one_heading() {
        let text = page(
            1,
            &[
                "MR MATTHEW BELL AND MR CHRISTOPHER JOHNSON (sworn)",
                "MR PIERS STEFAN PUGHE-MORGAN (affirmed)",
                "Questions by MR JAY",
                "Q. Good afternoon.",
                "A. Good afternoon.",
            ],
        );
        let records = parse(&text, "2011-12-20pm").unwrap();
        assert_eq!(records[1].speaker.as_deref(), Some("Mr Piers Pughe-Morgan"));
        assert_eq!(
            records[1].section.as_ref().unwrap().title,
            "MR MATTHEW BELL AND MR CHRISTOPHER JOHNSON (sworn) / MR PIERS STEFAN PUGHE-MORGAN (affirmed)"
        );
    }

    #[test]
    fn joint_witness_alias_answers() {
        let text = page(
            1,
            &[
                "DR GERALD PATRICK MCCANN AND DR KATE MARIE MCCANN (affirmed)",
                "Questions by MR JAY",
                "Q. Thank you.",
                "A. Thank you.",
            ],
        );
        let records = parse(&text, "2011-11-23am").unwrap();
        assert_eq!(records[1].speaker.as_deref(), Some("Mr McCann"));
    }

    #[test]
    fn page_start_correction() {
        let text = " 1       Correction notice\n 2       for this session\n 4       MR JAY: Sir.";
        let records = parse(text, "2011-12-06am").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].paragraph_texts(), vec!["Sir."]);
    }

    #[test]
    fn relative_indent_ignores_margin_line() {
        let text = page(
            1,
            &["MR JAY: First line", "Margin text.", " One in.", "  Two in."],
        );
        let records = parse(&text, "2011-09-06").unwrap();
        assert_eq!(
            records[0].paragraph_texts(),
            vec!["First line Margin text. One in. Two in."]
        );
    }

    #[test]
    fn relative_indent_reflows_first_line() {
        let text = page(
            1,
            &[
                "MR JAY: First line",
                "     Second paragraph starts",
                "  and goes on.",
                "    Third one.",
            ],
        );
        let records = parse(&text, "2011-09-06").unwrap();
        assert_eq!(
            records[0].paragraph_texts(),
            vec!["First line", "Second paragraph starts and goes on.", "Third one."]
        );
    }

    #[test]
    fn clock_readings() {
        assert_eq!(parse_clock("(2.43 pm)").map(dates::clock).as_deref(), Some("14:43:00"));
        assert_eq!(parse_clock("(14.05 pm)").map(dates::clock).as_deref(), Some("14:05:00"));
        assert_eq!(parse_clock("(12.30 pm)").map(dates::clock).as_deref(), Some("12:30:00"));
        assert!(parse_clock("(The witness withdrew)").is_none());
    }

    #[test]
    fn document_level_policy() {
        let g = Leveson::new();
        assert!(g.skip_document(&doc("2011-11-21pm")));
        assert!(!g.skip_document(&doc("2011-11-21am")));
        assert_eq!(
            g.top_section_title(&doc("2011-11-21am")).as_deref(),
            Some("Hearing, 21 November 2011")
        );
    }
}
