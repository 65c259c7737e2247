//! Philadelphia City Council stated meetings.
//!
//! Court-reporter layout: each page opens with its page number and a heading
//! line, then numbered lines with a three-column gap before the text. The
//! first page is a title page; the certificate at the end is ignored.

use std::sync::LazyLock;

use regex::Regex;

use sayit_core::dates;
use sayit_core::error::{ErrorKind, Result};
use sayit_core::event::LineEvent;
use sayit_core::line;
use sayit_core::parse::{DocumentMeta, Grammar};
use sayit_core::rule::{classify, Cursor, Paragraphs, Rule, RuleResult};
use sayit_core::state::{ParseState, ScanMode};

const PARAGRAPHS: Paragraphs = Paragraphs::Indent { threshold: 1 };

const SEPARATOR: &str = "   ";

static FOOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *Strehlow & Associates, Inc\.$|^ *\(215\) 504-4622$").unwrap());
static CERTIFICATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *\d+ *(CERTIFICATE|- - -)$").unwrap());
static PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ +(\d+)$").unwrap());
static NARRATIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ +(\(.*\))$").unwrap());
static NARRATIVE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ +(\(.*)$").unwrap());
static NARRATIVE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *\d+ +(.*\))$").unwrap());
static SPEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *([A-Z '.]+):(?: (.*)|$)").unwrap());

/// The Philadelphia council grammar.
#[derive(Debug, Default)]
pub struct Philadelphia;

impl Philadelphia {
    pub fn new() -> Self {
        Self
    }
}

const RULES: &[Rule<Philadelphia>] = &[
    Rule::new("page_break", page_break),
    Rule::new("consumed", consumed),
    Rule::new("blank", blank),
    Rule::new("footer", footer),
    Rule::new("title_page", title_page),
    Rule::new("certificate", certificate),
    Rule::new("page_number", page_number),
    Rule::new("page_heading", page_heading),
    Rule::new("line_number", line_number),
    Rule::new("narrative", narrative),
    Rule::new("split_narrative", split_narrative),
    Rule::new("speaker", speaker),
    Rule::new("text", text),
];

/// Numbering restarts at 0: the page number line.
fn page_break(_: &mut Philadelphia, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !line::is_page_break(cursor.raw()) {
        return Ok(None);
    }
    state.next_page(0);
    Ok(Some(LineEvent::PageBreak))
}

/// Second half of a narrative already read with the line before.
fn consumed(_: &mut Philadelphia, _: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if state.mode != ScanMode::SkipNext {
        return Ok(None);
    }
    state.mode = ScanMode::Text;
    Ok(Some(LineEvent::Skip))
}

fn blank(_: &mut Philadelphia, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(line::is_blank(&cursor.text).then_some(LineEvent::BlankLine))
}

fn footer(_: &mut Philadelphia, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(FOOTER.is_match(&cursor.text).then_some(LineEvent::Skip))
}

fn title_page(_: &mut Philadelphia, _: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    Ok((state.page == 1).then_some(LineEvent::Skip))
}

fn certificate(_: &mut Philadelphia, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if !CERTIFICATE.is_match(&cursor.text) {
        return Ok(None);
    }
    state.mode = ScanMode::Index;
    Ok(Some(LineEvent::IndexStart))
}

fn page_number(_: &mut Philadelphia, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if state.expected_line != 0 {
        return Ok(None);
    }
    let printed = PAGE_NUMBER
        .captures(&cursor.text)
        .and_then(|caps| caps[1].parse::<u32>().ok());
    if printed != Some(state.page) {
        return Err(cursor.error(ErrorKind::PageNumberMismatch {
            expected: state.page,
            text: cursor.text.clone(),
        }));
    }
    state.expected_line = 1;
    Ok(Some(LineEvent::PageNumberLine(state.page)))
}

/// Line 1 of every page is a running heading.
fn page_heading(_: &mut Philadelphia, _: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    if state.expected_line != 1 {
        return Ok(None);
    }
    state.expected_line = 2;
    Ok(Some(LineEvent::Skip))
}

fn line_number(_: &mut Philadelphia, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    let expected = state.expected_line;
    let Some(rest) = line::strip_line_number(&cursor.text, expected, SEPARATOR) else {
        return Err(cursor.error(ErrorKind::LineNumberMismatch {
            page: state.page,
            expected,
            text: cursor.text.clone(),
        }));
    };
    cursor.text = rest.to_string();
    state.expected_line += 1;
    Ok(None)
}

fn narrative(_: &mut Philadelphia, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(NARRATIVE
        .captures(&cursor.text)
        .map(|caps| LineEvent::Narrative(caps[1].to_string())))
}

/// A parenthesised note broken over two lines; the second is consumed here.
fn split_narrative(_: &mut Philadelphia, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    let Some(open) = NARRATIVE_OPEN.captures(&cursor.text) else {
        return Ok(None);
    };
    let Some(close) = cursor.next.and_then(|next| NARRATIVE_CLOSE.captures(next)) else {
        return Ok(None);
    };
    state.mode = ScanMode::SkipNext;
    state.expected_line += 1;
    Ok(Some(LineEvent::Narrative(format!("{} {}", &open[1], &close[1]))))
}

fn speaker(g: &mut Philadelphia, cursor: &mut Cursor<'_>, _: &mut ParseState) -> RuleResult {
    Ok(SPEAKER.captures(&cursor.text).map(|caps| {
        LineEvent::named(
            g.fix_name(&caps[1]),
            caps.get(2).map_or("", |m| m.as_str()).trim(),
        )
    }))
}

fn text(_: &mut Philadelphia, cursor: &mut Cursor<'_>, state: &mut ParseState) -> RuleResult {
    Ok(Some(PARAGRAPHS.event(cursor, state)))
}

impl Grammar for Philadelphia {
    fn name(&self) -> &'static str {
        "philadelphia"
    }

    fn instance(&self) -> &'static str {
        "philadelphia"
    }

    fn top_section_title(&self, doc: &DocumentMeta) -> Option<String> {
        doc.date
            .map(|date| format!("Council meeting, {}", dates::long_date(date)))
            .or_else(|| doc.title.clone())
    }

    fn classify(&mut self, cursor: &mut Cursor<'_>, state: &mut ParseState) -> Result<LineEvent> {
        classify(RULES, self, cursor, state)
    }
}
