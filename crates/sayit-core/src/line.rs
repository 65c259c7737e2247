use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").unwrap());

/// Form feed, as emitted by `pdftotext -layout` between pages.
pub const PAGE_BREAK: char = '\u{c}';

/// One line of a document and its 1-based position in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

impl Line {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Split extracted document text into numbered lines.
///
/// Every form feed ends up on a line of its own so page breaks can be
/// recognised without looking inside text lines.
pub fn split_document(text: &str) -> Vec<Line> {
    let text = text.replace(PAGE_BREAK, "\u{c}\n");
    number_lines(LINE_BREAK.split(&text))
}

/// Number already-split lines from 1.
pub fn number_lines<I, S>(lines: I) -> Vec<Line>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| Line::new(i + 1, text))
        .collect()
}

/// Whitespace-only lines, including a lone form feed.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Count of leading whitespace characters.
pub fn indent(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

pub fn is_page_break(line: &str) -> bool {
    line.contains(PAGE_BREAK)
}

/// Strip a running line number `expected`, after optional leading spaces,
/// together with the `separator` that must follow it. A line holding only
/// the number strips to nothing. `None` when the line does not start with
/// the expected number.
pub fn strip_line_number<'a>(line: &'a str, expected: u32, separator: &str) -> Option<&'a str> {
    let rest = line
        .trim_start_matches(' ')
        .strip_prefix(expected.to_string().as_str())?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_feed_gets_its_own_line() {
        let lines = split_document("one\r\n\u{c}two\nthree");
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "\u{c}", "two", "three"]);
        assert_eq!(lines[3].number, 4);
    }

    #[test]
    fn form_feed_counts_as_blank() {
        assert!(is_blank("\u{c}"));
        assert!(is_blank("   "));
        assert!(!is_blank("  x"));
    }

    #[test]
    fn indent_counts_leading_spaces() {
        assert_eq!(indent("       Q. Yes"), 7);
        assert_eq!(indent("text"), 0);
    }

    #[test]
    fn line_numbers_must_match_exactly() {
        assert_eq!(strip_line_number("   12 MR KOUMJIAN:", 12, " "), Some("MR KOUMJIAN:"));
        assert_eq!(strip_line_number("   12", 12, " "), Some(""));
        assert_eq!(strip_line_number("   12 text", 1, " "), None);
        assert_eq!(strip_line_number("  3   Mr Nutter:", 3, "   "), Some("Mr Nutter:"));
        assert_eq!(strip_line_number("  3 x", 3, "   "), None);
    }
}
