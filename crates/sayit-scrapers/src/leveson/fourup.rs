//! Reconstruction of the four-pages-to-a-sheet PDF layout.
//!
//! The initial hearing was only published with two transcript pages side by
//! side and two rows of them per sheet. Each text line holds a line from the
//! left page and the same-numbered line from the right page; `Page N` markers
//! close a pair of pages. The output is ordinary one-page-at-a-time text with
//! a page number line and a form feed after every page.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use sayit_core::error::{ErrorKind, ParseError, Result};
use sayit_core::line::{self, Line, PAGE_BREAK};

static SHEET_FURNITURE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"Leveson Inquiry Initial Hearing +4 October 2011",
        r"\(\+44\) 207 404 1400 +London EC4A 2DY",
        r"Merrill Legal Solutions +www\.merrillcorp/mls\.com +8th Floor 165 Fleet Street",
        r" *\d+ \(Pages \d+ to \d+\)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static PAGE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ +Page (\d+)(?: +Page (\d+))?").unwrap());
static NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ +(\d+)( .*)?$").unwrap());

/// Left and right halves of a two-up line, both carrying line number `n`.
/// The right half is the last ` n` that is followed by a space or the end.
fn split_pair(line: &str) -> Option<(u32, String, Option<String>)> {
    let caps = NUMBERED.captures(line)?;
    let n: u32 = caps[1].parse().ok()?;
    let rest = caps.get(2).map_or("", |m| m.as_str());
    let needle = format!(" {n}");
    let split = rest
        .match_indices(&needle)
        .map(|(i, _)| i)
        .filter(|&i| {
            let after = &rest[i + needle.len()..];
            i >= 1 && (after.is_empty() || after.starts_with(' '))
        })
        .last();
    match split {
        Some(i) => {
            let right = &rest[i + needle.len()..];
            let right = (!right.is_empty()).then(|| right.to_string());
            Some((n, rest[..i].trim_end().to_string(), right))
        }
        None => Some((n, rest.to_string(), None)),
    }
}

fn numbered(n: u32, text: &str) -> String {
    if text.is_empty() {
        format!("{n:>2}")
    } else {
        format!("{n:>2}       {text}")
    }
}

/// Rebuild the pages of a four-up transcript in reading order.
pub fn reconstruct(lines: Vec<Line>) -> Result<Vec<Line>> {
    let mut pages: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    let mut left = Vec::new();
    let mut right = Vec::new();

    for source in &lines {
        let mut text = source.text.replace(PAGE_BREAK, "");
        for furniture in SHEET_FURNITURE.iter() {
            text = furniture.replace_all(&text, "").into_owned();
        }
        if line::is_blank(&text) {
            continue;
        }
        if text.contains("INDEX") {
            break;
        }

        if let Some(caps) = PAGE_MARKERS.captures(&text) {
            let page_left: u32 = caps[1].parse().unwrap_or_default();
            pages.insert(page_left, std::mem::take(&mut left));
            if let Some(page_right) = caps.get(2).and_then(|m| m.as_str().parse().ok()) {
                pages.insert(page_right, std::mem::take(&mut right));
            }
            right.clear();
            continue;
        }

        let (n, l, r) = split_pair(&text).ok_or_else(|| {
            ParseError::new(
                source.number,
                ErrorKind::Layout(format!("unnumbered four-up line {:?}", source.text)),
            )
        })?;
        left.push(numbered(n, l.trim_start()));
        if let Some(r) = r {
            right.push(numbered(n, r.trim_start()));
        }
    }

    let mut out = Vec::new();
    for (number, page) in pages {
        out.extend(page);
        out.push(format!("    {number}"));
        out.push(PAGE_BREAK.to_string());
    }
    tracing::debug!(lines = out.len(), "four-up layout reconstructed");
    Ok(line::number_lines(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn splits_side_by_side_lines() {
        assert_eq!(
            split_pair("  1 LORD JUSTICE LEVESON: Good      1 MR JAY: Thank you."),
            Some((
                1,
                " LORD JUSTICE LEVESON: Good".to_string(),
                Some(" MR JAY: Thank you.".to_string())
            ))
        );
        assert_eq!(
            split_pair(" 12 morning, everyone.            12"),
            Some((12, " morning, everyone.".to_string(), None))
        );
        assert_eq!(split_pair(" 25"), Some((25, String::new(), None)));
    }

    #[test]
    fn pages_come_out_in_order() {
        let sheet = line::number_lines([
            "\u{c}Leveson Inquiry Initial Hearing    4 October 2011",
            "  1 LORD JUSTICE LEVESON: Left      1 MR JAY: Right",
            "  2 more left                       2 more right",
            "              Page 1                  Page 2",
            "  1 (11.00 am)",
            "              Page 3",
            "                                   INDEX",
            "  1 ignored",
        ]);
        let out = reconstruct(sheet).unwrap();
        assert_eq!(
            texts(&out),
            vec![
                " 1       LORD JUSTICE LEVESON: Left",
                " 2       more left",
                "    1",
                "\u{c}",
                " 1       MR JAY: Right",
                " 2       more right",
                "    2",
                "\u{c}",
                " 1       (11.00 am)",
                "    3",
                "\u{c}",
            ]
        );
    }

    #[test]
    fn left_only_row_stays_on_left_page() {
        let sheet = line::number_lines([
            "  1 MR JAY: Left                    1 Right",
            "  2 only left",
            "              Page 7                  Page 8",
        ]);
        let out = reconstruct(sheet).unwrap();
        assert_eq!(
            texts(&out),
            vec![
                " 1       MR JAY: Left",
                " 2       only left",
                "    7",
                "\u{c}",
                " 1       Right",
                "    8",
                "\u{c}",
            ]
        );
    }

    #[test]
    fn garbage_line_is_a_layout_error() {
        let err = reconstruct(line::number_lines(["no number here"])).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(matches!(err.kind, ErrorKind::Layout(_)));
    }
}
