//! Hand-verified, document-specific corrections.
//!
//! Each source carries a table of patches keyed by a fragment of the
//! document identifier (a date or URL fragment; an empty key applies to every
//! document). Patches are applied to the lines before any rule sees them, so
//! the grammars stay free of one-off special cases.

use std::borrow::Cow;

use regex::Regex;

use crate::line::Line;
use crate::state::ParseState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch {
    /// Regex rewrite of every matching line.
    Rewrite {
        doc: &'static str,
        pattern: &'static str,
        replacement: &'static str,
    },
    /// Remove matching lines.
    Drop {
        doc: &'static str,
        pattern: &'static str,
    },
    /// Remove every line before the first match.
    DropUntil {
        doc: &'static str,
        pattern: &'static str,
    },
    /// The document does not start at page 1, line 1.
    StartAt {
        doc: &'static str,
        page: u32,
        line: u32,
    },
    /// Line numbering on `page` restarts at `line` instead of 1.
    PageStart {
        doc: &'static str,
        page: u32,
        line: u32,
    },
    /// Interviewer to assume when a question arrives with none established.
    Interviewer {
        doc: &'static str,
        name: &'static str,
    },
    /// Presiding judge for the whole hearing, whoever the title page names.
    Presiding {
        doc: &'static str,
        name: &'static str,
    },
}

impl Patch {
    pub fn doc(&self) -> &'static str {
        match self {
            Self::Rewrite { doc, .. }
            | Self::Drop { doc, .. }
            | Self::DropUntil { doc, .. }
            | Self::StartAt { doc, .. }
            | Self::PageStart { doc, .. }
            | Self::Interviewer { doc, .. }
            | Self::Presiding { doc, .. } => doc,
        }
    }

    pub fn applies_to(&self, doc_id: &str) -> bool {
        doc_id.contains(self.doc())
    }
}

/// Patches selected for one document, with their patterns compiled.
#[derive(Debug, Default)]
pub struct DocumentPatches {
    rewrites: Vec<(Regex, &'static str)>,
    drops: Vec<Regex>,
    drop_until: Option<Regex>,
    start: Option<(u32, u32)>,
    page_starts: Vec<(u32, u32)>,
    interviewer: Option<&'static str>,
    presiding: Option<&'static str>,
}

impl DocumentPatches {
    /// Select the patches for `doc_id`. Patterns are golden data; one that
    /// fails to compile is a programming error caught by the source's tests.
    pub fn select(table: &[Patch], doc_id: &str) -> Result<Self, regex::Error> {
        let mut out = Self::default();
        for patch in table.iter().filter(|p| p.applies_to(doc_id)) {
            match *patch {
                Patch::Rewrite {
                    pattern,
                    replacement,
                    ..
                } => out.rewrites.push((Regex::new(pattern)?, replacement)),
                Patch::Drop { pattern, .. } => out.drops.push(Regex::new(pattern)?),
                Patch::DropUntil { pattern, .. } => out.drop_until = Some(Regex::new(pattern)?),
                Patch::StartAt { page, line, .. } => out.start = Some((page, line)),
                Patch::PageStart { page, line, .. } => out.page_starts.push((page, line)),
                Patch::Interviewer { name, .. } => out.interviewer = Some(name),
                Patch::Presiding { name, .. } => out.presiding = Some(name),
            }
        }
        Ok(out)
    }

    /// Rewrite and drop lines. Surviving lines keep their original numbers.
    pub fn apply(&self, lines: Vec<Line>) -> Vec<Line> {
        let mut waiting = self.drop_until.as_ref();
        let mut out = Vec::with_capacity(lines.len());
        for mut line in lines {
            if let Some(until) = waiting {
                if !until.is_match(&line.text) {
                    tracing::debug!(line = line.number, "patch: dropped before anchor");
                    continue;
                }
                waiting = None;
            }
            if self.drops.iter().any(|re| re.is_match(&line.text)) {
                tracing::debug!(line = line.number, "patch: dropped");
                continue;
            }
            for (re, replacement) in &self.rewrites {
                if let Cow::Owned(text) = re.replace_all(&line.text, *replacement) {
                    tracing::debug!(line = line.number, "patch: rewritten");
                    line.text = text;
                }
            }
            out.push(line);
        }
        out
    }

    /// Seed counters and names before the scan starts.
    pub fn seed(&self, state: &mut ParseState) {
        if let Some((page, line)) = self.start {
            state.page = page;
            state.expected_line = line;
        }
        state.page_starts.extend(self.page_starts.iter().copied());
        if let Some(name) = self.interviewer {
            state.interviewer_seed = Some(name.to_string());
        }
        if let Some(name) = self.presiding {
            state.presiding_override = Some(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::number_lines;

    const TABLE: &[Patch] = &[
        Patch::Rewrite {
            doc: "",
            pattern: r"\((2\.43)$",
            replacement: "($1 pm)",
        },
        Patch::Drop {
            doc: "2007-07-03",
            pattern: r"^\s*OPEN SESSION\s*$",
        },
        Patch::DropUntil {
            doc: "2011-12-06am",
            pattern: r"^ +4",
        },
        Patch::StartAt {
            doc: "2012-05-23pm",
            page: 110,
            line: 7,
        },
    ];

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn rewrite_applies_everywhere() {
        let patches = DocumentPatches::select(TABLE, "anything").unwrap();
        let out = patches.apply(number_lines(["   (2.43", "other"]));
        assert_eq!(texts(&out), vec!["   (2.43 pm)", "other"]);
    }

    #[test]
    fn drop_keyed_by_document() {
        let lines = number_lines(["   OPEN SESSION", "kept"]);
        let other = DocumentPatches::select(TABLE, "2008-01-07").unwrap();
        assert_eq!(other.apply(lines.clone()).len(), 2);
        let patched = DocumentPatches::select(TABLE, "2007-07-03").unwrap();
        let out = patched.apply(lines);
        assert_eq!(texts(&out), vec!["kept"]);
        assert_eq!(out[0].number, 2);
    }

    #[test]
    fn drop_until_anchor() {
        let patches = DocumentPatches::select(TABLE, "hearing-2011-12-06am").unwrap();
        let out = patches.apply(number_lines([" 1 correction", " 2 more", "  4 start", "  5 next"]));
        assert_eq!(texts(&out), vec!["  4 start", "  5 next"]);
    }

    #[test]
    fn page_start_moves_first_line() {
        let table = [Patch::PageStart {
            doc: "2006-09-22",
            page: 2,
            line: 2,
        }];
        let patches = DocumentPatches::select(&table, "2006-09-22").unwrap();
        let mut state = ParseState::new();
        patches.seed(&mut state);
        state.next_page(1);
        assert_eq!(state.expected_line, 2);
        state.next_page(1);
        assert_eq!(state.expected_line, 1);
    }

    #[test]
    fn start_at_seeds_counters() {
        let patches = DocumentPatches::select(TABLE, "2012-05-23pm").unwrap();
        let mut state = ParseState::new();
        patches.seed(&mut state);
        assert_eq!((state.page, state.expected_line), (110, 7));
    }

    #[test]
    fn names_reach_state_only_through_seed() {
        let table = [
            Patch::Interviewer {
                doc: "2008-06-13",
                name: "MR BANGURA",
            },
            Patch::Presiding {
                doc: "2008-10-13",
                name: "RICHARD LUSSICK",
            },
        ];
        let mut state = ParseState::new();
        DocumentPatches::select(&table, "2008-06-13").unwrap().seed(&mut state);
        assert_eq!(state.interviewer_seed.as_deref(), Some("MR BANGURA"));
        assert_eq!(state.presiding_override, None);

        let mut state = ParseState::new();
        state.presiding = Some("TERESA DOHERTY".into());
        DocumentPatches::select(&table, "2008-10-13").unwrap().seed(&mut state);
        assert_eq!(state.presiding_judge(), Some("RICHARD LUSSICK"));
        assert_eq!(state.interviewer_seed, None);
    }
}
