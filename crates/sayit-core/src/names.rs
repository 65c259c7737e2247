use std::sync::LazyLock;

use regex::{Captures, Regex};

static MC_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Mc[a-z]").unwrap());

/// Fixed mapping of garbled or inconsistent names to canonical forms.
///
/// Tables are `'static` data and may be shared freely between parses.
#[derive(Debug, Clone, Copy)]
pub struct NameTable {
    entries: &'static [(&'static str, &'static str)],
}

impl NameTable {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub const fn empty() -> Self {
        Self { entries: &[] }
    }

    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(from, _)| *from == name)
            .map(|(_, to)| *to)
    }

    /// Canonical form of `name`, or `name` itself when it has no entry.
    pub fn correct(&self, name: String) -> String {
        match self.get(&name) {
            Some(fixed) => fixed.to_string(),
            None => name,
        }
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }
}

/// Title-case every word: a letter is upper-cased when the character before
/// it is not a letter, and lower-cased otherwise ("O'BRIEN" → "O'Brien",
/// "TF1-023" → "Tf1-023").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

/// Restore the capital after a `Mc` prefix ("Mccann" → "McCann").
pub fn capitalise_mc(s: &str) -> String {
    MC_PREFIX
        .replace_all(s, |caps: &Captures| {
            let m = &caps[0];
            format!("{}{}", &m[..2], m[2..].to_uppercase())
        })
        .into_owned()
}

/// Lower-case the joining particles that title casing capitalised.
pub fn lower_particles(s: &str) -> String {
    s.replace(" Of ", " of ").replace(" And ", " and ")
}

/// The default speaker normalisation: title case, drop full stops, fix `Mc`
/// names, then apply the correction table.
pub fn normalize_name(name: &str, table: &NameTable) -> String {
    let name = title_case(name.trim()).replace('.', "");
    table.correct(capitalise_mc(&name))
}
