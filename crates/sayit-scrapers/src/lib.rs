//! Source grammars for the transcripts SayIt ingests.
//!
//! Each source is a [`Grammar`]: an ordered rule table plus the correction
//! and patch data its documents need.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sayit_core::Grammar;

pub mod fedreserve;
pub mod leveson;
pub mod philadelphia;
pub mod scsl;

pub use fedreserve::FederalReserve;
pub use leveson::Leveson;
pub use philadelphia::Philadelphia;
pub use scsl::Scsl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Special Court for Sierra Leone, the Charles Taylor trial.
    Scsl,
    /// The Leveson Inquiry.
    Leveson,
    /// Federal Open Market Committee meetings.
    FederalReserve,
    /// Philadelphia City Council stated meetings.
    Philadelphia,
}

#[derive(Debug, Error)]
#[error("unknown source: {0}. Expected: scsl, leveson, federal_reserve, philadelphia")]
pub struct UnknownSource(String);

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Scsl,
        Source::Leveson,
        Source::FederalReserve,
        Source::Philadelphia,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Source::Scsl => "scsl",
            Source::Leveson => "leveson",
            Source::FederalReserve => "federal_reserve",
            Source::Philadelphia => "philadelphia",
        }
    }

    /// A fresh grammar for one document.
    pub fn grammar(self) -> Box<dyn Grammar> {
        match self {
            Source::Scsl => Box::new(Scsl::new()),
            Source::Leveson => Box::new(Leveson::new()),
            Source::FederalReserve => Box::new(FederalReserve::new()),
            Source::Philadelphia => Box::new(Philadelphia::new()),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scsl" | "charles-taylor" => Ok(Source::Scsl),
            "leveson" => Ok(Source::Leveson),
            "federal_reserve" | "federal-reserve" | "fomc" => Ok(Source::FederalReserve),
            "philadelphia" => Ok(Source::Philadelphia),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for source in Source::ALL {
            assert_eq!(source.name().parse::<Source>().unwrap(), source);
        }
        assert!("hansard".parse::<Source>().is_err());
    }

    #[test]
    fn instance_labels() {
        let labels: Vec<_> = Source::ALL.iter().map(|s| s.grammar().instance()).collect();
        assert_eq!(
            labels,
            vec!["charles-taylor", "leveson", "federal-reserve", "philadelphia"]
        );
    }

    #[test]
    fn fix_name_is_idempotent_over_correction_tables() {
        for source in Source::ALL {
            let grammar = source.grammar();
            for (from, to) in grammar.corrections().entries() {
                let once = grammar.fix_name(from);
                assert_eq!(grammar.fix_name(&once), once, "{source}: {from}");
                let fixed = grammar.fix_name(to);
                assert_eq!(grammar.fix_name(&fixed), fixed, "{source}: {to}");
            }
        }
    }
}
