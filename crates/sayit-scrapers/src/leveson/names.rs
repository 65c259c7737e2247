use std::sync::LazyLock;

use regex::Regex;

use sayit_core::names::{self, NameTable};

pub const CORRECTIONS: NameTable = NameTable::new(&[
    // The chairman
    ("Court", "Lord Justice Leveson"),
    ("The Chairman", "Lord Justice Leveson"),
    ("The Judge", "Lord Justice Leveson"),
    ("Lord Leveson", "Lord Justice Leveson"),
    ("The Technician", "Technician"),
    // Misspellings
    ("Mr Patry Hoskins", "Ms Patry Hoskins"),
    ("Mrs Patry Hoskins", "Ms Patry Hoskins"),
    ("Ms Patry-Hoskins", "Ms Patry Hoskins"),
    ("Ms Decoulous", "Ms Decoulos"),
    ("Ms Michaolos", "Ms Michalos"),
    ("Mer Sherborne", "Mr Sherborne"),
    ("Lord Hunt of Wirrell", "Lord Hunt of Wirral"),
    // One person, several printed names
    ("Mr Davies", "Mr Rhodri Davies"),
    ("David James Fletcher Lord Hunt of Wirral", "Lord Hunt of Wirral"),
    ("Ms Young", "Ms Elizabeth Young"),
    ("Professor Tasioulas", "Professor John Tasioulas"),
    ("Ms Pickles", "Ms Anne Pickles"),
    ("Ms Nixon", "Ms Rosie Nixon"),
    ("Mr McLellan", "Mr John McLellan"),
    ("Mr Lyons", "Mr Darryn Lyons"),
    ("Mrs Llewellyn", "Mrs Catherine Llewellyn"),
    ("Dr Moore", "Dr Martin Moore"),
    ("Dr Unger", "Dr Steven Unger"),
    ("Mr Cunningham", "Mr Mike Cunningham"),
    ("Ms Stanistreet", "Ms Michelle Stanistreet"),
    ("Mr Rusbridger", "Mr Alan Rusbridger"),
    ("Mr Russell", "Mr Jonathan Russell"),
    ("Ms Bird", "Ms Joanne Bird"),
    ("Professor Barnett", "Professor Steven Barnett"),
    ("Ms Susan Akers", "DAC Sue Akers"),
    ("Dr John Vincent Cable", "Dr Vincent Cable"),
    ("Lord Guy Vaughan Black", "Lord Black of Brentwood"),
    ("Hjk", "HJK"),
]);

const HONORIFICS: &[&str] = &[
    "DAC", "DS", "Dr", "Miss", "Mrs", "Mr", "Ms", "Baroness", "Lord", "Professor", "Sir",
];

/// Honorific, first name, one or more middle names, surname, optional QC.
static MIDDLE_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(DAC|DS|Dr|Miss|Mrs|Mr|Ms|Baroness|Lord|Professor|Sir) (\S+ )(?:\S+ )+?(\S+)((?: QC)?)$")
        .unwrap()
});
static BARE_MIDDLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+) \S+ (\S+)").unwrap());

/// Title casing with the inquiry's abbreviations kept in capitals.
pub fn title_with_corrections(s: &str) -> String {
    let s = names::lower_particles(&names::title_case(s))
        .replace("Dac ", "DAC ")
        .replace("Qc", "QC")
        .replace("Ds ", "DS ");
    names::capitalise_mc(&s).replace("Maclennan", "MacLennan")
}

/// Drop middle names so one person is one speaker however their name was
/// printed.
pub fn drop_middle_names(name: &str) -> String {
    if name.contains("David Allen Green") {
        return name.to_string();
    }
    let name = MIDDLE_NAMES.replace(name, "$1 $2$3$4").into_owned();
    if HONORIFICS.iter().any(|h| name.starts_with(h)) {
        return name;
    }
    BARE_MIDDLE_NAME.replace(&name, "$1 $2").into_owned()
}

pub fn fix_name(name: &str) -> String {
    let name = CORRECTIONS.correct(title_with_corrections(name.trim()));
    // Several people, or a peer's title without the full name.
    if name.contains(" and ") || (name.contains(" of ") && !name.contains(',')) {
        return name;
    }
    drop_middle_names(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrections_after_title_case() {
        assert_eq!(fix_name("THE CHAIRMAN"), "Lord Justice Leveson");
        assert_eq!(fix_name("MR MCLELLAN"), "Mr John McLellan");
        assert_eq!(fix_name("LORD HUNT OF WIRRELL"), "Lord Hunt of Wirral");
        assert_eq!(fix_name("MS SUSAN AKERS"), "DAC Sue Akers");
    }

    #[test]
    fn middle_names_dropped() {
        assert_eq!(fix_name("MR PIERS STEFAN PUGHE-MORGAN"), "Mr Piers Pughe-Morgan");
        assert_eq!(fix_name("HUGH LAURIE GRANT"), "Hugh Grant");
        assert_eq!(fix_name("DAVID ALLEN GREEN"), "David Allen Green");
    }

    #[test]
    fn joint_witnesses_kept_whole() {
        assert_eq!(
            fix_name("MR JAMES WATSON AND MRS MARGARET WATSON"),
            "Mr James Watson and Mrs Margaret Watson"
        );
    }

    #[test]
    fn honorific_prefix_blocks_bare_rule() {
        // "Drew" starts like "Dr": left alone, as a three-word name.
        assert_eq!(drop_middle_names("Drew Barry Smith"), "Drew Barry Smith");
    }
}
