use std::sync::LazyLock;

use regex::Regex;
use time::macros::format_description;
use time::{format_description, Date, Time};

/// "7 January 2008"
pub const LONG_DATE: &str = "[day padding:none] [month repr:long case_sensitive:false] [year]";
/// "Monday, 7 January 2008"
pub const WEEKDAY_LONG_DATE: &str = "[weekday repr:long case_sensitive:false], [day padding:none] [month repr:long case_sensitive:false] [year]";
/// "Monday,7 January 2008"
pub const WEEKDAY_LONG_DATE_TIGHT: &str =
    "[weekday repr:long case_sensitive:false],[day padding:none] [month repr:long case_sensitive:false] [year]";
/// "January 7, 2008"
pub const US_DATE: &str = "[month repr:long case_sensitive:false] [day padding:none], [year]";
/// "2008-01-07"
pub const ISO_DATE: &str = "[year]-[month]-[day]";

static ZERO_PADDED_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[ ,])0(\d)").unwrap());

/// Parse `s` with the first description that accepts it. Zero-padded days
/// are accepted wherever an unpadded day is expected.
pub fn parse_date(s: &str, descriptions: &[&str]) -> Option<Date> {
    let s = ZERO_PADDED_DAY.replace_all(s.trim(), "$1$2");
    descriptions.iter().find_map(|desc| {
        let fmt = format_description::parse(desc).ok()?;
        Date::parse(&s, &fmt).ok()
    })
}

pub fn parse_iso_date(s: &str) -> Option<Date> {
    let fmt = format_description::parse(ISO_DATE).ok()?;
    Date::parse(s.trim(), &fmt).ok()
}

/// Twelve-hour clock reading to a time of day.
pub fn clock_12(hour: u8, minute: u8, pm: bool) -> Option<Time> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = hour % 12 + if pm { 12 } else { 0 };
    Time::from_hms(hour, minute, 0).ok()
}

pub fn clock_24(hour: u8, minute: u8, second: u8) -> Option<Time> {
    Time::from_hms(hour, minute, second).ok()
}

pub fn iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// "7 January 2008"
pub fn long_date(date: Date) -> String {
    date.format(format_description!("[day padding:none] [month repr:long] [year]"))
        .unwrap_or_default()
}

/// "January 07,2008", the variant some running headers use.
pub fn us_header_date(date: Date) -> String {
    date.format(format_description!("[month repr:long] [day],[year]"))
        .unwrap_or_default()
}

pub fn clock(time: Time) -> String {
    time.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}
