use chrono::NaiveDate;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use super::row;

// Counted in non blank lines.
const HEADER_SEARCH_LINES: usize = 15;
const DATE_SEARCH_LINES: usize = 3;

lazy_static! {
    static ref PLANNED_CUTS_HEADER: Regex = RegexBuilder::new(r"планиран")
        .case_insensitive(true)
        .build()
        .expect("PLANNED_CUTS_HEADER regex to compile");
    static ref DATE: Regex = Regex::new(r"\d{2}\.\d{2}\.\d{4}").expect("DATE regex to compile");
}

pub(super) struct DeclaredDate {
    pub(super) date: NaiveDate,
    /// Non blank lines above the body, whitespace collapsed. Pages repeat
    /// them as running headers.
    pub(super) preamble: Vec<String>,
    pub(super) body: String,
}

/// Finds the date the document is declared for. The body starts on the
/// line after the date, unless the date was read off a row, in which case
/// that row belongs to the body.
pub(super) fn find(text: &str) -> Option<DeclaredDate> {
    let lines = text.lines().collect_vec();
    let non_blank = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect_vec();

    let header = non_blank
        .iter()
        .take(HEADER_SEARCH_LINES)
        .position(|(_, line)| PLANNED_CUTS_HEADER.is_match(line))?;

    let (index, date) = non_blank
        .iter()
        .skip(header)
        .take(DATE_SEARCH_LINES)
        .find_map(|(index, line)| first_date(line).map(|date| (*index, date)))?;

    let body_start = if row::has_time_range(lines[index]) {
        index
    } else {
        index + 1
    };
    let preamble = lines[..body_start]
        .iter()
        .map(|line| line.split_whitespace().join(" "))
        .filter(|line| !line.is_empty())
        .collect_vec();

    Some(DeclaredDate {
        date,
        preamble,
        body: lines[body_start..].join("\n"),
    })
}

fn first_date(line: &str) -> Option<NaiveDate> {
    DATE.find_iter(line)
        .find_map(|token| NaiveDate::parse_from_str(token.as_str(), "%d.%m.%Y").ok())
}
