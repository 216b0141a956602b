use super::row;
use itertools::Itertools;
use tracing::debug;

/// Physical lines that together make up one candidate row. The last line
/// always carries the time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLineGroup {
    lines: Vec<String>,
    skipped: Vec<String>,
}

impl CandidateLineGroup {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines dropped between the previous group and this one, in order.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Reassembles rows that the PDF to text conversion split over several
/// lines. Layout specific, so row parsing only ever sees the groups.
///
/// `preamble` holds the lines above the body. Pages repeat them, and a
/// repeat is never part of a row.
pub trait LineAssembler: Send + Sync {
    fn groups(&self, text: &str, preamble: &[String]) -> Vec<CandidateLineGroup>;
}

/// Joins uppercase fragments onto the next line that has a time range.
/// A row may span at most `max_lines` physical lines; fragments that would
/// exceed it are abandoned.
pub struct WrappedRowAssembler {
    max_lines: usize,
}

impl WrappedRowAssembler {
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines: max_lines.max(1),
        }
    }
}

impl Default for WrappedRowAssembler {
    fn default() -> Self {
        Self::new(3)
    }
}

impl LineAssembler for WrappedRowAssembler {
    fn groups(&self, text: &str, preamble: &[String]) -> Vec<CandidateLineGroup> {
        let mut groups = vec![];
        let mut pending: Vec<String> = vec![];
        let mut skipped: Vec<String> = vec![];

        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if row::has_time_range(line) {
                pending.push(line.to_owned());
                groups.push(CandidateLineGroup {
                    lines: std::mem::take(&mut pending),
                    skipped: std::mem::take(&mut skipped),
                });
                continue;
            }

            // A row whose time range is unreadable ends there. Its fragments
            // must not wrap onto the next row.
            if row::looks_like_time_range(line) {
                debug!(row = %line, fragments = ?pending, "Dropping row with a malformed time range");
                skipped.append(&mut pending);
                skipped.push(line.to_owned());
                continue;
            }

            let repeats_preamble = preamble.contains(&line.split_whitespace().join(" "));
            if repeats_preamble || !row::looks_like_row_text(line) {
                if !pending.is_empty() {
                    debug!(fragments = ?pending, "Dropping fragments followed by non row text");
                }
                skipped.append(&mut pending);
                skipped.push(line.to_owned());
                continue;
            }

            if pending.len() + 1 >= self.max_lines {
                debug!(fragments = ?pending, "Abandoning fragments over the line limit");
                skipped.append(&mut pending);
            }
            if self.max_lines > 1 {
                pending.push(line.to_owned());
            } else {
                skipped.push(line.to_owned());
            }
        }

        if !pending.is_empty() {
            debug!(fragments = ?pending, "Trailing fragments without a time range");
        }
        groups
    }
}
