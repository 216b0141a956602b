use crate::pdf_reader::OutageRecord;
use chrono::{NaiveDate, NaiveTime};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use shared_kernel::date_time::time_frame::TimeFrame;
use std::fmt::Display;

lazy_static! {
    /// `08:30 - 16:30` with any dash variant, or the
    /// `18.11.2025 08:30 18.11.2025 16:30` pair layout.
    static ref TIME_RANGE: Regex = Regex::new(
        r"(?:\d{2}\.\d{2}\.\d{4}\s+)?(\d{1,2}:\d{2})(?:\s*[-‐‑‒–—―−]\s*|\s+\d{2}\.\d{2}\.\d{4}\s+)(\d{1,2}:\d{2})"
    )
    .expect("TIME_RANGE regex to compile");
    static ref FIELD_LABEL: Regex =
        Regex::new(r"(?:^|\s)([Оо]бласт|[Оо]бщина|[Оо]бл\.|[Оо]бщ\.|[Чч]аст от)")
            .expect("FIELD_LABEL regex to compile");
    static ref COLUMN_SEPARATOR: Regex =
        Regex::new(r"\t|\s*\|\s*|\s{2,}").expect("COLUMN_SEPARATOR regex to compile");
    /// Something shaped like a time range that [`TIME_RANGE`] rejects,
    /// e.g. `08:3 - 10:00` or `8.30 - 10:00`.
    static ref TIME_RANGE_LIKE: Regex =
        Regex::new(r"\d{1,2}[:.]\d{1,2}\s*[-‐‑‒–—―−]\s*\d{1,2}[:.]\d{1,2}")
            .expect("TIME_RANGE_LIKE regex to compile");
    static ref SETTLEMENT_PREFIX: Regex =
        Regex::new(r"(?:^|\s)(?:с|гр|ж\.к|кв)\.").expect("SETTLEMENT_PREFIX regex to compile");
    static ref COLUMN_HEADER: Regex = Regex::new(
        r"(?i)\b(?:населено\s+място|населени\s+места|област|община|дата|време|начало|край)\b"
    )
    .expect("COLUMN_HEADER regex to compile");
}

#[derive(Debug, PartialEq, Eq)]
pub(super) struct Row {
    location: String,
    region: Option<String>,
    municipality: Option<String>,
    time_frame: TimeFrame<NaiveTime>,
}

impl Row {
    /// Fills in region and municipality the row itself leaves out.
    pub(super) fn with_context(self, context: &Context) -> Self {
        Self {
            region: self.region.or_else(|| context.region.clone()),
            municipality: self.municipality.or_else(|| context.municipality.clone()),
            ..self
        }
    }

    pub(super) fn into_record(self, date: NaiveDate) -> OutageRecord {
        OutageRecord {
            date,
            location: self.location,
            region: self.region,
            municipality: self.municipality,
            time_frame: self.time_frame,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum RowError {
    NoTimeRange,
    InvalidTime(String),
    MissingLocation,
}

impl Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::NoTimeRange => write!(f, "no time range"),
            RowError::InvalidTime(value) => write!(f, "invalid time {value}"),
            RowError::MissingLocation => write!(f, "no location before the time range"),
        }
    }
}

pub(super) fn has_time_range(line: &str) -> bool {
    TIME_RANGE.is_match(line)
}

pub(super) fn looks_like_time_range(line: &str) -> bool {
    TIME_RANGE_LIKE.is_match(line)
}

/// Label words and settlement prefixes are lowercase while place names are
/// uppercase, so a line is considered row text when nothing else is
/// lowercase. Uppercase column headers are not row text.
pub(super) fn looks_like_row_text(line: &str) -> bool {
    let without_labels = FIELD_LABEL.replace_all(line, " ");
    let names = SETTLEMENT_PREFIX.replace_all(&without_labels, " ");
    names.chars().any(char::is_alphabetic)
        && !names.chars().any(char::is_lowercase)
        && !COLUMN_HEADER.is_match(&names)
}

/// Region and municipality announced by a labelled line, in effect for the
/// rows that follow until another label replaces them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct Context {
    region: Option<String>,
    municipality: Option<String>,
}

impl Context {
    /// A labelled value runs up to the next label, the time range, or the
    /// first word with a lowercase letter (`община ГЪРМЕН За индивидуална ...`).
    pub(super) fn update(&mut self, line: &str) {
        let line = match TIME_RANGE.find(line) {
            Some(range) => &line[..range.start()],
            None => line,
        };
        let labels = FIELD_LABEL
            .captures_iter(line)
            .filter_map(|captures| captures.get(1))
            .collect_vec();

        for (index, label) in labels.iter().enumerate() {
            let end = labels
                .get(index + 1)
                .map(|next| next.start())
                .unwrap_or(line.len());
            let Some(value) = leading_names(&line[label.end()..end]) else {
                continue;
            };
            let name = label.as_str().to_lowercase();
            if name.starts_with("обл") {
                self.region = Some(value);
            } else if name.starts_with("общ") {
                self.municipality = Some(value);
            }
        }
    }
}

fn leading_names(value: &str) -> Option<String> {
    let names = value
        .split_whitespace()
        .take_while(|word| !word.chars().any(char::is_lowercase))
        .join(" ");
    clean(&names)
}

pub(super) fn parse(text: &str) -> Result<Row, RowError> {
    let captures = TIME_RANGE
        .captures_iter(text)
        .last()
        .ok_or(RowError::NoTimeRange)?;
    let (Some(whole), Some(from), Some(to)) = (captures.get(0), captures.get(1), captures.get(2))
    else {
        return Err(RowError::NoTimeRange);
    };

    let time_frame = TimeFrame {
        from: parse_time(from.as_str())?,
        to: parse_time(to.as_str())?,
    };

    let fields = Fields::split(&text[..whole.start()]);
    let location = fields.location.ok_or(RowError::MissingLocation)?;

    Ok(Row {
        location,
        region: fields.region,
        municipality: fields.municipality,
        time_frame,
    })
}

fn parse_time(value: &str) -> Result<NaiveTime, RowError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| RowError::InvalidTime(value.to_owned()))
}

fn clean(value: &str) -> Option<String> {
    let collapsed = value.split_whitespace().join(" ");
    let trimmed = collapsed
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '|') || c.is_whitespace())
        .to_owned();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Fields {
    location: Option<String>,
    region: Option<String>,
    municipality: Option<String>,
}

impl Fields {
    fn split(prefix: &str) -> Self {
        let labels = FIELD_LABEL
            .captures_iter(prefix)
            .filter_map(|captures| captures.get(1))
            .collect_vec();

        let Some(first_label) = labels.first() else {
            return Self::split_columns(prefix);
        };

        let mut fields = Fields::default();
        let mut labelled_location = None;
        for (index, label) in labels.iter().enumerate() {
            let end = labels
                .get(index + 1)
                .map(|next| next.start())
                .unwrap_or(prefix.len());
            let value = clean(&prefix[label.end()..end]);
            let name = label.as_str().to_lowercase();
            if name.starts_with("обл") {
                fields.region = fields.region.or(value);
            } else if name.starts_with("общ") {
                fields.municipality = fields.municipality.or(value);
            } else {
                labelled_location = labelled_location.or(value);
            }
        }
        fields.location = labelled_location.or_else(|| clean(&prefix[..first_label.start()]));
        fields
    }

    /// Location, region and municipality in that order. Anything in front
    /// of the last two columns belongs to the location.
    fn split_columns(prefix: &str) -> Self {
        let columns = COLUMN_SEPARATOR
            .split(prefix.trim())
            .filter_map(clean)
            .collect_vec();

        match columns.as_slice() {
            [] => Fields::default(),
            [location] => Fields {
                location: Some(location.clone()),
                ..Default::default()
            },
            [location, region] => Fields {
                location: Some(location.clone()),
                region: Some(region.clone()),
                municipality: None,
            },
            [location @ .., region, municipality] => Fields {
                location: Some(location.join(" ")),
                region: Some(region.clone()),
                municipality: Some(municipality.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::pdf_reader::content_extractor::row::{
        has_time_range, looks_like_row_text, looks_like_time_range, parse, Context, Fields,
        RowError,
    };
    use chrono::NaiveTime;
    use rstest::rstest;

    fn time(value: &str) -> NaiveTime {
        NaiveTime::parse_from_str(value, "%H:%M").unwrap()
    }

    #[rstest]
    #[case("08:30 - 16:30")]
    #[case("08:30-16:30")]
    #[case("08:30 – 16:30")]
    #[case("08:30 — 16:30")]
    #[case("8:30 − 16:30")]
    #[case("18.11.2025 08:30 18.11.2025 16:30")]
    fn test_time_range_variants(#[case] range: &str) {
        let row = parse(&format!("ГЪРМЕН  БЛАГОЕВГРАД  ГЪРМЕН  {range}")).unwrap();
        assert_eq!(row.location, "ГЪРМЕН");
        assert_eq!(row.time_frame.from, time("08:30"));
        assert_eq!(row.time_frame.to, time("16:30"));
    }

    #[rstest]
    #[case("ГЪРМЕН", Some("ГЪРМЕН"), None, None)]
    #[case("ГЪРМЕН  БЛАГОЕВГРАД", Some("ГЪРМЕН"), Some("БЛАГОЕВГРАД"), None)]
    #[case("ГЪРМЕН\tБЛАГОЕВГРАД\tГЪРМЕН", Some("ГЪРМЕН"), Some("БЛАГОЕВГРАД"), Some("ГЪРМЕН"))]
    #[case("ГЪРМЕН | БЛАГОЕВГРАД | ГЪРМЕН", Some("ГЪРМЕН"), Some("БЛАГОЕВГРАД"), Some("ГЪРМЕН"))]
    #[case("с. ДЕБРЕН  ЦЕНТЪР  БЛАГОЕВГРАД  ГЪРМЕН", Some("с. ДЕБРЕН ЦЕНТЪР"), Some("БЛАГОЕВГРАД"), Some("ГЪРМЕН"))]
    #[case("ГЪРМЕН обл. БЛАГОЕВГРАД общ. ГЪРМЕН", Some("ГЪРМЕН"), Some("БЛАГОЕВГРАД"), Some("ГЪРМЕН"))]
    #[case("ГЪРМЕН община ГЪРМЕН", Some("ГЪРМЕН"), None, Some("ГЪРМЕН"))]
    #[case("област БЛАГОЕВГРАД Част от ГЪРМЕН", Some("ГЪРМЕН"), Some("БЛАГОЕВГРАД"), None)]
    #[case("", None, None, None)]
    fn test_field_split(
        #[case] prefix: &str,
        #[case] location: Option<&str>,
        #[case] region: Option<&str>,
        #[case] municipality: Option<&str>,
    ) {
        let fields = Fields::split(prefix);
        assert_eq!(fields.location.as_deref(), location);
        assert_eq!(fields.region.as_deref(), region);
        assert_eq!(fields.municipality.as_deref(), municipality);
    }

    #[test]
    fn test_whitespace_inside_fields_is_collapsed() {
        let row = parse("  ЦЕНТРАЛНА   ГР.ЧАСТ\tСОФИЯ-ГРАД\tСЕРДИКА 08:30 - 16:30  ").unwrap();
        assert_eq!(row.location, "ЦЕНТРАЛНА ГР.ЧАСТ");
        assert_eq!(row.region.as_deref(), Some("СОФИЯ-ГРАД"));
        assert_eq!(row.municipality.as_deref(), Some("СЕРДИКА"));
    }

    #[test]
    fn test_uppercase_location_label_lookalikes_stay_in_the_location() {
        let row = parse("ЦЕНТРАЛНА ГР.ЧАСТ СОФИЯ ОБЩ.СЕРДИКА  СОФИЯ-ГРАД  СЕРДИКА  08:30 - 16:30")
            .unwrap();
        assert_eq!(row.location, "ЦЕНТРАЛНА ГР.ЧАСТ СОФИЯ ОБЩ.СЕРДИКА");
    }

    #[rstest]
    #[case("ГЪРМЕН  25:99 - 10:00", RowError::InvalidTime("25:99".to_string()))]
    #[case("ГЪРМЕН  08:30 - 10:75", RowError::InvalidTime("10:75".to_string()))]
    #[case("08:30 - 10:00", RowError::MissingLocation)]
    #[case("ГЪРМЕН  БЛАГОЕВГРАД", RowError::NoTimeRange)]
    fn test_rejected_rows(#[case] text: &str, #[case] expected: RowError) {
        assert_eq!(parse(text), Err(expected));
    }

    #[rstest]
    #[case("ЦЕНТРАЛНА ГР.ЧАСТ", true)]
    #[case("област СОФИЯ-ГРАД Част от", true)]
    #[case("Населено място  Област  Община", false)]
    #[case("Стр. 1 от 3", false)]
    #[case("12", false)]
    #[case("с. ДЕБРЕН", true)]
    #[case("гр. БАНКЯ", true)]
    #[case("ж.к. ЛЮЛИН 5", true)]
    #[case("НАСЕЛЕНО МЯСТО  ОБЛАСТ  ОБЩИНА", false)]
    #[case("ДАТА  НАЧАЛО  КРАЙ", false)]
    fn test_row_text_detection(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(looks_like_row_text(line), expected);
    }

    #[test]
    fn test_time_range_detection() {
        assert!(has_time_range("ГЪРМЕН 08:30 - 16:30"));
        assert!(!has_time_range("Стр. 1 от 3"));
    }

    #[rstest]
    #[case("ДРАГОМАН  СОФИЯ  ДРАГОМАН  08:3 - 10:00", true)]
    #[case("ДРАГОМАН  8.30 - 10:00", true)]
    #[case("ДРАГОМАН  08:30 - 10:00", true)]
    #[case("ДРАГОМАН  СОФИЯ", false)]
    #[case("Стр. 1 от 3", false)]
    fn test_malformed_time_range_detection(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(looks_like_time_range(line), expected);
    }

    #[test]
    fn test_context_is_read_from_labels_and_carried() {
        let mut context = Context::default();

        context.update("община ГЪРМЕН За индивидуална справка: 0700 10 010");
        context.update("област БЛАГОЕВГРАД Част от ГЪРМЕН 18.11.2025 08:30 18.11.2025 16:30");
        context.update("Част от ДЕБРЕН 18.11.2025 09:00 18.11.2025 10:00");

        assert_eq!(context.region.as_deref(), Some("БЛАГОЕВГРАД"));
        assert_eq!(context.municipality.as_deref(), Some("ГЪРМЕН"));
    }

    #[test]
    fn test_context_only_fills_what_the_row_leaves_out() {
        let mut context = Context::default();
        context.update("област БЛАГОЕВГРАД община ГЪРМЕН");

        let row = parse("ДЕБРЕН  ПИРИН  08:30 - 16:30")
            .unwrap()
            .with_context(&context);

        assert_eq!(row.region.as_deref(), Some("ПИРИН"));
        assert_eq!(row.municipality.as_deref(), Some("ГЪРМЕН"));
    }
}
