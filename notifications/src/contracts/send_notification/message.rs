use crate::contracts::send_notification::AffectedLocation;
use itertools::Itertools;

const SOURCE_LINK: &str = "https://info.ermzapad.bg/webint/vok/avplan.php?PLAN=FYI";
const TITLE: &str = "PLANNED ELECTRICITY CUTS - NOTIFICATION";
const RULE_WIDTH: usize = 70;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub plain: String,
    pub html: String,
}

impl NotificationMessage {
    pub fn generate(locations: &[AffectedLocation]) -> Self {
        let plain = format_plain(locations);
        let html = format_html(&plain);
        Self {
            subject: subject(locations),
            plain,
            html,
        }
    }
}

fn subject(locations: &[AffectedLocation]) -> String {
    let dates = locations.iter().map(|location| location.date).unique().count();
    let noun = if dates == 1 { "date" } else { "dates" };
    format!("Planned electricity cuts - {dates} {noun} affected")
}

/// Chronological by date, then alphabetical by location. Ties keep the
/// order they were extracted in.
fn format_plain(locations: &[AffectedLocation]) -> String {
    let mut lines = vec![TITLE.to_string(), "=".repeat(RULE_WIDTH), String::new()];

    let sorted = locations
        .iter()
        .sorted_by(|a, b| a.date.cmp(&b.date).then_with(|| a.location.cmp(&b.location)));
    let by_date = sorted.group_by(|location| location.date);

    for (date, group) in &by_date {
        lines.push(format!("Date: {}", date.format("%d.%m.%Y")));
        lines.push("-".repeat(RULE_WIDTH));
        for location in group {
            lines.push(format!("Location: {}", location.location));
            lines.push(format!(
                "Region: {}",
                location.region.as_deref().unwrap_or("-")
            ));
            lines.push(format!(
                "Municipality: {}",
                location.municipality.as_deref().unwrap_or("-")
            ));
            lines.push(format!(
                "Time: {} - {}",
                location.time_frame.from.format("%H:%M"),
                location.time_frame.to.format("%H:%M")
            ));
            lines.push(String::new());
        }
    }

    lines.push("=".repeat(RULE_WIDTH));
    lines.push(format!("Source: {SOURCE_LINK}"));
    lines.join("\n")
}

fn format_html(plain: &str) -> String {
    let body = plain
        .lines()
        .map(|line| {
            let text = escape(line);
            if line.starts_with("===") {
                "<hr/>".to_string()
            } else if line.starts_with("---") {
                "<hr style=\"border-style: dashed;\"/>".to_string()
            } else if line == TITLE {
                format!("<h1 style=\"color: #1976d2;\">{text}</h1>")
            } else if line.starts_with("Date:") {
                format!("<h2 style=\"color: #d32f2f;\">{text}</h2>")
            } else if line.starts_with("Location:") {
                format!("<p style=\"margin: 5px 0;\"><strong>{text}</strong></p>")
            } else if ["Region:", "Municipality:", "Time:"]
                .iter()
                .any(|label| line.starts_with(label))
            {
                format!("<p style=\"margin: 2px 0 2px 20px; color: #555;\">{text}</p>")
            } else if line.trim().is_empty() {
                "<br/>".to_string()
            } else {
                format!("<p style=\"margin: 5px 0;\">{text}</p>")
            }
        })
        .join("");
    format!("<html><body style=\"font-family: Arial, sans-serif;\">{body}</body></html>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use crate::contracts::send_notification::message::NotificationMessage;
    use crate::contracts::send_notification::AffectedLocation;
    use chrono::{NaiveDate, NaiveTime};
    use shared_kernel::date_time::time_frame::TimeFrame;

    fn location(day: u32, name: &str, region: Option<&str>) -> AffectedLocation {
        AffectedLocation {
            date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            location: name.to_string(),
            region: region.map(str::to_string),
            municipality: Some("СЕРДИКА".to_string()),
            time_frame: TimeFrame {
                from: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
                to: NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
            },
        }
    }

    #[test]
    fn test_plain_message_is_grouped_by_date_then_location() {
        let locations = vec![
            location(19, "ЛОЗЕН", Some("СОФИЯ-ГРАД")),
            location(18, "КОСТИНБРОД", None),
            location(18, "БАНКЯ", Some("СОФИЯ-ГРАД")),
        ];

        let message = NotificationMessage::generate(&locations);

        let rule = "=".repeat(70);
        let dashes = "-".repeat(70);
        let expected = [
            "PLANNED ELECTRICITY CUTS - NOTIFICATION",
            rule.as_str(),
            "",
            "Date: 18.11.2025",
            dashes.as_str(),
            "Location: БАНКЯ",
            "Region: СОФИЯ-ГРАД",
            "Municipality: СЕРДИКА",
            "Time: 08:30 - 16:30",
            "",
            "Location: КОСТИНБРОД",
            "Region: -",
            "Municipality: СЕРДИКА",
            "Time: 08:30 - 16:30",
            "",
            "Date: 19.11.2025",
            dashes.as_str(),
            "Location: ЛОЗЕН",
            "Region: СОФИЯ-ГРАД",
            "Municipality: СЕРДИКА",
            "Time: 08:30 - 16:30",
            "",
            rule.as_str(),
            "Source: https://info.ermzapad.bg/webint/vok/avplan.php?PLAN=FYI",
        ]
        .join("\n");
        assert_eq!(message.plain, expected);
    }

    #[test]
    fn test_subject_counts_distinct_dates() {
        let one_day = NotificationMessage::generate(&[
            location(18, "БАНКЯ", None),
            location(18, "ЛОЗЕН", None),
        ]);
        let two_days = NotificationMessage::generate(&[
            location(18, "БАНКЯ", None),
            location(19, "БАНКЯ", None),
        ]);

        assert_eq!(one_day.subject, "Planned electricity cuts - 1 date affected");
        assert_eq!(two_days.subject, "Planned electricity cuts - 2 dates affected");
    }

    #[test]
    fn test_html_mirrors_the_plain_text_and_escapes_it() {
        let message = NotificationMessage::generate(&[location(18, "БАНКЯ <ЦЕНТЪР>", None)]);

        assert!(message.html.starts_with("<html><body"));
        assert!(message.html.ends_with("</body></html>"));
        assert!(message
            .html
            .contains("<h2 style=\"color: #d32f2f;\">Date: 18.11.2025</h2>"));
        assert!(message
            .html
            .contains("<strong>Location: БАНКЯ &lt;ЦЕНТЪР&gt;</strong>"));
        assert!(!message.html.contains("<ЦЕНТЪР>"));
    }
}
