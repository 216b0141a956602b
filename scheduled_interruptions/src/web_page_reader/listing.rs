use chrono::NaiveDate;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use super::DocumentDescriptor;

lazy_static! {
    static ref LIST_ITEM: Regex =
        Regex::new(r#"(?s)<li[^>]*class\s*=\s*"[^"]*list-group-item[^"]*"[^>]*>(.*?)</li>"#)
            .expect("LIST_ITEM regex to compile");
    static ref PREVIEW_LINK: Regex =
        Regex::new(r#"(?s)<a[^>]*href\s*=\s*"[^"]*previewdoc\((\d+)\)[^"]*"[^>]*>(.*?)</a>"#)
            .expect("PREVIEW_LINK regex to compile");
    static ref BADGE: Regex =
        Regex::new(r#"(?s)<span[^>]*class\s*=\s*"[^"]*badge[^"]*"[^>]*>(.*?)</span>"#)
            .expect("BADGE regex to compile");
    static ref TAG: Regex = Regex::new(r"<[^>]*>").expect("TAG regex to compile");
}

/// Reads the document list the site renders for `action=showpdf`,
/// keeping the order the site lists them in.
pub(super) fn parse(html: &str) -> Vec<DocumentDescriptor> {
    LIST_ITEM
        .captures_iter(html)
        .filter_map(|item| item.get(1))
        .filter_map(|item| {
            let item = item.as_str();
            let link = PREVIEW_LINK.captures(item)?;
            let doc_id = link.get(1)?.as_str().to_owned();
            let title = text_of(link.get(2)?.as_str());

            let badge = BADGE.captures(item).and_then(|badge| badge.get(1));
            let date = badge
                .map(|badge| text_of(badge.as_str()))
                .and_then(|badge| NaiveDate::parse_from_str(&badge, "%d.%m.%Y").ok());
            match date {
                Some(date) => Some(DocumentDescriptor {
                    doc_id,
                    title,
                    date,
                }),
                None => {
                    warn!(%doc_id, %title, "Skipping listed document without a date");
                    None
                }
            }
        })
        .collect()
}

fn text_of(fragment: &str) -> String {
    TAG.replace_all(fragment, " ").split_whitespace().join(" ")
}
