use crate::pdf_reader::{ExtractionError, OutageRecord};
use itertools::Itertools;
use tracing::{debug, info};

mod declared_date;
pub(crate) mod line_groups;
mod row;

use line_groups::LineAssembler;

pub fn extract(
    text: &str,
    assembler: &dyn LineAssembler,
) -> Result<Vec<OutageRecord>, ExtractionError> {
    let declared = declared_date::find(text).ok_or(ExtractionError::MissingDate)?;
    let date = declared.date;

    // Region and municipality labels hold for every row below them.
    let mut context = row::Context::default();
    let records = assembler
        .groups(&declared.body, &declared.preamble)
        .into_iter()
        .filter_map(|group| {
            for line in group.skipped() {
                context.update(line);
            }
            let text = group.text();
            context.update(&text);
            match row::parse(&text) {
                Ok(row) => Some(row.with_context(&context).into_record(date)),
                Err(reason) => {
                    debug!(%reason, row = %text, "Skipping candidate row");
                    None
                }
            }
        })
        .collect_vec();

    info!(
        date = %date.format("%d.%m.%Y"),
        "{} cuts found",
        records.len()
    );
    Ok(records)
}
