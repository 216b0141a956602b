use itertools::Itertools;
use scheduled_interruptions::pdf_reader::OutageRecord;

pub struct FilterAffectedLocationsInteractor;

impl FilterAffectedLocationsInteractor {
    /// Keeps the records whose location is one of `monitored_cities`.
    ///
    /// Matching is exact. Only the record's location is trimmed, the
    /// configured names are taken as written. Order is preserved and
    /// duplicates are kept.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn filter_affected_locations(
        records: &[OutageRecord],
        monitored_cities: &[String],
    ) -> Vec<OutageRecord> {
        let affected = records
            .iter()
            .filter(|record| {
                let location = record.location.trim();
                monitored_cities.iter().any(|city| city == location)
            })
            .cloned()
            .collect_vec();
        tracing::debug!(
            "{} of {} records affect monitored locations",
            affected.len(),
            records.len()
        );
        affected
    }
}
