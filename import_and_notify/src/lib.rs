pub mod config;

use crate::config::ConfigError;
use itertools::Itertools;
use location_subscription::contracts::filter_affected_locations::FilterAffectedLocationsInteractor;
use notifications::contracts::send_notification::{AffectedLocation, Notifier, NotifyError};
use scheduled_interruptions::pdf_reader::{OutageRecord, PdfReader};
use scheduled_interruptions::web_page_reader::{DocumentSource, FetchError};
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::{error, info, warn};

#[derive(ThisError, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => 2,
            RunError::Fetch(_) => 3,
            RunError::Notify(_) => 4,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub documents_listed: usize,
    pub documents_processed: usize,
    pub cuts_found: usize,
    pub matching_cuts: usize,
    pub notification_sent: bool,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Documents listed: {}", self.documents_listed)?;
        writeln!(f, "Documents processed: {}", self.documents_processed)?;
        writeln!(f, "Cuts found: {}", self.cuts_found)?;
        writeln!(f, "Cuts in monitored locations: {}", self.matching_cuts)?;
        write!(
            f,
            "Notification sent: {}",
            if self.notification_sent { "yes" } else { "no" }
        )
    }
}

pub fn convert_to_affected_locations(records: Vec<OutageRecord>) -> Vec<AffectedLocation> {
    records
        .into_iter()
        .map(|record| AffectedLocation {
            date: record.date,
            location: record.location,
            region: record.region,
            municipality: record.municipality,
            time_frame: record.time_frame,
        })
        .collect_vec()
}

pub struct CutNotifier {
    source: Arc<dyn DocumentSource>,
    reader: PdfReader,
    notifier: Arc<dyn Notifier>,
    monitored_cities: Vec<String>,
    check_days_ahead: usize,
}

impl CutNotifier {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        reader: PdfReader,
        notifier: Arc<dyn Notifier>,
        monitored_cities: Vec<String>,
        check_days_ahead: usize,
    ) -> Self {
        Self {
            source,
            reader,
            notifier,
            monitored_cities,
            check_days_ahead,
        }
    }

    /// One full check. A document that cannot be downloaded or read is
    /// skipped; the run only fails on fetch when nothing at all could be
    /// downloaded.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let descriptors = self.source.list_upcoming(self.check_days_ahead).await?;
        let mut summary = RunSummary {
            documents_listed: descriptors.len(),
            ..Default::default()
        };

        let mut documents = vec![];
        for descriptor in descriptors.iter() {
            match self.source.fetch(descriptor).await {
                Ok(document) => documents.push(document),
                Err(err) => {
                    error!(doc_id = %descriptor.doc_id, "Failed to fetch document: {err:?}")
                }
            }
        }
        if !descriptors.is_empty() && documents.is_empty() {
            return Err(FetchError::NoDocumentsRetrieved {
                attempted: descriptors.len(),
            }
            .into());
        }

        let mut records = vec![];
        for document in documents.iter() {
            match self.reader.extract_file(&document.local_path).await {
                Ok(extracted) => {
                    summary.documents_processed += 1;
                    records.extend(extracted);
                }
                Err(err) => warn!(
                    path = %document.local_path.display(),
                    "Skipping document: {err:?}"
                ),
            }
        }
        summary.cuts_found = records.len();

        let affected = FilterAffectedLocationsInteractor::filter_affected_locations(
            &records,
            &self.monitored_cities,
        );
        summary.matching_cuts = affected.len();

        if affected.is_empty() {
            info!("No cuts affect the monitored locations");
            return Ok(summary);
        }

        self.notifier
            .notify(&convert_to_affected_locations(affected))
            .await?;
        summary.notification_sent = true;
        Ok(summary)
    }
}
