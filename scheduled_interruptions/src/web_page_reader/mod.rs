mod cache;
mod listing;

pub use cache::PdfCache;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_kernel::http_client::{HttpClient, HttpClientError};
use std::path::PathBuf;
use thiserror::Error as ThisError;
use tracing::info;
use url::Url;

// Same endpoint the site's own scripts post to.
const AVPLAN_PATH: &str = "webint/vok/avplan.php";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDescriptor {
    pub doc_id: String,
    pub title: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub declared_date: NaiveDate,
    pub local_path: PathBuf,
}

#[derive(ThisError, Debug)]
pub enum FetchError {
    #[error("invalid source url")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] HttpClientError),
    #[error("unexpected response for document {doc_id}: {reason}")]
    UnexpectedResponse { doc_id: String, reason: String },
    #[error("failed to write {path} to the cache")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("none of the {attempted} listed documents could be retrieved")]
    NoDocumentsRetrieved { attempted: usize },
}

#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn list_upcoming(&self, days_ahead: usize)
        -> Result<Vec<DocumentDescriptor>, FetchError>;
    async fn fetch(&self, descriptor: &DocumentDescriptor) -> Result<SourceDocument, FetchError>;
}

pub struct WebPageReader {
    endpoint: Url,
    cache: PdfCache,
}

impl WebPageReader {
    pub fn new(source_url: &Url, cache: PdfCache) -> Result<Self, FetchError> {
        Ok(Self {
            endpoint: source_url.join(AVPLAN_PATH)?,
            cache,
        })
    }
}

#[async_trait]
impl DocumentSource for WebPageReader {
    #[tracing::instrument(err, skip(self), level = "info")]
    async fn list_upcoming(
        &self,
        days_ahead: usize,
    ) -> Result<Vec<DocumentDescriptor>, FetchError> {
        let page = HttpClient::post_form_text(&self.endpoint, &[("action", "showpdf")]).await?;
        let documents = listing::parse(&page);
        info!("{} documents listed", documents.len());
        Ok(documents.into_iter().take(days_ahead).collect())
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn fetch(&self, descriptor: &DocumentDescriptor) -> Result<SourceDocument, FetchError> {
        if let Some(local_path) = self.cache.lookup(descriptor.date).await {
            info!(path = %local_path.display(), "Using cached pdf");
            return Ok(SourceDocument {
                declared_date: descriptor.date,
                local_path,
            });
        }

        let file_bytes = HttpClient::post_form_bytes(
            &self.endpoint,
            &[("action", "showdocid"), ("doc_id", &descriptor.doc_id)],
        )
        .await?;

        if !file_bytes.starts_with(b"%PDF") {
            return Err(FetchError::UnexpectedResponse {
                doc_id: descriptor.doc_id.clone(),
                reason: "response body is not a pdf".to_string(),
            });
        }

        let local_path = self.cache.store(descriptor.date, &file_bytes).await?;
        info!(path = %local_path.display(), "Saved pdf");
        Ok(SourceDocument {
            declared_date: descriptor.date,
            local_path,
        })
    }
}
