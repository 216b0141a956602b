use chrono::NaiveDate;
use std::path::PathBuf;

use super::FetchError;

/// One file per declared date. A file being present is all it takes to
/// count as cached; there is no expiry.
#[derive(Debug, Clone)]
pub struct PdfCache {
    directory: PathBuf,
}

impl PdfCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.directory
            .join(format!("cuts_{}.pdf", date.format("%d-%m-%Y")))
    }

    pub async fn lookup(&self, date: NaiveDate) -> Option<PathBuf> {
        let path = self.path_for(date);
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        metadata.is_file().then_some(path)
    }

    pub async fn store(&self, date: NaiveDate, file_bytes: &[u8]) -> Result<PathBuf, FetchError> {
        let path = self.path_for(date);
        let cache_error = |source| FetchError::Cache {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(cache_error)?;

        // Written aside first so an interrupted download never looks cached.
        let partial = path.with_extension("pdf.part");
        tokio::fs::write(&partial, file_bytes)
            .await
            .map_err(cache_error)?;
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(cache_error)?;

        Ok(path)
    }
}
