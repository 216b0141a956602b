mod content_extractor;

pub use content_extractor::line_groups::{CandidateLineGroup, LineAssembler, WrappedRowAssembler};

use chrono::{NaiveDate, NaiveTime};
use shared_kernel::date_time::time_frame::TimeFrame;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error as ThisError;

/// One announced cut. Every record produced from a document carries the
/// date the document was declared for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutageRecord {
    pub date: NaiveDate,
    pub location: String,
    pub region: Option<String>,
    pub municipality: Option<String>,
    pub time_frame: TimeFrame<NaiveTime>,
}

impl Display for OutageRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} - {} | {} | {} | {}",
            self.date.format("%d.%m.%Y"),
            self.time_frame.from.format("%H:%M"),
            self.time_frame.to.format("%H:%M"),
            self.location,
            self.region.as_deref().unwrap_or("-"),
            self.municipality.as_deref().unwrap_or("-"),
        )
    }
}

#[derive(ThisError, Debug)]
pub enum ExtractionError {
    #[error("no planned cuts date (DD.MM.YYYY) found near the top of the document")]
    MissingDate,
    #[error("failed to extract text from the pdf")]
    UnreadablePdf(#[source] pdf_extract::OutputError),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Turns raw document bytes into text, pages in order and newline separated.
pub trait TextReader: Send + Sync {
    fn read_text(&self, file_bytes: &[u8]) -> Result<String, ExtractionError>;
}

pub struct PdfTextReader;

impl TextReader for PdfTextReader {
    fn read_text(&self, file_bytes: &[u8]) -> Result<String, ExtractionError> {
        pdf_extract::extract_text_from_mem(file_bytes).map_err(ExtractionError::UnreadablePdf)
    }
}

pub struct PdfReader {
    text_reader: Arc<dyn TextReader>,
    assembler: Arc<dyn LineAssembler>,
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfReader {
    pub fn new() -> Self {
        Self::with(
            Arc::new(PdfTextReader),
            Arc::new(WrappedRowAssembler::default()),
        )
    }

    pub fn with(text_reader: Arc<dyn TextReader>, assembler: Arc<dyn LineAssembler>) -> Self {
        Self {
            text_reader,
            assembler,
        }
    }

    #[tracing::instrument(err, skip_all, level = "info")]
    pub fn extract(&self, document_bytes: &[u8]) -> Result<Vec<OutageRecord>, ExtractionError> {
        let text = self.text_reader.read_text(document_bytes)?;
        content_extractor::extract(&text, self.assembler.as_ref())
    }

    pub async fn extract_file(&self, path: &Path) -> Result<Vec<OutageRecord>, ExtractionError> {
        let file_bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractionError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        self.extract(&file_bytes)
    }
}

#[cfg(test)]
mod tests {
    use crate::pdf_reader::{
        ExtractionError, PdfReader, PdfTextReader, TextReader, WrappedRowAssembler,
    };
    use std::sync::Arc;

    /// One page, one line of Helvetica text, with a valid xref table.
    fn single_page_pdf(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 712 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = vec![];
        for (index, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend(format!("{} 0 obj\n{object}\nendobj\n", index + 1).into_bytes());
        }
        let xref = pdf.len();
        pdf.extend(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).into_bytes());
        for offset in offsets {
            pdf.extend(format!("{offset:010} 00000 n \n").into_bytes());
        }
        pdf.extend(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
                objects.len() + 1
            )
            .into_bytes(),
        );
        pdf
    }

    struct Utf8Reader;

    impl TextReader for Utf8Reader {
        fn read_text(&self, file_bytes: &[u8]) -> Result<String, ExtractionError> {
            Ok(String::from_utf8_lossy(file_bytes).into_owned())
        }
    }

    const DOCUMENT: &str = "ПЛАНИРАНИ ИЗКЛЮЧВАНИЯ
за 18.11.2025
ЦЕНТРАЛНА ГР.ЧАСТ СОФИЯ ОБЩ.СЕРДИКА  СОФИЯ-ГРАД  СЕРДИКА  08:30 - 16:30
КОСТИНБРОД  СОФИЯ  КОСТИНБРОД  09:00 - 12:00
";

    #[test]
    fn test_extraction_is_idempotent() {
        let reader = PdfReader::with(
            Arc::new(Utf8Reader),
            Arc::new(WrappedRowAssembler::default()),
        );

        let first = reader.extract(DOCUMENT.as_bytes()).unwrap();
        let second = reader.extract(DOCUMENT.as_bytes()).unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_bytes_that_are_not_a_pdf_are_unreadable() {
        let reader = PdfReader::new();
        let result = reader.extract(b"definitely not a pdf");
        assert!(matches!(result, Err(ExtractionError::UnreadablePdf(_))));
    }

    #[test]
    fn test_pdf_text_is_extracted() {
        let text = PdfTextReader
            .read_text(&single_page_pdf("Outages"))
            .unwrap();
        assert!(text.contains("Outages"), "extracted {text:?}");
    }

    #[tokio::test]
    async fn test_readable_pdf_without_a_declared_date_is_missing_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuts_18-11-2025.pdf");
        tokio::fs::write(&path, single_page_pdf("Outages"))
            .await
            .unwrap();

        let result = PdfReader::new().extract_file(&path).await;

        assert!(matches!(result, Err(ExtractionError::MissingDate)));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let reader = PdfReader::new();
        let result = reader.extract_file(&dir.path().join("cuts_18-11-2025.pdf")).await;
        assert!(matches!(result, Err(ExtractionError::Io { .. })));
    }
}
