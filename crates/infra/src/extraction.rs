//! Bill extraction: turns uploaded file names into invoice records.
//!
//! No OCR happens here; [`SampleExtractor`] returns a fixed working set with
//! a realistic mix of clean and erroring invoices.

use async_trait::async_trait;

use billzy_invoicing::{Invoice, InvoiceFields, InvoiceId};

use crate::tasks::TaskError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no files to extract")]
    NoFiles,
    #[error("extraction failed: {0}")]
    Failed(String),
}

impl From<ExtractionError> for TaskError {
    fn from(err: ExtractionError) -> Self {
        TaskError::Failed(err.to_string())
    }
}

#[async_trait]
pub trait BillExtractor: Send + Sync {
    async fn extract(&self, files: &[String]) -> Result<Vec<Invoice>, ExtractionError>;
}

/// Extractor that ignores file content and yields [`sample_invoices`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleExtractor;

#[async_trait]
impl BillExtractor for SampleExtractor {
    async fn extract(&self, files: &[String]) -> Result<Vec<Invoice>, ExtractionError> {
        if files.is_empty() {
            return Err(ExtractionError::NoFiles);
        }
        tracing::debug!(files = files.len(), "extracting sample invoices");
        Ok(sample_invoices())
    }
}

fn fields(invoice_no: &str, vendor: &str, gstin: &str, total: f64, date: &str) -> InvoiceFields {
    InvoiceFields {
        invoice_no: invoice_no.to_string(),
        vendor: vendor.to_string(),
        gstin: gstin.to_string(),
        total,
        date: date.to_string(),
    }
}

/// The five-invoice working set: three validated, two with errors.
pub fn sample_invoices() -> Vec<Invoice> {
    vec![
        Invoice::validated(
            InvoiceId::new("1"),
            fields("INV-2025-001", "Tech Solutions Pvt Ltd", "29ABCDE1234F1Z5", 25000.0, "2025-01-15"),
        ),
        Invoice::validated(
            InvoiceId::new("2"),
            fields("INV-2025-002", "Office Supplies Co", "27XYZAB5678G2W4", 8500.0, "2025-01-16"),
        ),
        Invoice::with_errors(
            InvoiceId::new("3"),
            fields("INV-2025-003", "Software Services Inc", "INVALID_GSTIN", 45000.0, "2025-01-17"),
            vec!["Invalid GSTIN format".to_string()],
        ),
        Invoice::validated(
            InvoiceId::new("4"),
            fields("INV-2025-004", "Marketing Agency", "19PQRST9012H3K6", 32000.0, "2025-01-18"),
        ),
        Invoice::with_errors(
            InvoiceId::new("5"),
            fields("INV-2025-005", "Consulting Partners", "", 0.0, "2025-01-19"),
            vec!["Missing GSTIN".to_string(), "Invalid total amount".to_string()],
        ),
    ]
}
