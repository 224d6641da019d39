use async_trait::async_trait;
use chrono::Utc;

use billzy_invoicing::Invoice;
use billzy_workflow::{ExportArtifact, ExportKind};

use crate::tasks::TaskError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("export generation failed: {0}")]
    Failed(String),
}

impl From<ExportError> for TaskError {
    fn from(err: ExportError) -> Self {
        TaskError::Failed(err.to_string())
    }
}

/// Produces an export for the current working set.
#[async_trait]
pub trait ExportGenerator: Send + Sync {
    async fn generate(
        &self,
        kind: ExportKind,
        invoices: &[Invoice],
    ) -> Result<ExportArtifact, ExportError>;
}

/// Generator that only describes the file it would have written.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorExportGenerator;

#[async_trait]
impl ExportGenerator for DescriptorExportGenerator {
    async fn generate(
        &self,
        kind: ExportKind,
        invoices: &[Invoice],
    ) -> Result<ExportArtifact, ExportError> {
        let artifact = ExportArtifact::describe(kind, invoices, Utc::now());
        tracing::debug!(kind = kind.label(), file = %artifact.file_name, "export described");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::sample_invoices;

    #[tokio::test]
    async fn descriptor_covers_the_whole_working_set() {
        let invoices = sample_invoices();
        let artifact = DescriptorExportGenerator
            .generate(ExportKind::GstJson, &invoices)
            .await
            .unwrap();

        assert_eq!(artifact.kind, ExportKind::GstJson);
        assert_eq!(artifact.invoice_count, 5);
        assert_eq!(artifact.total_amount, 110_500.0);
        assert!(artifact.file_name.starts_with("gst_data_"));
    }
}
