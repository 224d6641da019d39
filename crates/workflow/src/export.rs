//! Export and portal outcome descriptors.
//!
//! Nothing here writes a file or talks to a portal; these are the records the
//! workspace keeps once a (simulated) generation or upload finishes.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billzy_core::DomainError;
use billzy_invoicing::{Invoice, SubmissionSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// Spreadsheet for direct import into Tally.
    Tally,
    /// JSON for GST portal upload.
    GstJson,
}

impl ExportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::Tally => "Tally",
            ExportKind::GstJson => "GST JSON",
        }
    }

    /// File name for an export generated at `at`, e.g. `tally_export_jan_2025.xlsx`.
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        let period = at.format("%b_%Y").to_string().to_lowercase();
        match self {
            ExportKind::Tally => format!("tally_export_{period}.xlsx"),
            ExportKind::GstJson => format!("gst_data_{period}.json"),
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            ExportKind::Tally => "Tally-ready file generated successfully!",
            ExportKind::GstJson => "GST-ready JSON file generated successfully!",
        }
    }
}

impl FromStr for ExportKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tally" => Ok(ExportKind::Tally),
            "gst" | "gst_json" => Ok(ExportKind::GstJson),
            other => Err(DomainError::validation(format!(
                "unknown export kind: {other} (expected tally or gst)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub kind: ExportKind,
    pub file_name: String,
    pub invoice_count: usize,
    pub total_amount: f64,
    pub generated_at: DateTime<Utc>,
}

impl ExportArtifact {
    pub fn describe(kind: ExportKind, invoices: &[Invoice], generated_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            file_name: kind.file_name(generated_at),
            invoice_count: invoices.len(),
            total_amount: invoices.iter().map(Invoice::total).sum(),
            generated_at,
        }
    }
}

/// Outcome of a portal upload: validated invoices go up, erroring ones stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalReceipt {
    pub uploaded: usize,
    pub failed: usize,
    pub completed_at: DateTime<Utc>,
}

impl PortalReceipt {
    pub fn for_invoices(invoices: &[Invoice], completed_at: DateTime<Utc>) -> Self {
        let summary = SubmissionSummary::from_invoices(invoices);
        Self {
            uploaded: summary.submitted,
            failed: summary.withheld,
            completed_at,
        }
    }
}
