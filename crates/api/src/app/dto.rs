use serde::{Deserialize, Serialize};

use billzy_core::SessionId;
use billzy_infra::TaskProgress;
use billzy_invoicing::{
    BatchReport, Invoice, InvoiceFields, ValidationCounts, finite_or_zero, parse_amount,
};
use billzy_workflow::{DashboardStats, ExportArtifact, FileSelection, NAV_ITEMS, PortalReceipt, Screen};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub screen: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub files: Vec<String>,
}

/// An amount as typed into the edit form: a JSON number, or text that is
/// read with leading-number semantics (`"12abc"` → 12, `"abc"` → 0).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn value(&self) -> f64 {
        match self {
            AmountInput::Number(n) => finite_or_zero(*n),
            AmountInput::Text(s) => parse_amount(s),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditInvoiceRequest {
    pub invoice_no: String,
    pub vendor: String,
    pub gstin: String,
    pub total: AmountInput,
    pub date: String,
}

impl EditInvoiceRequest {
    pub fn into_fields(self) -> InvoiceFields {
        InvoiceFields {
            total: self.total.value(),
            invoice_no: self.invoice_no,
            vendor: self.vendor,
            gstin: self.gstin,
            date: self.date,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub email: Option<String>,
    pub screen: Screen,
}

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub screen: Screen,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub screen: Screen,
    pub nav: Vec<NavItem>,
}

impl ScreenResponse {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            nav: NAV_ITEMS
                .iter()
                .map(|&(screen, label)| NavItem { screen, label })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub email: Option<String>,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub task: TaskProgress,
    pub selection: FileSelection,
}

#[derive(Debug, Serialize)]
pub struct InvoicesResponse {
    pub invoices: Vec<Invoice>,
    pub counts: ValidationCounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFixResponse {
    pub fixed: usize,
    pub counts: ValidationCounts,
}

#[derive(Debug, Serialize)]
pub struct DownloadHistory {
    pub exports: Vec<ExportArtifact>,
    pub receipt: Option<PortalReceipt>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: BatchReport,
    pub downloads: DownloadHistory,
}
