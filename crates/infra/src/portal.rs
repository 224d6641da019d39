use async_trait::async_trait;
use chrono::Utc;

use billzy_invoicing::Invoice;
use billzy_workflow::PortalReceipt;

use crate::tasks::TaskError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    #[error("GST portal unavailable: {0}")]
    Unavailable(String),
}

impl From<PortalError> for TaskError {
    fn from(err: PortalError) -> Self {
        TaskError::Failed(err.to_string())
    }
}

/// Submits invoices to the GST portal.
#[async_trait]
pub trait PortalClient: Send + Sync {
    async fn upload(&self, invoices: &[Invoice]) -> Result<PortalReceipt, PortalError>;
}

/// Portal stand-in: validated invoices are accepted, erroring ones withheld.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedPortal;

#[async_trait]
impl PortalClient for SimulatedPortal {
    async fn upload(&self, invoices: &[Invoice]) -> Result<PortalReceipt, PortalError> {
        let receipt = PortalReceipt::for_invoices(invoices, Utc::now());
        tracing::info!(uploaded = receipt.uploaded, failed = receipt.failed, "portal upload simulated");
        Ok(receipt)
    }
}
