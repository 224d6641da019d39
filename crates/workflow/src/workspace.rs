//! The per-session workspace: the single owner of the working set.
//!
//! Every mutation of login state, the current screen, the invoice batch,
//! exports and the portal receipt goes through a method here, and each one
//! records a [`WorkflowEvent`] in the session outbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billzy_core::{Aggregate, BatchId, DomainError, DomainResult, SessionId};
use billzy_events::{Event, EventEnvelope, Notice, Outbox};
use billzy_invoicing::{
    AutoFix, EditInvoice, Invoice, InvoiceFields, InvoiceId, LoadInvoices, ValidationBatch,
    ValidationCommand, ValidationEvent, UNRESOLVED_ERRORS_MESSAGE,
};

use crate::export::{ExportArtifact, PortalReceipt};
use crate::screen::Screen;

/// Login form values. Accepted as-is; there is no credential check.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Dashboard tiles.
///
/// Errors and validated figures are fixed 15%/85% shares of the invoice
/// count, rounded down, not derived from statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub invoices_processed: usize,
    pub errors_found: usize,
    pub validated: usize,
}

impl DashboardStats {
    pub fn for_count(count: usize) -> Self {
        Self {
            invoices_processed: count,
            errors_found: count * 15 / 100,
            validated: count * 85 / 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEvent {
    LoggedIn {
        email: String,
        occurred_at: DateTime<Utc>,
    },
    LoggedOut {
        occurred_at: DateTime<Utc>,
    },
    Navigated {
        from: Screen,
        to: Screen,
        occurred_at: DateTime<Utc>,
    },
    FilesUploaded {
        files: usize,
        occurred_at: DateTime<Utc>,
    },
    Validation(ValidationEvent),
    ContinueRefused {
        errors: usize,
        occurred_at: DateTime<Utc>,
    },
    ExportGenerated(ExportArtifact),
    PortalUploaded(PortalReceipt),
}

impl Event for WorkflowEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WorkflowEvent::LoggedIn { .. } => "workflow.session.logged_in",
            WorkflowEvent::LoggedOut { .. } => "workflow.session.logged_out",
            WorkflowEvent::Navigated { .. } => "workflow.screen.navigated",
            WorkflowEvent::FilesUploaded { .. } => "workflow.upload.completed",
            WorkflowEvent::Validation(e) => e.event_type(),
            WorkflowEvent::ContinueRefused { .. } => "workflow.validation.continue_refused",
            WorkflowEvent::ExportGenerated(_) => "workflow.export.generated",
            WorkflowEvent::PortalUploaded(_) => "workflow.portal.uploaded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            WorkflowEvent::LoggedIn { occurred_at, .. }
            | WorkflowEvent::LoggedOut { occurred_at }
            | WorkflowEvent::Navigated { occurred_at, .. }
            | WorkflowEvent::FilesUploaded { occurred_at, .. }
            | WorkflowEvent::ContinueRefused { occurred_at, .. } => *occurred_at,
            WorkflowEvent::Validation(e) => e.occurred_at(),
            WorkflowEvent::ExportGenerated(a) => a.generated_at,
            WorkflowEvent::PortalUploaded(r) => r.completed_at,
        }
    }

    fn notice(&self) -> Option<Notice> {
        match self {
            WorkflowEvent::FilesUploaded { files, .. } => Some(Notice::success(format!(
                "Successfully uploaded {files} file(s)"
            ))),
            WorkflowEvent::Validation(e) => e.notice(),
            WorkflowEvent::ContinueRefused { .. } => Some(Notice::error(UNRESOLVED_ERRORS_MESSAGE)),
            WorkflowEvent::ExportGenerated(a) => Some(Notice::success(a.kind.success_message())),
            WorkflowEvent::PortalUploaded(_) => {
                Some(Notice::success("Upload to GST Portal completed!"))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    session_id: SessionId,
    email: Option<String>,
    screen: Screen,
    batch: ValidationBatch,
    exports: Vec<ExportArtifact>,
    receipt: Option<PortalReceipt>,
    outbox: Outbox<WorkflowEvent>,
}

impl Workspace {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            email: None,
            screen: Screen::Login,
            batch: ValidationBatch::empty(BatchId::new()),
            exports: Vec::new(),
            receipt: None,
            outbox: Outbox::new(session_id),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.email.is_some()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn batch(&self) -> &ValidationBatch {
        &self.batch
    }

    pub fn invoices(&self) -> &[Invoice] {
        self.batch.invoices()
    }

    pub fn exports(&self) -> &[ExportArtifact] {
        &self.exports
    }

    pub fn receipt(&self) -> Option<&PortalReceipt> {
        self.receipt.as_ref()
    }

    pub fn dashboard(&self) -> DashboardStats {
        DashboardStats::for_count(self.batch.len())
    }

    /// Events recorded since the last call, for fan-out.
    pub fn drain_events(&mut self) -> Vec<EventEnvelope<WorkflowEvent>> {
        self.outbox.drain_pending()
    }

    /// Flip the login gate. Any credentials are accepted.
    pub fn login(&mut self, credentials: &Credentials) -> DomainResult<()> {
        if self.is_authenticated() {
            return Ok(());
        }

        tracing::info!(session_id = %self.session_id, email = %credentials.email, "login");
        self.email = Some(credentials.email.clone());
        self.outbox.record(WorkflowEvent::LoggedIn {
            email: credentials.email.clone(),
            occurred_at: Utc::now(),
        });
        self.go_to(Screen::Dashboard);
        Ok(())
    }

    /// Discard the working set and return to the login screen.
    pub fn logout(&mut self) -> DomainResult<()> {
        self.require_login()?;

        tracing::info!(
            session_id = %self.session_id,
            discarded = self.batch.len(),
            "logout"
        );
        self.email = None;
        self.screen = Screen::Login;
        self.batch = ValidationBatch::empty(BatchId::new());
        self.exports.clear();
        self.receipt = None;
        self.outbox.record(WorkflowEvent::LoggedOut {
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Switch screens. Unconditional once logged in, except that the login
    /// screen is only reachable through `logout`.
    pub fn navigate(&mut self, to: Screen) -> DomainResult<()> {
        self.require_login()?;
        if to == Screen::Login {
            return Err(DomainError::validation(
                "the login screen is only reachable by logging out",
            ));
        }
        self.go_to(to);
        Ok(())
    }

    /// Replace the working set with freshly extracted invoices and open the
    /// validation screen.
    pub fn load_invoices(&mut self, invoices: Vec<Invoice>, files: usize) -> DomainResult<()> {
        self.require_login()?;

        let mut batch = ValidationBatch::empty(BatchId::new());
        let events = batch.execute(&ValidationCommand::LoadInvoices(LoadInvoices {
            invoices,
            occurred_at: Utc::now(),
        }))?;

        tracing::info!(
            session_id = %self.session_id,
            invoices = batch.len(),
            errors = batch.error_count(),
            "working set replaced"
        );
        self.batch = batch;
        self.exports.clear();
        self.receipt = None;

        self.outbox.record(WorkflowEvent::FilesUploaded {
            files,
            occurred_at: Utc::now(),
        });
        self.record_validation(events);
        self.go_to(Screen::Validation);
        Ok(())
    }

    /// Bulk auto-fix. Returns how many invoices were fixed.
    pub fn auto_fix(&mut self) -> DomainResult<usize> {
        self.require_login()?;

        let events = self.batch.execute(&ValidationCommand::AutoFix(AutoFix {
            occurred_at: Utc::now(),
        }))?;
        let fixed: usize = events
            .iter()
            .map(|e| match e {
                ValidationEvent::InvoicesAutoFixed(e) => e.fixes.len(),
                _ => 0,
            })
            .sum();

        tracing::info!(session_id = %self.session_id, fixed, "auto-fix applied");
        self.record_validation(events);
        Ok(fixed)
    }

    /// Save user-entered values for one invoice; the invoice becomes validated.
    pub fn edit_invoice(
        &mut self,
        invoice_id: &InvoiceId,
        fields: InvoiceFields,
    ) -> DomainResult<&Invoice> {
        self.require_login()?;

        let events = self.batch.execute(&ValidationCommand::EditInvoice(EditInvoice {
            invoice_id: invoice_id.clone(),
            fields,
            occurred_at: Utc::now(),
        }))?;

        tracing::info!(session_id = %self.session_id, invoice_id = %invoice_id, "invoice edited");
        self.record_validation(events);
        self.batch
            .get(invoice_id)
            .ok_or_else(|| DomainError::not_found(format!("invoice {invoice_id}")))
    }

    /// Continue gate: advance to file generation only when nothing is erroring.
    pub fn continue_to_generate(&mut self) -> DomainResult<()> {
        self.require_login()?;

        if let Err(err) = self.batch.ensure_ready_to_continue() {
            let errors = self.batch.error_count();
            tracing::warn!(session_id = %self.session_id, errors, "continue refused");
            self.outbox.record(WorkflowEvent::ContinueRefused {
                errors,
                occurred_at: Utc::now(),
            });
            return Err(err);
        }

        self.go_to(Screen::Generate);
        Ok(())
    }

    /// Remember a generated export; a newer export of the same kind replaces it.
    pub fn record_export(&mut self, artifact: ExportArtifact) -> DomainResult<()> {
        self.require_login()?;

        tracing::info!(
            session_id = %self.session_id,
            kind = artifact.kind.label(),
            file = %artifact.file_name,
            "export generated"
        );
        self.exports.retain(|a| a.kind != artifact.kind);
        self.exports.push(artifact.clone());
        self.outbox.record(WorkflowEvent::ExportGenerated(artifact));
        Ok(())
    }

    pub fn record_portal_upload(&mut self, receipt: PortalReceipt) -> DomainResult<()> {
        self.require_login()?;

        tracing::info!(
            session_id = %self.session_id,
            uploaded = receipt.uploaded,
            failed = receipt.failed,
            "portal upload completed"
        );
        self.receipt = Some(receipt.clone());
        self.outbox.record(WorkflowEvent::PortalUploaded(receipt));
        Ok(())
    }

    fn require_login(&self) -> DomainResult<()> {
        if !self.is_authenticated() {
            return Err(DomainError::Unauthorized);
        }
        Ok(())
    }

    fn go_to(&mut self, to: Screen) {
        let from = self.screen;
        self.screen = to;
        self.outbox.record(WorkflowEvent::Navigated {
            from,
            to,
            occurred_at: Utc::now(),
        });
    }

    fn record_validation(&mut self, events: Vec<ValidationEvent>) {
        for event in events {
            self.outbox.record(WorkflowEvent::Validation(event));
        }
    }
}
