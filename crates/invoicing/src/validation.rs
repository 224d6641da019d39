use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billzy_core::entity::{first_duplicate_id, position_of};
use billzy_core::{Aggregate, AggregateRoot, BatchId, DomainError, DomainResult};
use billzy_events::{Event, Notice};

use crate::invoice::{Invoice, InvoiceFields, InvoiceId};

/// GSTIN substituted by auto-fix when an erroring invoice has none.
pub const PLACEHOLDER_GSTIN: &str = "29ABCDE1234F1Z5";

/// Amount substituted by auto-fix when an erroring invoice totals zero.
pub const PLACEHOLDER_TOTAL: f64 = 10_000.0;

/// Shown when the continue gate refuses to advance.
pub const UNRESOLVED_ERRORS_MESSAGE: &str = "Please fix all errors before continuing";

/// Validated/erroring tallies for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationCounts {
    pub total: usize,
    pub validated: usize,
    pub errors: usize,
}

/// Aggregate root: the working set of invoices produced by one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationBatch {
    id: BatchId,
    invoices: Vec<Invoice>,
    version: u64,
    loaded: bool,
}

impl ValidationBatch {
    /// Create an empty, not-yet-loaded batch.
    pub fn empty(id: BatchId) -> Self {
        Self {
            id,
            invoices: Vec::new(),
            version: 0,
            loaded: false,
        }
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn get(&self, invoice_id: &InvoiceId) -> Option<&Invoice> {
        position_of(&self.invoices, invoice_id).map(|idx| &self.invoices[idx])
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.invoices.iter().filter(|inv| inv.is_error()).count()
    }

    pub fn validated_count(&self) -> usize {
        self.invoices.len() - self.error_count()
    }

    pub fn counts(&self) -> ValidationCounts {
        let errors = self.error_count();
        ValidationCounts {
            total: self.invoices.len(),
            validated: self.invoices.len() - errors,
            errors,
        }
    }

    /// Continue gate: refuses while any invoice is still erroring.
    pub fn ensure_ready_to_continue(&self) -> DomainResult<()> {
        if self.error_count() > 0 {
            return Err(DomainError::invariant(UNRESOLVED_ERRORS_MESSAGE));
        }
        Ok(())
    }
}

impl AggregateRoot for ValidationBatch {
    type Id = BatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: LoadInvoices (replace the working set wholesale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadInvoices {
    pub invoices: Vec<Invoice>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AutoFix (placeholder remediation of every erroring invoice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFix {
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditInvoice (user-confirmed field values for one invoice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditInvoice {
    pub invoice_id: InvoiceId,
    pub fields: InvoiceFields,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationCommand {
    LoadInvoices(LoadInvoices),
    AutoFix(AutoFix),
    EditInvoice(EditInvoice),
}

/// Event: InvoicesLoaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicesLoaded {
    pub batch_id: BatchId,
    pub invoices: Vec<Invoice>,
    pub occurred_at: DateTime<Utc>,
}

/// Final field values of one auto-fixed invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFixApplied {
    pub invoice_id: InvoiceId,
    pub gstin: String,
    pub total: f64,
}

/// Event: InvoicesAutoFixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicesAutoFixed {
    pub batch_id: BatchId,
    pub fixes: Vec<AutoFixApplied>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceEdited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceEdited {
    pub batch_id: BatchId,
    pub invoice_id: InvoiceId,
    pub fields: InvoiceFields,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationEvent {
    InvoicesLoaded(InvoicesLoaded),
    InvoicesAutoFixed(InvoicesAutoFixed),
    InvoiceEdited(InvoiceEdited),
}

impl Event for ValidationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ValidationEvent::InvoicesLoaded(_) => "validation.batch.loaded",
            ValidationEvent::InvoicesAutoFixed(_) => "validation.batch.auto_fixed",
            ValidationEvent::InvoiceEdited(_) => "validation.invoice.edited",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ValidationEvent::InvoicesLoaded(e) => e.occurred_at,
            ValidationEvent::InvoicesAutoFixed(e) => e.occurred_at,
            ValidationEvent::InvoiceEdited(e) => e.occurred_at,
        }
    }

    fn notice(&self) -> Option<Notice> {
        match self {
            ValidationEvent::InvoicesLoaded(_) => None,
            ValidationEvent::InvoicesAutoFixed(_) => {
                Some(Notice::success("All errors auto-fixed successfully!"))
            }
            ValidationEvent::InvoiceEdited(_) => {
                Some(Notice::success("Invoice updated successfully!"))
            }
        }
    }
}

impl Aggregate for ValidationBatch {
    type Command = ValidationCommand;
    type Event = ValidationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ValidationEvent::InvoicesLoaded(e) => {
                self.id = e.batch_id;
                self.invoices = e.invoices.clone();
                self.loaded = true;
            }
            ValidationEvent::InvoicesAutoFixed(e) => {
                for fix in &e.fixes {
                    if let Some(idx) = position_of(&self.invoices, &fix.invoice_id) {
                        let invoice = &mut self.invoices[idx];
                        invoice.set_gstin(fix.gstin.clone());
                        invoice.set_total(fix.total);
                        invoice.mark_validated();
                    }
                }
            }
            ValidationEvent::InvoiceEdited(e) => {
                if let Some(idx) = position_of(&self.invoices, &e.invoice_id) {
                    let invoice = &mut self.invoices[idx];
                    invoice.replace_fields(e.fields.clone());
                    // Edits are trusted as entered; no rule is re-run.
                    invoice.mark_validated();
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ValidationCommand::LoadInvoices(cmd) => self.handle_load(cmd),
            ValidationCommand::AutoFix(cmd) => self.handle_auto_fix(cmd),
            ValidationCommand::EditInvoice(cmd) => self.handle_edit(cmd),
        }
    }
}

impl ValidationBatch {
    fn handle_load(&self, cmd: &LoadInvoices) -> Result<Vec<ValidationEvent>, DomainError> {
        if self.loaded {
            return Err(DomainError::conflict("batch already loaded"));
        }

        if let Some(dup) = first_duplicate_id(&cmd.invoices) {
            return Err(DomainError::conflict(format!("duplicate invoice id: {dup}")));
        }

        Ok(vec![ValidationEvent::InvoicesLoaded(InvoicesLoaded {
            batch_id: self.id,
            invoices: cmd.invoices.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_auto_fix(&self, cmd: &AutoFix) -> Result<Vec<ValidationEvent>, DomainError> {
        let fixes: Vec<AutoFixApplied> = self
            .invoices
            .iter()
            .filter(|inv| inv.is_error())
            .map(|inv| AutoFixApplied {
                invoice_id: inv.id_typed().clone(),
                gstin: if inv.gstin().is_empty() {
                    PLACEHOLDER_GSTIN.to_string()
                } else {
                    inv.gstin().to_string()
                },
                total: if is_missing_amount(inv.total()) {
                    PLACEHOLDER_TOTAL
                } else {
                    inv.total()
                },
            })
            .collect();

        if fixes.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![ValidationEvent::InvoicesAutoFixed(InvoicesAutoFixed {
            batch_id: self.id,
            fixes,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit(&self, cmd: &EditInvoice) -> Result<Vec<ValidationEvent>, DomainError> {
        if self.get(&cmd.invoice_id).is_none() {
            return Err(DomainError::not_found(format!(
                "invoice {} is not in the working set",
                cmd.invoice_id
            )));
        }

        Ok(vec![ValidationEvent::InvoiceEdited(InvoiceEdited {
            batch_id: self.id,
            invoice_id: cmd.invoice_id.clone(),
            fields: cmd.fields.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

/// Zero (or NaN) counts as a missing amount.
fn is_missing_amount(total: f64) -> bool {
    total == 0.0 || total.is_nan()
}
