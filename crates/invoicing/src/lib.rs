//! Invoice validation domain module.
//!
//! This crate contains the invoice record, the validation batch (bulk auto-fix,
//! single-record edit, continue gate) and report aggregation, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod amount;
pub mod invoice;
pub mod report;
pub mod validation;

pub use amount::{finite_or_zero, parse_amount};
pub use invoice::{Invoice, InvoiceFields, InvoiceId, InvoiceStatus};
pub use report::{BatchReport, StatusSlice, SubmissionSummary, VendorTotal};
pub use validation::{
    AutoFix, AutoFixApplied, EditInvoice, InvoiceEdited, InvoicesAutoFixed, InvoicesLoaded,
    LoadInvoices, PLACEHOLDER_GSTIN, PLACEHOLDER_TOTAL, UNRESOLVED_ERRORS_MESSAGE,
    ValidationBatch, ValidationCommand, ValidationCounts, ValidationEvent,
};
