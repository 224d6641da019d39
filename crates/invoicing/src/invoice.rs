use serde::{Deserialize, Serialize};

use billzy_core::{DomainError, Entity};

/// Invoice identifier, assigned by whoever produced the record (extraction step).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

impl InvoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvoiceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Validation classification, derived from the error list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Validated,
    Error,
}

/// The user-editable part of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFields {
    pub invoice_no: String,
    pub vendor: String,
    /// 15-character GSTIN; may be empty or malformed.
    pub gstin: String,
    /// Amount in rupees.
    pub total: f64,
    /// ISO date (`YYYY-MM-DD`), kept as entered.
    pub date: String,
}

/// One extracted invoice.
///
/// The status is not stored: an invoice is `Error` exactly when it carries at
/// least one error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "InvoiceRecord", try_from = "InvoiceRecord")]
pub struct Invoice {
    id: InvoiceId,
    fields: InvoiceFields,
    errors: Vec<String>,
}

impl Invoice {
    pub fn validated(id: InvoiceId, fields: InvoiceFields) -> Self {
        Self {
            id,
            fields,
            errors: Vec::new(),
        }
    }

    /// Build an invoice with validation problems. An empty list yields a
    /// validated invoice.
    pub fn with_errors(id: InvoiceId, fields: InvoiceFields, errors: Vec<String>) -> Self {
        Self { id, fields, errors }
    }

    pub fn id_typed(&self) -> &InvoiceId {
        &self.id
    }

    pub fn fields(&self) -> &InvoiceFields {
        &self.fields
    }

    pub fn invoice_no(&self) -> &str {
        &self.fields.invoice_no
    }

    pub fn vendor(&self) -> &str {
        &self.fields.vendor
    }

    pub fn gstin(&self) -> &str {
        &self.fields.gstin
    }

    pub fn total(&self) -> f64 {
        self.fields.total
    }

    pub fn date(&self) -> &str {
        &self.fields.date
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn status(&self) -> InvoiceStatus {
        if self.errors.is_empty() {
            InvoiceStatus::Validated
        } else {
            InvoiceStatus::Error
        }
    }

    pub fn is_error(&self) -> bool {
        self.status() == InvoiceStatus::Error
    }

    pub(crate) fn set_gstin(&mut self, gstin: String) {
        self.fields.gstin = gstin;
    }

    pub(crate) fn set_total(&mut self, total: f64) {
        self.fields.total = total;
    }

    pub(crate) fn replace_fields(&mut self, fields: InvoiceFields) {
        self.fields = fields;
    }

    pub(crate) fn mark_validated(&mut self) {
        self.errors.clear();
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Flat wire shape: `{id, invoiceNo, vendor, gstin, total, status, errors?, date}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceRecord {
    id: InvoiceId,
    invoice_no: String,
    vendor: String,
    gstin: String,
    total: f64,
    status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
    date: String,
}

impl From<Invoice> for InvoiceRecord {
    fn from(invoice: Invoice) -> Self {
        let status = invoice.status();
        let errors = if invoice.errors.is_empty() {
            None
        } else {
            Some(invoice.errors)
        };
        Self {
            id: invoice.id,
            invoice_no: invoice.fields.invoice_no,
            vendor: invoice.fields.vendor,
            gstin: invoice.fields.gstin,
            total: invoice.fields.total,
            status,
            errors,
            date: invoice.fields.date,
        }
    }
}

impl TryFrom<InvoiceRecord> for Invoice {
    type Error = DomainError;

    fn try_from(record: InvoiceRecord) -> Result<Self, Self::Error> {
        let errors = record.errors.unwrap_or_default();
        match (record.status, errors.is_empty()) {
            (InvoiceStatus::Validated, false) => {
                return Err(DomainError::invariant(format!(
                    "invoice {} is validated but lists errors",
                    record.id
                )));
            }
            (InvoiceStatus::Error, true) => {
                return Err(DomainError::invariant(format!(
                    "invoice {} has error status without errors",
                    record.id
                )));
            }
            _ => {}
        }

        Ok(Self {
            id: record.id,
            fields: InvoiceFields {
                invoice_no: record.invoice_no,
                vendor: record.vendor,
                gstin: record.gstin,
                total: record.total,
                date: record.date,
            },
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> InvoiceFields {
        InvoiceFields {
            invoice_no: "INV-2025-003".to_string(),
            vendor: "Software Services Inc".to_string(),
            gstin: "INVALID_GSTIN".to_string(),
            total: 45000.0,
            date: "2025-01-17".to_string(),
        }
    }

    #[test]
    fn status_follows_error_list() {
        let ok = Invoice::validated(InvoiceId::new("1"), fields());
        assert_eq!(ok.status(), InvoiceStatus::Validated);

        let bad = Invoice::with_errors(
            InvoiceId::new("3"),
            fields(),
            vec!["Invalid GSTIN format".to_string()],
        );
        assert_eq!(bad.status(), InvoiceStatus::Error);

        let empty = Invoice::with_errors(InvoiceId::new("4"), fields(), vec![]);
        assert_eq!(empty.status(), InvoiceStatus::Validated);
    }

    #[test]
    fn serializes_to_flat_camel_case_record() {
        let bad = Invoice::with_errors(
            InvoiceId::new("3"),
            fields(),
            vec!["Invalid GSTIN format".to_string()],
        );
        let value = serde_json::to_value(&bad).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "3",
                "invoiceNo": "INV-2025-003",
                "vendor": "Software Services Inc",
                "gstin": "INVALID_GSTIN",
                "total": 45000.0,
                "status": "error",
                "errors": ["Invalid GSTIN format"],
                "date": "2025-01-17",
            })
        );
    }

    #[test]
    fn validated_invoice_omits_errors_key() {
        let ok = Invoice::validated(InvoiceId::new("1"), fields());
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["status"], "validated");
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn deserializing_contradictory_status_fails() {
        let validated_with_errors = json!({
            "id": "9", "invoiceNo": "X", "vendor": "V", "gstin": "", "total": 0,
            "status": "validated", "errors": ["Missing GSTIN"], "date": "2025-01-19"
        });
        assert!(serde_json::from_value::<Invoice>(validated_with_errors).is_err());

        let error_without_errors = json!({
            "id": "9", "invoiceNo": "X", "vendor": "V", "gstin": "", "total": 0,
            "status": "error", "date": "2025-01-19"
        });
        assert!(serde_json::from_value::<Invoice>(error_without_errors).is_err());
    }

    #[test]
    fn well_formed_record_deserializes() {
        let raw = json!({
            "id": "5", "invoiceNo": "INV-2025-005", "vendor": "Consulting Partners",
            "gstin": "", "total": 0, "status": "error",
            "errors": ["Missing GSTIN", "Invalid total amount"], "date": "2025-01-19"
        });
        let invoice: Invoice = serde_json::from_value(raw).unwrap();
        assert_eq!(invoice.id().as_str(), "5");
        assert_eq!(invoice.errors().len(), 2);
        assert!(invoice.is_error());
        assert_eq!(invoice.total(), 0.0);
    }
}
