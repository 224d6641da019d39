//! Read-only aggregations over a working set (reports, portal submission split).

use std::cmp::Ordering;

use serde::Serialize;

use crate::invoice::{Invoice, InvoiceStatus};

/// How many vendors the report ranks.
pub const TOP_VENDOR_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorTotal {
    pub vendor: String,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSlice {
    pub status: InvoiceStatus,
    pub count: usize,
}

/// Processing summary shown on the reports screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_invoices: usize,
    pub validated: usize,
    pub errors: usize,
    pub total_amount: f64,
    pub average_amount: f64,
    pub status_breakdown: Vec<StatusSlice>,
    pub top_vendors: Vec<VendorTotal>,
}

impl BatchReport {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let total_invoices = invoices.len();
        let errors = invoices.iter().filter(|inv| inv.is_error()).count();
        let validated = total_invoices - errors;
        let total_amount: f64 = invoices.iter().map(Invoice::total).sum();
        let average_amount = if total_invoices > 0 {
            total_amount / total_invoices as f64
        } else {
            0.0
        };

        Self {
            total_invoices,
            validated,
            errors,
            total_amount,
            average_amount,
            status_breakdown: vec![
                StatusSlice {
                    status: InvoiceStatus::Validated,
                    count: validated,
                },
                StatusSlice {
                    status: InvoiceStatus::Error,
                    count: errors,
                },
            ],
            top_vendors: top_vendors(invoices, TOP_VENDOR_LIMIT),
        }
    }
}

/// Per-vendor sums, in order of first appearance.
pub fn vendor_totals(invoices: &[Invoice]) -> Vec<VendorTotal> {
    let mut totals: Vec<VendorTotal> = Vec::new();
    for inv in invoices {
        match totals.iter_mut().find(|v| v.vendor == inv.vendor()) {
            Some(existing) => {
                existing.amount += inv.total();
                existing.count += 1;
            }
            None => totals.push(VendorTotal {
                vendor: inv.vendor().to_string(),
                amount: inv.total(),
                count: 1,
            }),
        }
    }
    totals
}

/// Vendors ranked by amount, highest first; ties keep first-appearance order.
pub fn top_vendors(invoices: &[Invoice], limit: usize) -> Vec<VendorTotal> {
    let mut totals = vendor_totals(invoices);
    totals.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal));
    totals.truncate(limit);
    totals
}

/// Which invoices a portal upload submits and which it withholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    /// Validated invoices, submitted.
    pub submitted: usize,
    /// Erroring invoices, not uploaded.
    pub withheld: usize,
}

impl SubmissionSummary {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let withheld = invoices.iter().filter(|inv| inv.is_error()).count();
        Self {
            submitted: invoices.len() - withheld,
            withheld,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{InvoiceFields, InvoiceId};

    fn inv(id: &str, vendor: &str, total: f64, error: bool) -> Invoice {
        let fields = InvoiceFields {
            invoice_no: format!("INV-{id}"),
            vendor: vendor.to_string(),
            gstin: "29ABCDE1234F1Z5".to_string(),
            total,
            date: "2025-01-15".to_string(),
        };
        let errors = if error {
            vec!["Invalid GSTIN format".to_string()]
        } else {
            vec![]
        };
        Invoice::with_errors(InvoiceId::new(id), fields, errors)
    }

    #[test]
    fn report_over_empty_set_is_all_zero() {
        let report = BatchReport::from_invoices(&[]);
        assert_eq!(report.total_invoices, 0);
        assert_eq!(report.total_amount, 0.0);
        assert_eq!(report.average_amount, 0.0);
        assert!(report.top_vendors.is_empty());
    }

    #[test]
    fn report_counts_amounts_and_statuses() {
        let invoices = vec![
            inv("1", "Tech Solutions Pvt Ltd", 25000.0, false),
            inv("2", "Office Supplies Co", 8500.0, false),
            inv("3", "Software Services Inc", 45000.0, true),
            inv("4", "Marketing Agency", 32000.0, false),
        ];
        let report = BatchReport::from_invoices(&invoices);

        assert_eq!(report.total_invoices, 4);
        assert_eq!(report.validated, 3);
        assert_eq!(report.errors, 1);
        assert_eq!(report.total_amount, 110500.0);
        assert_eq!(report.average_amount, 27625.0);
        assert_eq!(report.status_breakdown[1].count, 1);
        assert_eq!(report.top_vendors[0].vendor, "Software Services Inc");
    }

    #[test]
    fn vendors_are_grouped_and_capped() {
        let invoices = vec![
            inv("1", "A", 10.0, false),
            inv("2", "B", 50.0, false),
            inv("3", "A", 45.0, false),
            inv("4", "C", 1.0, false),
            inv("5", "D", 2.0, false),
            inv("6", "E", 3.0, false),
            inv("7", "F", 4.0, false),
        ];

        let top = top_vendors(&invoices, TOP_VENDOR_LIMIT);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], VendorTotal { vendor: "A".to_string(), amount: 55.0, count: 2 });
        assert_eq!(top[1].vendor, "B");
        assert!(top.iter().all(|v| v.vendor != "C"));
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let invoices = vec![inv("1", "X", 5.0, false), inv("2", "Y", 5.0, false)];
        let top = top_vendors(&invoices, 5);
        assert_eq!(top[0].vendor, "X");
        assert_eq!(top[1].vendor, "Y");
    }

    #[test]
    fn submission_withholds_erroring_invoices() {
        let invoices = vec![inv("1", "A", 1.0, false), inv("2", "B", 1.0, true)];
        assert_eq!(
            SubmissionSummary::from_invoices(&invoices),
            SubmissionSummary { submitted: 1, withheld: 1 }
        );
    }
}
