use std::collections::BTreeSet;

use crate::domain::entities::invoice::{ConsolidatedRow, InvoiceSummary, Status, YearMonth};
use crate::domain::errors::SkippedRow;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsolidatedTable {
    pub rows: Vec<ConsolidatedRow>,
}

impl ConsolidatedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvoiceSummaryTable {
    pub rows: Vec<InvoiceSummary>,
}

impl InvoiceSummaryTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Summary plus the rows left out because they had no invoice number or no
/// usable issue date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryReport {
    pub summary: InvoiceSummaryTable,
    pub skipped: Vec<SkippedRow>,
}

/// An empty set leaves that dimension unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub payers: BTreeSet<String>,
    pub statuses: BTreeSet<Status>,
    pub months: BTreeSet<YearMonth>,
}

impl FilterSelection {
    pub fn is_unrestricted(&self) -> bool {
        self.payers.is_empty() && self.statuses.is_empty() && self.months.is_empty()
    }

    pub fn matches(&self, row: &InvoiceSummary) -> bool {
        (self.payers.is_empty() || self.payers.contains(&row.payer))
            && (self.statuses.is_empty() || self.statuses.contains(&row.status))
            && (self.months.is_empty() || self.months.contains(&row.month))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub payers: Vec<String>,
    pub statuses: Vec<Status>,
    pub months: Vec<YearMonth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub paid: usize,
    pub pending: usize,
}

impl StatusCounts {
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Paid => self.paid,
            Status::Pending => self.pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    pub month: YearMonth,
    pub gross: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayerTotal {
    pub payer: String,
    pub gross: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayerCount {
    pub payer: String,
    pub invoices: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardAggregates {
    pub invoice_count: usize,
    pub gross_total: f64,
    pub net_total: f64,
    pub status_counts: StatusCounts,
    pub monthly: Vec<MonthlyTotals>,
    pub gross_by_payer: Vec<PayerTotal>,
    pub invoices_by_payer: Vec<PayerCount>,
    pub top_payers: Vec<PayerTotal>,
}
