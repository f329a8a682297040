use std::collections::{BTreeSet, HashSet};

use crate::domain::consolidate::dedup_by_invoice;
use crate::domain::entities::dataset::{
    ConsolidatedTable, FilterOptions, FilterSelection, InvoiceSummaryTable,
};
use crate::domain::entities::invoice::Status;

pub fn filter(summary: &InvoiceSummaryTable, selection: &FilterSelection) -> InvoiceSummaryTable {
    if selection.is_unrestricted() {
        return summary.clone();
    }
    let rows = summary
        .rows
        .iter()
        .filter(|row| selection.matches(row))
        .cloned()
        .collect();
    InvoiceSummaryTable { rows }
}

/// Case-insensitive substring match on every field, one row per invoice.
/// The term is matched as given, surrounding whitespace included.
pub fn search(consolidated: &ConsolidatedTable, term: &str) -> ConsolidatedTable {
    let needle = term.to_lowercase();
    let matched = ConsolidatedTable {
        rows: consolidated
            .rows
            .iter()
            .filter(|row| row.contains_lowercase(&needle))
            .cloned()
            .collect(),
    };
    dedup_by_invoice(&matched)
}

pub fn filter_options(summary: &InvoiceSummaryTable) -> FilterOptions {
    let mut seen = HashSet::new();
    let payers = summary
        .rows
        .iter()
        .filter(|row| seen.insert(row.payer.as_str()))
        .map(|row| row.payer.clone())
        .collect();
    let months: BTreeSet<_> = summary.rows.iter().map(|row| row.month).collect();

    FilterOptions {
        payers,
        statuses: Status::ALL.to_vec(),
        months: months.into_iter().collect(),
    }
}
