use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;

use crate::domain::entities::dataset::{
    DashboardAggregates, InvoiceSummaryTable, MonthlyTotals, PayerCount, PayerTotal, StatusCounts,
};
use crate::domain::entities::invoice::{Status, YearMonth};

pub const TOP_PAYERS_LIMIT: usize = 10;

#[derive(Default)]
struct PayerAccumulator {
    gross: f64,
    invoices: usize,
}

pub fn aggregate(summary: &InvoiceSummaryTable) -> DashboardAggregates {
    let mut invoice_numbers = HashSet::new();
    let mut gross_total = 0.0;
    let mut net_total = 0.0;
    let mut status_counts = StatusCounts::default();
    let mut monthly: BTreeMap<YearMonth, (f64, f64)> = BTreeMap::new();
    let mut payers: IndexMap<&str, PayerAccumulator> = IndexMap::new();

    for row in &summary.rows {
        invoice_numbers.insert(row.invoice_number.as_str());
        gross_total += row.gross_amount;
        net_total += row.net_amount;

        match row.status {
            Status::Paid => status_counts.paid += 1,
            Status::Pending => status_counts.pending += 1,
        }

        let month = monthly.entry(row.month).or_insert((0.0, 0.0));
        month.0 += row.gross_amount;
        month.1 += row.net_amount;

        let payer = payers.entry(row.payer.as_str()).or_default();
        payer.gross += row.gross_amount;
        payer.invoices += 1;
    }

    let gross_by_payer: Vec<PayerTotal> = payers
        .iter()
        .map(|(payer, acc)| PayerTotal {
            payer: payer.to_string(),
            gross: acc.gross,
        })
        .collect();

    // Stable sorts: equal keys stay in encounter order.
    let mut invoices_by_payer: Vec<PayerCount> = payers
        .iter()
        .map(|(payer, acc)| PayerCount {
            payer: payer.to_string(),
            invoices: acc.invoices,
        })
        .collect();
    invoices_by_payer.sort_by(|a, b| b.invoices.cmp(&a.invoices));

    let mut top_payers = gross_by_payer.clone();
    top_payers.sort_by(|a, b| b.gross.total_cmp(&a.gross));
    top_payers.truncate(TOP_PAYERS_LIMIT);

    DashboardAggregates {
        invoice_count: invoice_numbers.len(),
        gross_total,
        net_total,
        status_counts,
        monthly: monthly
            .into_iter()
            .map(|(month, (gross, net))| MonthlyTotals { month, gross, net })
            .collect(),
        gross_by_payer,
        invoices_by_payer,
        top_payers,
    }
}
