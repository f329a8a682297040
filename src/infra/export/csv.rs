use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::entities::dataset::{ConsolidatedTable, DashboardAggregates, InvoiceSummaryTable};
use crate::domain::entities::invoice::{format_f64, Field, Status};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryRecord<'a> {
    invoice_number: &'a str,
    issue_date: String,
    payer: &'a str,
    description: &'a str,
    gross_amount: String,
    receipt_date: String,
    net_amount: String,
    sub_doc_ref: &'a str,
    status: &'static str,
    month: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MonthlyRecord {
    month: String,
    gross_amount: String,
    net_amount: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PayerTotalRecord<'a> {
    payer: &'a str,
    gross_amount: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PayerCountRecord<'a> {
    payer: &'a str,
    invoices: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct StatusRecord {
    status: &'static str,
    invoices: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TotalsRecord {
    invoices: usize,
    gross_amount: String,
    net_amount: String,
}

pub fn write_summary_csv<W: Write>(writer: W, table: &InvoiceSummaryTable) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if table.is_empty() {
        csv_writer
            .write_record(summary_headers())
            .context("failed to write summary header")?;
    }
    for row in &table.rows {
        csv_writer
            .serialize(SummaryRecord {
                invoice_number: &row.invoice_number,
                issue_date: row.issue_date.format("%Y-%m-%d").to_string(),
                payer: &row.payer,
                description: &row.description,
                gross_amount: format_f64(row.gross_amount),
                receipt_date: row.receipt_date.display(),
                net_amount: format_f64(row.net_amount),
                sub_doc_ref: &row.sub_doc_ref,
                status: row.status.label(),
                month: row.month.to_string(),
            })
            .with_context(|| format!("failed to write summary row: {}", row.invoice_number))?;
    }
    csv_writer.flush().context("failed to flush summary csv")?;
    Ok(())
}

fn summary_headers() -> Vec<&'static str> {
    let mut headers: Vec<&'static str> = Field::ALL.iter().map(|field| field.label()).collect();
    headers.extend(["Status", "Month"]);
    headers
}

pub fn write_consolidated_csv<W: Write>(writer: W, table: &ConsolidatedTable) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(Field::ALL.iter().map(|field| field.label()))
        .context("failed to write consolidated header")?;
    for row in &table.rows {
        csv_writer
            .write_record(row.cells().iter().map(|cell| cell.display()))
            .with_context(|| format!("failed to write consolidated row {}", row.source_row()))?;
    }
    csv_writer.flush().context("failed to flush consolidated csv")?;
    Ok(())
}

fn write_records<T: Serialize>(path: &Path, records: impl IntoIterator<Item = T>) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create csv: {}", path.display()))?;
    let mut csv_writer = csv::Writer::from_writer(file);
    for record in records {
        csv_writer
            .serialize(record)
            .with_context(|| format!("failed to write csv record: {}", path.display()))?;
    }
    csv_writer
        .flush()
        .with_context(|| format!("failed to flush csv: {}", path.display()))?;
    Ok(())
}

/// One file per reduction; returns the written paths.
pub fn write_aggregates_csv(dir: &Path, aggregates: &DashboardAggregates) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir: {}", dir.display()))?;

    let totals = dir.join("totals.csv");
    write_records(
        &totals,
        [TotalsRecord {
            invoices: aggregates.invoice_count,
            gross_amount: format_f64(aggregates.gross_total),
            net_amount: format_f64(aggregates.net_total),
        }],
    )?;

    let status = dir.join("status.csv");
    write_records(
        &status,
        Status::ALL.iter().map(|s| StatusRecord {
            status: s.label(),
            invoices: aggregates.status_counts.get(*s),
        }),
    )?;

    let monthly = dir.join("monthly.csv");
    write_records(
        &monthly,
        aggregates.monthly.iter().map(|m| MonthlyRecord {
            month: m.month.to_string(),
            gross_amount: format_f64(m.gross),
            net_amount: format_f64(m.net),
        }),
    )?;

    let by_payer = dir.join("gross_by_payer.csv");
    write_records(
        &by_payer,
        aggregates.gross_by_payer.iter().map(|p| PayerTotalRecord {
            payer: &p.payer,
            gross_amount: format_f64(p.gross),
        }),
    )?;

    let counts = dir.join("invoices_by_payer.csv");
    write_records(
        &counts,
        aggregates.invoices_by_payer.iter().map(|p| PayerCountRecord {
            payer: &p.payer,
            invoices: p.invoices,
        }),
    )?;

    let top = dir.join("top_payers.csv");
    write_records(
        &top,
        aggregates.top_payers.iter().map(|p| PayerTotalRecord {
            payer: &p.payer,
            gross_amount: format_f64(p.gross),
        }),
    )?;

    Ok(vec![totals, status, monthly, by_payer, counts, top])
}
