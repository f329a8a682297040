use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::entities::dataset::{ConsolidatedTable, SummaryReport};
use crate::domain::entities::invoice::{
    CellValue, ConsolidatedRow, Field, InvoiceSummary, RawRow, Status, YearMonth, FIELD_COUNT,
};
use crate::domain::errors::{ConsolidateError, DateParseError, SkippedRow};

const TEXT_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const TEXT_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

// Excel serial day numbers (1900 system) up to 9999-12-31.
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

/// Blank cells inherit the nearest non-blank value above them, field by field.
/// `SubDocRef` is never filled.
pub fn forward_fill(rows: Vec<RawRow>) -> Vec<RawRow> {
    let mut last: [CellValue; FIELD_COUNT] = Default::default();
    rows.into_iter()
        .map(|mut row| {
            for field in Field::FORWARD_FILLED {
                let idx = field.index();
                if row.cells[idx].is_blank() {
                    row.cells[idx] = last[idx].clone();
                } else {
                    last[idx] = row.cells[idx].clone();
                }
            }
            row
        })
        .collect()
}

pub fn consolidate(rows: Vec<RawRow>) -> Result<ConsolidatedTable, ConsolidateError> {
    let raw_count = rows.len();
    let rows: Vec<ConsolidatedRow> = forward_fill(rows)
        .into_iter()
        .filter_map(ConsolidatedRow::from_filled)
        .collect();

    info!(
        raw_rows = raw_count,
        consolidated_rows = rows.len(),
        "consolidated invoice rows"
    );

    if rows.is_empty() {
        return Err(ConsolidateError::EmptyResult);
    }
    Ok(ConsolidatedTable { rows })
}

/// First row per invoice number, in input order. Rows without an invoice
/// number are never merged with each other.
pub fn dedup_by_invoice(table: &ConsolidatedTable) -> ConsolidatedTable {
    let mut seen = HashSet::new();
    let rows = table
        .rows
        .iter()
        .filter(|row| {
            let key = row.invoice_key();
            key.is_empty() || seen.insert(key)
        })
        .cloned()
        .collect();
    ConsolidatedTable { rows }
}

pub fn summarize(table: &ConsolidatedTable) -> SummaryReport {
    let mut report = SummaryReport::default();

    for row in dedup_by_invoice(table).rows {
        if row.invoice_key().is_empty() {
            warn!(
                source_row = row.source_row(),
                sub_doc = %row.get(Field::SubDocRef).display(),
                "skipping row without invoice number"
            );
            report.skipped.push(SkippedRow::MissingInvoiceNumber {
                source_row: row.source_row(),
            });
            continue;
        }
        match parse_issue_date(&row) {
            Ok(issue_date) => report.summary.rows.push(summary_row(&row, issue_date)),
            Err(err) => {
                warn!(
                    source_row = err.source_row,
                    invoice = %err.invoice_number,
                    value = %err.value,
                    "skipping invoice with unreadable issue date"
                );
                report.skipped.push(err.into());
            }
        }
    }

    if !report.skipped.is_empty() {
        warn!(
            skipped = report.skipped.len(),
            kept = report.summary.len(),
            "summary excludes unusable invoice rows"
        );
    }
    report
}

fn summary_row(row: &ConsolidatedRow, issue_date: NaiveDate) -> InvoiceSummary {
    let receipt_date = row.get(Field::ReceiptDate).clone();
    InvoiceSummary {
        invoice_number: row.invoice_key(),
        issue_date,
        payer: row.get(Field::Payer).display(),
        description: row.get(Field::Description).display(),
        gross_amount: amount_or_zero(row, Field::GrossAmount),
        net_amount: amount_or_zero(row, Field::NetAmount),
        sub_doc_ref: row.get(Field::SubDocRef).display(),
        status: Status::from_receipt(&receipt_date),
        month: YearMonth::from_date(issue_date),
        receipt_date,
    }
}

pub fn parse_issue_date(row: &ConsolidatedRow) -> Result<NaiveDate, DateParseError> {
    let cell = row.get(Field::IssueDate);
    parse_date_cell(cell).ok_or_else(|| DateParseError {
        source_row: row.source_row(),
        invoice_number: row.invoice_key(),
        value: cell.display(),
    })
}

pub fn parse_date_cell(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(value) => Some(value.date()),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Text(text) => parse_date_text(text),
        CellValue::Blank | CellValue::Bool(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            TEXT_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|value| value.date())
        })
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_SERIAL_MAX {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Accepts `1234.56`, `1.234,56`, `1,234.56` and an optional `R$` prefix.
pub fn parse_amount(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(value) if value.is_finite() => Some(*value),
        CellValue::Text(text) => parse_amount_text(text),
        _ => None,
    }
}

fn parse_amount_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (Some(_), None) => cleaned.replace(',', ""),
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn amount_or_zero(row: &ConsolidatedRow, field: Field) -> f64 {
    let cell = row.get(field);
    parse_amount(cell).unwrap_or_else(|| {
        if !cell.is_blank() {
            debug!(
                source_row = row.source_row(),
                field = field.label(),
                value = %cell.display(),
                "amount is not numeric, counting as zero"
            );
        }
        0.0
    })
}
