use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

pub const FIELD_COUNT: usize = 8;

/// Canonical columns of the invoice sheet, in source (positional) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    InvoiceNumber,
    IssueDate,
    Payer,
    Description,
    GrossAmount,
    ReceiptDate,
    NetAmount,
    SubDocRef,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::InvoiceNumber,
        Field::IssueDate,
        Field::Payer,
        Field::Description,
        Field::GrossAmount,
        Field::ReceiptDate,
        Field::NetAmount,
        Field::SubDocRef,
    ];

    /// Every field except `SubDocRef`, which is never inherited.
    pub const FORWARD_FILLED: [Field; FIELD_COUNT - 1] = [
        Field::InvoiceNumber,
        Field::IssueDate,
        Field::Payer,
        Field::Description,
        Field::GrossAmount,
        Field::ReceiptDate,
        Field::NetAmount,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::InvoiceNumber => "InvoiceNumber",
            Field::IssueDate => "IssueDate",
            Field::Payer => "Payer",
            Field::Description => "Description",
            Field::GrossAmount => "GrossAmount",
            Field::ReceiptDate => "ReceiptDate",
            Field::NetAmount => "NetAmount",
            Field::SubDocRef => "SubDocRef",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Blank,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    /// Whitespace-only text is treated the same as an empty cell.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            CellValue::Blank
        } else {
            CellValue::Text(value)
        }
    }

    pub fn date(value: NaiveDate) -> Self {
        CellValue::Date(value.and_time(NaiveTime::MIN))
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::Text(v) => v.trim().is_empty(),
            CellValue::Number(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn display(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Text(v) => v.trim().to_string(),
            CellValue::Number(v) => format_f64(*v),
            CellValue::Bool(v) => v.to_string(),
            CellValue::Date(v) if v.time() == NaiveTime::MIN => {
                v.date().format("%Y-%m-%d").to_string()
            }
            CellValue::Date(v) => v.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::date(value)
    }
}

pub fn format_f64(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.abs() >= i64::MAX as f64 {
        format!("{value}")
    } else if (value.fract()).abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        let mut text = format!("{value:.6}");
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
        text
    }
}

/// One physical sheet row bound positionally to the canonical fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    /// 1-based row number in the source sheet, 0 when built in memory.
    pub source_row: usize,
    pub cells: [CellValue; FIELD_COUNT],
}

impl RawRow {
    pub fn new(source_row: usize, cells: [CellValue; FIELD_COUNT]) -> Self {
        Self { source_row, cells }
    }

    pub fn get(&self, field: Field) -> &CellValue {
        &self.cells[field.index()]
    }

    pub fn set(&mut self, field: Field, value: CellValue) {
        self.cells[field.index()] = value;
    }
}

/// A forward-filled row that carries a sub-document reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedRow {
    source_row: usize,
    cells: [CellValue; FIELD_COUNT],
}

impl ConsolidatedRow {
    pub fn from_filled(row: RawRow) -> Option<Self> {
        if row.get(Field::SubDocRef).is_blank() {
            return None;
        }
        Some(Self {
            source_row: row.source_row,
            cells: row.cells,
        })
    }

    pub fn source_row(&self) -> usize {
        self.source_row
    }

    pub fn get(&self, field: Field) -> &CellValue {
        &self.cells[field.index()]
    }

    pub fn cells(&self) -> &[CellValue; FIELD_COUNT] {
        &self.cells
    }

    pub fn invoice_key(&self) -> String {
        self.get(Field::InvoiceNumber).display()
    }

    /// `needle` must already be lowercased.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        self.cells
            .iter()
            .any(|cell| cell.display().to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Paid,
    Pending,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Paid, Status::Pending];

    pub fn from_receipt(receipt: &CellValue) -> Self {
        if receipt.is_blank() {
            Status::Pending
        } else {
            Status::Paid
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Paid => "Pago",
            Status::Pending => "Pendente",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pago" | "paid" => Ok(Status::Paid),
            "pendente" | "pending" => Ok(Status::Pending),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got: {trimmed}"))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| format!("invalid year in: {trimmed}"))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| format!("invalid month in: {trimmed}"))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in: {trimmed}"))
    }
}

/// One row per distinct invoice number, with derived status and month.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceSummary {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub payer: String,
    pub description: String,
    pub gross_amount: f64,
    pub receipt_date: CellValue,
    pub net_amount: f64,
    pub sub_doc_ref: String,
    pub status: Status,
    pub month: YearMonth,
}
