use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sheet not found: {sheet} (available: {available})")]
    MissingSheet { sheet: String, available: String },

    #[error("failed to read sheet {sheet}: {message}")]
    Sheet { sheet: String, message: String },

    #[error("unexpected column layout in sheet {sheet}: {reason}")]
    ColumnLayout { sheet: String, reason: String },

    #[error("invalid sheet layout: {reason}")]
    InvalidLayout { reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("row {source_row}: invoice {invoice_number:?} has an unreadable issue date {value:?}")]
pub struct DateParseError {
    pub source_row: usize,
    pub invoice_number: String,
    pub value: String,
}

/// An invoice row left out of the summary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkippedRow {
    #[error("row {source_row}: no invoice number")]
    MissingInvoiceNumber { source_row: usize },

    #[error(transparent)]
    IssueDate(#[from] DateParseError),
}

impl SkippedRow {
    pub fn source_row(&self) -> usize {
        match self {
            SkippedRow::MissingInvoiceNumber { source_row } => *source_row,
            SkippedRow::IssueDate(err) => err.source_row,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConsolidateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("no rows with a sub-document reference were found")]
    EmptyResult,
}

impl ConsolidateError {
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ConsolidateError::EmptyResult)
    }
}
