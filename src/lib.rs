//! Invoice (nota fiscal) consolidation for the billing dashboard.
//!
//! The pipeline is `load -> summarize -> filter/search -> aggregate`; every
//! stage is a pure function over the tables produced by the previous one.

pub mod domain;
pub mod infra;
pub mod ui;
pub mod usecase;


pub use domain::consolidate::{consolidate, forward_fill, summarize};
pub use domain::entities::dataset::{
    ConsolidatedTable, DashboardAggregates, FilterSelection, InvoiceSummaryTable, SummaryReport,
};
pub use domain::entities::invoice::{CellValue, Field, InvoiceSummary, RawRow, Status, YearMonth};
pub use domain::entities::layout::SheetLayout;
pub use domain::errors::{ConsolidateError, DateParseError, LoadError, SkippedRow};
pub use usecase::services::query_service::{filter, search};
pub use usecase::services::report_service::aggregate;
