use std::sync::Arc;

use tracing::info;

use crate::domain::consolidate::summarize;
use crate::domain::entities::dataset::{
    ConsolidatedTable, DashboardAggregates, FilterOptions, FilterSelection, InvoiceSummaryTable,
};
use crate::domain::errors::{ConsolidateError, LoadError, SkippedRow};
use crate::infra::cache::LoadCache;
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::query_service::{filter, filter_options, search};
use crate::usecase::services::report_service::aggregate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardStatus {
    AwaitingUpload,
    NoData,
    Ready,
}

/// Everything the presentation layer renders for one interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub status: DashboardStatus,
    pub consolidated: Arc<ConsolidatedTable>,
    pub summary: InvoiceSummaryTable,
    pub filtered: InvoiceSummaryTable,
    pub search_results: Option<ConsolidatedTable>,
    pub aggregates: DashboardAggregates,
    pub options: FilterOptions,
    pub skipped_rows: Vec<SkippedRow>,
}

/// Session state for one user; every change reruns the pure pipeline.
pub struct DashboardState {
    import: ImportService,
    cache: LoadCache,
    status: DashboardStatus,
    consolidated: Arc<ConsolidatedTable>,
    summary: InvoiceSummaryTable,
    skipped: Vec<SkippedRow>,
    filters: FilterSelection,
    search_term: String,
}

impl DashboardState {
    pub fn new(import: ImportService) -> Self {
        Self::with_cache(import, LoadCache::default())
    }

    pub fn with_cache(import: ImportService, cache: LoadCache) -> Self {
        Self {
            import,
            cache,
            status: DashboardStatus::AwaitingUpload,
            consolidated: Arc::default(),
            summary: InvoiceSummaryTable::default(),
            skipped: Vec::new(),
            filters: FilterSelection::default(),
            search_term: String::new(),
        }
    }

    pub fn status(&self) -> DashboardStatus {
        self.status
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// An upload without invoice rows yields `NoData`; unreadable files are errors
    /// and leave the session waiting for a new upload.
    pub fn upload(&mut self, bytes: &[u8]) -> Result<DashboardStatus, LoadError> {
        let import = &self.import;
        let loaded = self.cache.get_or_load(bytes, |b| import.load(b));

        match loaded {
            Ok(table) => {
                let report = summarize(&table);
                info!(
                    consolidated = table.len(),
                    invoices = report.summary.len(),
                    skipped = report.skipped.len(),
                    "dashboard data ready"
                );
                self.consolidated = table;
                self.summary = report.summary;
                self.skipped = report.skipped;
                self.status = DashboardStatus::Ready;
            }
            Err(ConsolidateError::EmptyResult) => {
                info!("upload has no invoice rows");
                self.clear(DashboardStatus::NoData);
            }
            Err(ConsolidateError::Load(err)) => {
                self.clear(DashboardStatus::AwaitingUpload);
                return Err(err);
            }
        }
        Ok(self.status)
    }

    pub fn set_filters(&mut self, filters: FilterSelection) {
        self.filters = filters;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn view(&self) -> DashboardView {
        let search_results = if self.search_term.trim().is_empty() {
            None
        } else {
            Some(search(&self.consolidated, &self.search_term))
        };

        DashboardView {
            status: self.status,
            consolidated: Arc::clone(&self.consolidated),
            summary: self.summary.clone(),
            filtered: filter(&self.summary, &self.filters),
            search_results,
            aggregates: aggregate(&self.summary),
            options: filter_options(&self.summary),
            skipped_rows: self.skipped.clone(),
        }
    }

    fn clear(&mut self, status: DashboardStatus) {
        self.status = status;
        self.consolidated = Arc::default();
        self.summary = InvoiceSummaryTable::default();
        self.skipped.clear();
    }
}
