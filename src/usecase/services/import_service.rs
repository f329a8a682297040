use std::path::Path;
use std::sync::Arc;

use tracing::instrument;

use crate::domain::consolidate::consolidate;
use crate::domain::entities::dataset::ConsolidatedTable;
use crate::domain::entities::layout::SheetLayout;
use crate::domain::errors::{ConsolidateError, LoadError};
use crate::usecase::ports::sheet::SheetReader;

pub struct ImportService {
    reader: Arc<dyn SheetReader>,
    layout: SheetLayout,
}

impl ImportService {
    pub fn new(reader: Arc<dyn SheetReader>, layout: SheetLayout) -> Self {
        Self { reader, layout }
    }

    #[instrument(level = "info", skip(self, bytes), fields(sheet = %self.layout.sheet_name))]
    pub fn load(&self, bytes: &[u8]) -> Result<ConsolidatedTable, ConsolidateError> {
        let rows = self.reader.read_rows(bytes, &self.layout)?;
        consolidate(rows)
    }

    pub fn load_path(&self, path: &Path) -> Result<ConsolidatedTable, ConsolidateError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.load(&bytes)
    }
}
