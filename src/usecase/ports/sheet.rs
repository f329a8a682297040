use crate::domain::entities::invoice::RawRow;
use crate::domain::entities::layout::SheetLayout;
use crate::domain::errors::LoadError;

/// Turns an uploaded workbook into positional invoice rows.
pub trait SheetReader: Send + Sync {
    fn read_rows(&self, bytes: &[u8], layout: &SheetLayout) -> Result<Vec<RawRow>, LoadError>;
}
