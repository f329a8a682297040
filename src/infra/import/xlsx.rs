use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, instrument};

use crate::domain::entities::invoice::{CellValue, RawRow, FIELD_COUNT};
use crate::domain::entities::layout::{column_letters, SheetLayout};
use crate::domain::errors::LoadError;
use crate::usecase::ports::sheet::SheetReader;

pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Blank,
        Data::String(v) => CellValue::text(v.as_str()),
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::DateTime(v) => v
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Number(v.as_f64())),
        Data::DateTimeIso(v) => parse_iso_datetime(v)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::text(v.as_str())),
        Data::DurationIso(v) => CellValue::text(v.as_str()),
        Data::Error(v) => CellValue::text(v.to_string()),
    }
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineSheetReader;

impl SheetReader for CalamineSheetReader {
    #[instrument(level = "debug", skip(self, bytes), fields(bytes = bytes.len(), sheet = %layout.sheet_name))]
    fn read_rows(&self, bytes: &[u8], layout: &SheetLayout) -> Result<Vec<RawRow>, LoadError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        let sheet_names = workbook.sheet_names();
        if !sheet_names.iter().any(|name| name == &layout.sheet_name) {
            return Err(LoadError::MissingSheet {
                sheet: layout.sheet_name.clone(),
                available: sheet_names.join(", "),
            });
        }

        let range = workbook
            .worksheet_range(&layout.sheet_name)
            .map_err(|err| LoadError::Sheet {
                sheet: layout.sheet_name.clone(),
                message: err.to_string(),
            })?;

        let rows = rows_from_range(&range, layout)?;
        debug!(rows = rows.len(), "read invoice sheet");
        Ok(rows)
    }
}

/// Binds the sheet to the canonical fields by absolute position.
pub fn rows_from_range(range: &Range<Data>, layout: &SheetLayout) -> Result<Vec<RawRow>, LoadError> {
    let span = layout.column_span()?;
    let layout_error = |reason: String| LoadError::ColumnLayout {
        sheet: layout.sheet_name.clone(),
        reason,
    };

    let Some((last_row, last_col)) = range.end() else {
        return Err(layout_error("sheet is empty".to_string()));
    };
    let (last_row, last_col) = (last_row as usize, last_col as usize);

    if last_col < span.end - 1 {
        return Err(layout_error(format!(
            "expected {FIELD_COUNT} columns {}, sheet ends at column {}",
            layout.column_range_label()?,
            column_letters(last_col)
        )));
    }
    if last_row < layout.header_row() {
        return Err(layout_error(format!(
            "sheet ends at row {}, before header row {}",
            last_row + 1,
            layout.header_row() + 1
        )));
    }

    let cell_at = |row: usize, col: usize| {
        range
            .get_value((row as u32, col as u32))
            .map(cell_value)
            .unwrap_or_default()
    };

    let missing_headers: Vec<String> = span
        .clone()
        .filter(|&col| cell_at(layout.header_row(), col).is_blank())
        .map(column_letters)
        .collect();
    if !missing_headers.is_empty() {
        return Err(layout_error(format!(
            "header row {} has no label in column(s) {}",
            layout.header_row() + 1,
            missing_headers.join(", ")
        )));
    }

    let rows = (layout.first_data_row()..=last_row)
        .map(|row| {
            let mut cells: [CellValue; FIELD_COUNT] = Default::default();
            for (slot, col) in cells.iter_mut().zip(span.clone()) {
                *slot = cell_at(row, col);
            }
            RawRow::new(row + 1, cells)
        })
        .collect();
    Ok(rows)
}
