use crate::domain::entities::invoice::FIELD_COUNT;
use crate::domain::errors::LoadError;

pub const DEFAULT_SHEET_NAME: &str = "NF 22-25 CAR SP";
pub const DEFAULT_SKIP_ROWS: usize = 5;
pub const DEFAULT_FIRST_COLUMN: &str = "B";

/// Where the invoice table lives inside the workbook.
///
/// `skip_rows` title rows are ignored, the next row is the header and data
/// starts right below it. Columns are bound by position starting at
/// `first_column`; header labels are only checked for presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub skip_rows: usize,
    pub first_column: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            skip_rows: DEFAULT_SKIP_ROWS,
            first_column: DEFAULT_FIRST_COLUMN.to_string(),
        }
    }
}

impl SheetLayout {
    pub fn header_row(&self) -> usize {
        self.skip_rows
    }

    pub fn first_data_row(&self) -> usize {
        self.skip_rows + 1
    }

    /// 0-based index of the first bound column.
    pub fn first_column_index(&self) -> Result<usize, LoadError> {
        column_index(&self.first_column).ok_or_else(|| LoadError::InvalidLayout {
            reason: format!("invalid column letter: {:?}", self.first_column),
        })
    }

    pub fn column_span(&self) -> Result<std::ops::Range<usize>, LoadError> {
        let start = self.first_column_index()?;
        Ok(start..start + FIELD_COUNT)
    }

    pub fn column_range_label(&self) -> Result<String, LoadError> {
        let span = self.column_span()?;
        Ok(format!(
            "{}:{}",
            column_letters(span.start),
            column_letters(span.end - 1)
        ))
    }
}

/// `"A"` -> 0, `"I"` -> 8, `"AA"` -> 26.
pub fn column_index(letters: &str) -> Option<usize> {
    let trimmed = letters.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut index = 0_usize;
    for ch in trimmed.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_binds_b_through_i() {
        let layout = SheetLayout::default();
        assert_eq!(layout.column_span().expect("valid layout"), 1..9);
        assert_eq!(layout.column_range_label().expect("valid layout"), "B:I");
        assert_eq!(layout.first_data_row(), 6);
    }

    #[test]
    fn column_letters_round_trip_common_columns() {
        assert_eq!(column_index("a"), Some(0));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_index("B2"), None);
        assert_eq!(column_index(""), None);
    }
}
