//! Types and utilities for reading content model rows

use calamine::{Data, Range};
use content_model_core::config::WorkbookConfig;

/// Fixed column layout of the `Fields` sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// A: category, mapped to a form group
    Category,
    /// B: row kind marker (`Node`, `Field` or blank)
    Marker,
    /// C: machine name
    Name,
    /// D: label
    Label,
    /// E: description
    Description,
    /// F: required flag
    Required,
    /// G: cardinality
    Cardinality,
    /// H: type tag (field rows) or base type (type rows)
    TypeTag,
}

impl Column {
    /// Zero-based column index
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            Self::Category => 0,
            Self::Marker => 1,
            Self::Name => 2,
            Self::Label => 3,
            Self::Description => 4,
            Self::Required => 5,
            Self::Cardinality => 6,
            Self::TypeTag => 7,
        }
    }

    /// Column letter as shown in a spreadsheet
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Category => 'A',
            Self::Marker => 'B',
            Self::Name => 'C',
            Self::Label => 'D',
            Self::Description => 'E',
            Self::Required => 'F',
            Self::Cardinality => 'G',
            Self::TypeTag => 'H',
        }
    }
}

/// What a row's marker cell says it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Opens a content type block
    Type,
    /// A field of the current block
    Field,
    /// Empty marker: ends the current block
    Blank,
    /// Any other marker value (notes, section headings)
    Other,
}

/// Read-only view of one sheet row, addressed by 1-based row number
pub struct SheetRow<'a> {
    sheet: &'a Range<Data>,
    row: u32,
}

impl<'a> SheetRow<'a> {
    /// View row `row` (1-based) of `sheet`
    #[must_use]
    pub fn new(sheet: &'a Range<Data>, row: u32) -> Self {
        Self { sheet, row }
    }

    /// 1-based row number
    #[must_use]
    pub fn number(&self) -> u32 {
        self.row
    }

    /// Raw cell value; cells outside the used range read as empty
    #[must_use]
    pub fn cell(&self, column: Column) -> &'a Data {
        self.sheet
            .get_value((self.row.saturating_sub(1), column.index()))
            .unwrap_or(&Data::Empty)
    }

    /// Cell as trimmed text
    #[must_use]
    pub fn text(&self, column: Column) -> String {
        data_to_string(self.cell(column))
    }

    /// Classify the row by its marker cell
    #[must_use]
    pub fn kind(&self, config: &WorkbookConfig) -> RowKind {
        let marker = self.text(Column::Marker);
        if marker.is_empty() {
            RowKind::Blank
        } else if marker == config.type_marker {
            RowKind::Type
        } else if marker == config.field_marker {
            RowKind::Field
        } else {
            RowKind::Other
        }
    }
}

/// Last used row of a sheet, 1-based; `0` for an empty sheet
#[must_use]
pub fn last_row(sheet: &Range<Data>) -> u32 {
    sheet.end().map_or(0, |(row, _)| row + 1)
}

/// Convert Data to String
#[must_use]
pub fn data_to_string(data: &Data) -> String {
    match data {
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::String(s) => s.trim().to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{dt:?}"),
        Data::DateTimeIso(dt) => dt.to_string(),
        Data::DurationIso(d) => d.to_string(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

/// Parse boolean from Data
///
/// Formula cells arrive as their cached result, so a `=AND(...)` required
/// flag reads as `Data::Bool`.
#[must_use]
pub fn parse_boolean(data: &Data) -> bool {
    match data {
        Data::Bool(b) => *b,
        Data::String(s) => {
            let s_lower = s.trim().to_lowercase();
            s_lower == "true" || s_lower == "yes" || s_lower == "1" || s_lower == "y"
        }
        Data::Int(i) => *i != 0,
        Data::Float(f) => *f != 0.0,
        _ => false,
    }
}

/// Parse an integer cell. `Ok(None)` for an empty cell.
///
/// # Errors
///
/// Returns the offending text when the cell holds something other than a
/// whole number.
pub fn parse_integer(data: &Data) -> std::result::Result<Option<i64>, String> {
    match data {
        Data::Empty => Ok(None),
        Data::Int(i) => Ok(Some(*i)),
        #[allow(clippy::cast_possible_truncation)]
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(Some(*f as i64)),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => s.trim().parse::<i64>().map(Some).map_err(|_| s.trim().to_string()),
        other => Err(data_to_string(other)),
    }
}
