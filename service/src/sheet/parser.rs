//! Content model extractor
//!
//! Scans the `Fields` sheet top to bottom. A `Node` row opens a content type
//! block and the `Field` rows under it are its fields. The row right under
//! the `Node` row is the block's header row; after it, a blank marker (or the
//! next `Node` row) closes the block.

use super::types::{
    Column, RowKind, SheetRow, data_to_string, last_row, parse_boolean, parse_integer,
};
use calamine::{Data, Range, Reader, Xlsx, open_workbook_auto};
use content_model_core::config::WorkbookConfig;
use content_model_core::error::{ContentModelError, Result, RowIssue};
use content_model_core::types::{
    ContentModel, ContentTypeDefinition, ContentTypeSchema, FieldDefinition, REFERENCE_PREFIX,
    ReferenceTarget, UNLIMITED_CARDINALITY,
};
use indexmap::IndexMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Outside any block, looking for a type row
    SeekingType,
    /// Inside the block opened at `type_row`
    CollectingFields { type_row: u32 },
    /// Nothing more to read
    Finished,
}

/// Something the scanner found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanEvent {
    TypeRow(u32),
    FieldRow { type_row: u32, row: u32 },
}

/// Two-state row scanner over a sheet
struct RowScanner<'a> {
    sheet: &'a Range<Data>,
    config: &'a WorkbookConfig,
    next_row: u32,
    last_row: u32,
    state: ScanState,
    /// Stop after the first block closes
    single_block: bool,
}

impl<'a> RowScanner<'a> {
    /// Scan the whole sheet
    fn whole_sheet(sheet: &'a Range<Data>, config: &'a WorkbookConfig) -> Self {
        Self {
            sheet,
            config,
            next_row: 1,
            last_row: last_row(sheet),
            state: ScanState::SeekingType,
            single_block: false,
        }
    }

    /// Scan only the block opened at `type_row`
    fn block(sheet: &'a Range<Data>, config: &'a WorkbookConfig, type_row: u32) -> Self {
        Self {
            sheet,
            config,
            next_row: type_row + 1,
            last_row: last_row(sheet),
            state: ScanState::CollectingFields { type_row },
            single_block: true,
        }
    }
}

impl Iterator for RowScanner<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        loop {
            if self.state == ScanState::Finished || self.next_row > self.last_row {
                return None;
            }
            let row = self.next_row;
            self.next_row += 1;
            let kind = SheetRow::new(self.sheet, row).kind(self.config);

            match (self.state, kind) {
                (ScanState::Finished, _) => return None,
                (ScanState::SeekingType, _) if row > self.config.row_limit => {
                    self.state = ScanState::Finished;
                }
                (ScanState::SeekingType, RowKind::Type) => {
                    self.state = ScanState::CollectingFields { type_row: row };
                    return Some(ScanEvent::TypeRow(row));
                }
                (ScanState::SeekingType, _) => {}
                (ScanState::CollectingFields { type_row }, RowKind::Field) => {
                    return Some(ScanEvent::FieldRow { type_row, row });
                }
                (ScanState::CollectingFields { type_row }, RowKind::Blank)
                    if row == type_row + 1 => {}
                (ScanState::CollectingFields { .. }, RowKind::Blank) => {
                    self.state = if self.single_block {
                        ScanState::Finished
                    } else {
                        ScanState::SeekingType
                    };
                }
                (ScanState::CollectingFields { .. }, RowKind::Type) => {
                    if self.single_block || row > self.config.row_limit {
                        self.state = ScanState::Finished;
                    } else {
                        self.state = ScanState::CollectingFields { type_row: row };
                        return Some(ScanEvent::TypeRow(row));
                    }
                }
                (ScanState::CollectingFields { .. }, RowKind::Other) => {}
            }
        }
    }
}

/// Extracts content type and field definitions from the content model sheet
pub struct ModelExtractor {
    config: WorkbookConfig,
}

impl ModelExtractor {
    /// Create an extractor for the given workbook layout
    #[must_use]
    pub fn new(config: WorkbookConfig) -> Self {
        Self { config }
    }

    /// Workbook layout in use
    #[must_use]
    pub fn config(&self) -> &WorkbookConfig {
        &self.config
    }

    /// Open a workbook file (xlsx, xls, ods) and read the configured sheet
    ///
    /// # Errors
    ///
    /// Returns `Workbook` if the file cannot be opened or has no such sheet.
    pub fn open_sheet(&self, path: &Path) -> Result<Range<Data>> {
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            ContentModelError::workbook(format!("Failed to open {}: {e}", path.display()))
        })?;

        if !workbook.sheet_names().contains(&self.config.sheet_name) {
            return Err(ContentModelError::workbook(format!(
                "{} has no sheet named '{}'",
                path.display(),
                self.config.sheet_name
            )));
        }

        workbook
            .worksheet_range(&self.config.sheet_name)
            .map_err(|e| {
                ContentModelError::workbook(format!(
                    "Failed to read sheet '{}': {e}",
                    self.config.sheet_name
                ))
            })
    }

    /// Read the configured sheet from xlsx bytes already in memory
    ///
    /// # Errors
    ///
    /// Returns `Workbook` if the bytes are not a valid xlsx file or lack the sheet.
    pub fn sheet_from_bytes(&self, bytes: Vec<u8>) -> Result<Range<Data>> {
        let cursor = Cursor::new(bytes);
        let mut workbook: Xlsx<_> = Xlsx::new(cursor)
            .map_err(|e| ContentModelError::workbook(format!("Failed to parse Excel file: {e}")))?;

        if !workbook.sheet_names().contains(&self.config.sheet_name) {
            return Err(ContentModelError::workbook(format!(
                "workbook has no sheet named '{}'",
                self.config.sheet_name
            )));
        }

        workbook
            .worksheet_range(&self.config.sheet_name)
            .map_err(|e| {
                ContentModelError::workbook(format!(
                    "Failed to read sheet '{}': {e}",
                    self.config.sheet_name
                ))
            })
    }

    /// One definition per type row, keyed by name, in sheet order
    ///
    /// # Errors
    ///
    /// Returns `InvalidSheet` with every malformed type row.
    pub fn extract_content_types(
        &self,
        sheet: &Range<Data>,
    ) -> Result<IndexMap<String, ContentTypeDefinition>> {
        let mut issues = Vec::new();
        let types = self.collect_content_types(sheet, &mut issues);
        into_result(types, issues)
    }

    /// Fields declared in the block of `content_type`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSheet` with every malformed field row of the block.
    pub fn extract_fields(
        &self,
        sheet: &Range<Data>,
        content_type: &ContentTypeDefinition,
    ) -> Result<Vec<FieldDefinition>> {
        let mut issues = Vec::new();
        let fields = self.collect_fields(sheet, content_type, &mut issues);
        into_result(fields, issues)
    }

    /// Every type with its fields. All malformed rows are gathered in one
    /// pass and returned together.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSheet` if any type or field row is malformed.
    pub fn extract_model(&self, sheet: &Range<Data>) -> Result<ContentModel> {
        let mut issues = Vec::new();
        let types = self.collect_content_types(sheet, &mut issues);

        let mut model = ContentModel::default();
        for (name, definition) in types {
            let fields = self.collect_fields(sheet, &definition, &mut issues);
            model
                .types
                .insert(name, ContentTypeSchema { definition, fields });
        }

        let model = into_result(model, issues)?;
        info!(
            types = model.types.len(),
            fields = model.field_count(),
            "Extracted content model"
        );
        Ok(model)
    }

    fn collect_content_types(
        &self,
        sheet: &Range<Data>,
        issues: &mut Vec<RowIssue>,
    ) -> IndexMap<String, ContentTypeDefinition> {
        let mut types = IndexMap::new();

        for event in RowScanner::whole_sheet(sheet, &self.config) {
            let ScanEvent::TypeRow(row) = event else {
                continue;
            };
            let Some(definition) = self.parse_type_row(&SheetRow::new(sheet, row), issues) else {
                continue;
            };
            if types.contains_key(&definition.name) {
                issues.push(RowIssue::at(
                    row,
                    Column::Name.letter(),
                    format!("duplicate content type '{}'", definition.name),
                ));
                continue;
            }
            debug!(row, name = %definition.name, "Found content type");
            types.insert(definition.name.clone(), definition);
        }

        types
    }

    fn collect_fields(
        &self,
        sheet: &Range<Data>,
        content_type: &ContentTypeDefinition,
        issues: &mut Vec<RowIssue>,
    ) -> Vec<FieldDefinition> {
        RowScanner::block(sheet, &self.config, content_type.source_row)
            .filter_map(|event| match event {
                ScanEvent::FieldRow { type_row, row } => {
                    self.parse_field_row(&SheetRow::new(sheet, row), type_row, issues)
                }
                ScanEvent::TypeRow(_) => None,
            })
            .collect()
    }

    fn parse_type_row(
        &self,
        row: &SheetRow<'_>,
        issues: &mut Vec<RowIssue>,
    ) -> Option<ContentTypeDefinition> {
        let raw_name = row.text(Column::Name);
        let name = raw_name
            .strip_prefix(&self.config.type_name_prefix)
            .unwrap_or(&raw_name)
            .trim()
            .to_string();
        let label = row.text(Column::Label);

        let mut valid = true;
        if name.is_empty() {
            issues.push(RowIssue::at(
                row.number(),
                Column::Name.letter(),
                "content type name is blank",
            ));
            valid = false;
        }
        if label.is_empty() {
            issues.push(RowIssue::at(
                row.number(),
                Column::Label.letter(),
                "content type label is blank",
            ));
            valid = false;
        }
        if !valid {
            return None;
        }

        let base_type = match row.text(Column::TypeTag) {
            base if base.is_empty() => self.config.default_base_type.clone(),
            base => base,
        };

        Some(ContentTypeDefinition {
            name,
            label,
            description: self.description(row),
            base_type,
            source_row: row.number(),
        })
    }

    fn parse_field_row(
        &self,
        row: &SheetRow<'_>,
        type_row: u32,
        issues: &mut Vec<RowIssue>,
    ) -> Option<FieldDefinition> {
        let number = row.number();
        let name = row.text(Column::Name);
        let label = row.text(Column::Label);
        let type_tag = row.text(Column::TypeTag);
        let before = issues.len();

        if name.is_empty() {
            issues.push(RowIssue::at(number, Column::Name.letter(), "field name is blank"));
        }
        if label.is_empty() {
            issues.push(RowIssue::at(number, Column::Label.letter(), "field label is blank"));
        }
        if type_tag.is_empty() {
            issues.push(RowIssue::at(number, Column::TypeTag.letter(), "type tag is blank"));
        } else if type_tag.starts_with(REFERENCE_PREFIX) {
            if let Err(e) = type_tag.parse::<ReferenceTarget>() {
                issues.push(RowIssue::at(number, Column::TypeTag.letter(), e.to_string()));
            }
        }

        let cardinality = match parse_integer(row.cell(Column::Cardinality)) {
            Ok(None) => 1,
            Ok(Some(value)) => match i32::try_from(value) {
                Ok(value) if value >= 1 || value == UNLIMITED_CARDINALITY => value,
                _ => {
                    issues.push(RowIssue::at(
                        number,
                        Column::Cardinality.letter(),
                        format!("cardinality {value} must be positive or {UNLIMITED_CARDINALITY}"),
                    ));
                    1
                }
            },
            Err(text) => {
                issues.push(RowIssue::at(
                    number,
                    Column::Cardinality.letter(),
                    format!("cardinality '{text}' is not an integer"),
                ));
                1
            }
        };

        if issues.len() > before {
            return None;
        }

        let required = parse_boolean(row.cell(Column::Required));
        let weight = if required {
            i64::from(number) - i64::from(type_row + 1)
        } else {
            i64::from(number)
        };

        Some(FieldDefinition {
            name,
            label,
            description: self.description(row),
            type_tag,
            required,
            cardinality,
            weight,
            group: self
                .config
                .group_for_category(&data_to_string(row.cell(Column::Category))),
            source_row: number,
        })
    }

    fn description(&self, row: &SheetRow<'_>) -> String {
        let description = row.text(Column::Description);
        if self.config.is_placeholder(&description) {
            String::new()
        } else {
            description
        }
    }
}

impl Default for ModelExtractor {
    fn default() -> Self {
        Self::new(WorkbookConfig::default())
    }
}

fn into_result<T>(value: T, mut issues: Vec<RowIssue>) -> Result<T> {
    if issues.is_empty() {
        Ok(value)
    } else {
        issues.sort_by_key(|issue| (issue.row, issue.column));
        Err(ContentModelError::InvalidSheet { issues })
    }
}
