//! Helper functions to generate content model workbooks for testing

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

/// One cell value of a fixture row
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    /// Left empty
    Empty,
    /// Text cell
    Text(&'a str),
    /// Boolean cell
    Bool(bool),
    /// Numeric cell
    Number(f64),
}

use Cell::{Bool, Empty, Number, Text};

/// A fixture row: 1-based row number and columns A..H
pub type Row<'a> = (u32, [Cell<'a>; 8]);

/// Write `rows` into a sheet named `sheet_name` and save the workbook
pub fn write_rows(path: &Path, sheet_name: &str, rows: &[Row<'_>]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (row, cells) in rows {
        write_row(sheet, *row, cells)?;
    }

    workbook.save(path)
}

fn write_row(sheet: &mut Worksheet, row: u32, cells: &[Cell<'_>; 8]) -> Result<(), XlsxError> {
    for (col, cell) in (0u16..).zip(cells) {
        match cell {
            Empty => {}
            Text(text) => {
                sheet.write(row - 1, col, *text)?;
            }
            Bool(value) => {
                sheet.write(row - 1, col, *value)?;
            }
            Number(value) => {
                sheet.write(row - 1, col, *value)?;
            }
        }
    }
    Ok(())
}

/// A `Node` row
pub fn node<'a>(name: &'a str, label: &'a str, description: &'a str, base: &'a str) -> [Cell<'a>; 8] {
    [
        Empty,
        Text("Node"),
        Text(name),
        Text(label),
        text_or_empty(description),
        Empty,
        Empty,
        text_or_empty(base),
    ]
}

/// A `Field` row
pub fn field<'a>(
    category: &'a str,
    name: &'a str,
    label: &'a str,
    required: bool,
    cardinality: Option<f64>,
    tag: &'a str,
) -> [Cell<'a>; 8] {
    [
        text_or_empty(category),
        Text("Field"),
        Text(name),
        Text(label),
        Empty,
        Bool(required),
        cardinality.map_or(Empty, Number),
        Text(tag),
    ]
}

fn text_or_empty(text: &str) -> Cell<'_> {
    if text.is_empty() { Empty } else { Text(text) }
}

/// The minimal article workbook: type at row 10, one field at row 12,
/// blank marker at row 13 and a stray field at row 14 outside the block
pub fn create_article_scenario_excel(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    write_rows(
        path,
        "Fields",
        &[
            (10, node("type: article", "Article", "", "")),
            (
                12,
                field("Content", "field_title", "Title", false, None, "Text (255)"),
            ),
            (13, [Empty, Empty, Text("end"), Empty, Empty, Empty, Empty, Empty]),
            (
                14,
                field("Content", "field_stray", "Stray", false, None, "Text (255)"),
            ),
        ],
    )?;
    Ok(())
}

/// A content model with three types:
///
/// - `article` (row 3): title, body, image, published date, attachments
/// - `page` (row 11): summary and related link, no explicit base type
/// - `event` (row 17): one field with an unmapped kind, one boolean
pub fn create_content_model_excel(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Fields")?;

    let header_format = Format::new().set_bold();
    for (col, header) in (0u16..).zip([
        "Category",
        "Kind",
        "Name",
        "Label",
        "Description",
        "Required",
        "Cardinality",
        "Type",
    ]) {
        sheet.write_with_format(0, col, header, &header_format)?;
    }

    let rows: Vec<Row<'_>> = vec![
        (3, node("type: article", "Article", "News article", "base")),
        (4, [Empty, Empty, Text("Fields"), Empty, Empty, Empty, Empty, Empty]),
        (5, field("Meta", "field_title", "Title", true, Some(1.0), "Text (255)")),
        (6, field("Content", "field_body", "Body", false, Some(1.0), "HTML")),
        (
            7,
            field("Content", "field_image", "Image", false, Some(-1.0), "ref@media/image"),
        ),
        (8, field("Meta", "field_published_date", "Published", true, None, "Date")),
        (
            9,
            field(
                "Downloadable files",
                "field_attachments",
                "Attachments",
                false,
                Some(-1.0),
                "ref@media/document",
            ),
        ),
        (11, node("type: page", "Page", "DONE", "")),
        (13, field("Content", "field_summary", "Summary", false, Some(1.0), "Text (long)")),
        (
            14,
            field("Content", "field_link", "Related link", false, Some(1.0), "Link: Title and URL"),
        ),
        (16, [Empty, Text("Note"), Text("Events below"), Empty, Empty, Empty, Empty, Empty]),
        (17, node("type: event", "Event", "", "base")),
        (19, field("Content", "field_location", "Location", false, Some(1.0), "Geolocation")),
        (20, field("Content", "field_featured", "Featured", false, Some(1.0), "Boolean")),
    ];
    for (row, cells) in &rows {
        write_row(sheet, *row, cells)?;
    }

    // Descriptions on a couple of field rows
    sheet.write(4, 4, "TODO")?;
    sheet.write(5, 4, "Main text")?;

    workbook.save(path)?;
    Ok(())
}

/// A workbook where several rows are malformed
pub fn create_malformed_excel(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    write_rows(
        path,
        "Fields",
        &[
            (1, node("type: article", "Article", "", "")),
            (2, field("Content", "", "No name", false, None, "Text (255)")),
            (3, field("Content", "field_tags", "Tags", false, None, "ref@taxonomy_term")),
            (
                4,
                [
                    Empty,
                    Text("Field"),
                    Text("field_count"),
                    Text("Count"),
                    Empty,
                    Empty,
                    Text("several"),
                    Text("Text (255)"),
                ],
            ),
            (5, field("Content", "field_ok", "Fine", false, None, "Boolean")),
            (7, node("type: article", "Article again", "", "")),
        ],
    )?;
    Ok(())
}
