//! Property-based tests for block scanning

use calamine::{Data, Range};
use content_model_core::config::WorkbookConfig;
use content_model_service::sheet::ModelExtractor;
use proptest::prelude::*;

/// One generated content type: its required flags, one per field
type Block = Vec<bool>;

/// Lay blocks out the way editors do: type row, header row, field rows,
/// then one blank row before the next type. Returns the sheet and the
/// 1-based type rows.
fn build_sheet(blocks: &[Block]) -> (Range<Data>, Vec<u32>) {
    let total: u32 = blocks.iter().map(|b| b.len() as u32 + 3).sum();
    let mut sheet = Range::new((0, 0), (total.max(1), 7));
    let mut type_rows = Vec::new();
    let mut row = 1u32;

    for (index, block) in blocks.iter().enumerate() {
        type_rows.push(row);
        set(&mut sheet, row, 1, "Node");
        set(&mut sheet, row, 2, &format!("type: type_{index}"));
        set(&mut sheet, row, 3, &format!("Type {index}"));
        row += 2;

        for (position, required) in block.iter().enumerate() {
            set(&mut sheet, row, 1, "Field");
            set(&mut sheet, row, 2, &format!("field_{index}_{position}"));
            set(&mut sheet, row, 3, &format!("Field {position}"));
            sheet.set_value((row - 1, 5), Data::Bool(*required));
            set(&mut sheet, row, 7, "Text (255)");
            row += 1;
        }
        row += 1;
    }
    (sheet, type_rows)
}

fn set(sheet: &mut Range<Data>, row: u32, col: u32, value: &str) {
    sheet.set_value((row - 1, col), Data::String(value.to_string()));
}

fn blocks_strategy() -> impl Strategy<Value = Vec<Block>> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), 0..6), 1..6)
}

proptest! {
    #[test]
    fn test_types_and_fields_keep_sheet_order(blocks in blocks_strategy()) {
        let (sheet, type_rows) = build_sheet(&blocks);
        let extractor = ModelExtractor::new(WorkbookConfig::default());
        let model = extractor.extract_model(&sheet).unwrap();

        prop_assert_eq!(model.types.len(), blocks.len());
        for (index, (name, schema)) in model.types.iter().enumerate() {
            prop_assert_eq!(name, &format!("type_{index}"));
            prop_assert_eq!(schema.definition.source_row, type_rows[index]);
            prop_assert_eq!(schema.fields.len(), blocks[index].len());
            for (position, field) in schema.fields.iter().enumerate() {
                prop_assert_eq!(&field.name, &format!("field_{index}_{position}"));
            }
        }
        prop_assert_eq!(
            model.field_count(),
            blocks.iter().map(Vec::len).sum::<usize>()
        );
    }

    #[test]
    fn test_weights_follow_required_flag(blocks in blocks_strategy()) {
        let (sheet, _) = build_sheet(&blocks);
        let extractor = ModelExtractor::new(WorkbookConfig::default());
        let model = extractor.extract_model(&sheet).unwrap();

        for schema in model.types.values() {
            let type_row = schema.definition.source_row;
            for field in &schema.fields {
                let expected = if field.required {
                    i64::from(field.source_row) - i64::from(type_row + 1)
                } else {
                    i64::from(field.source_row)
                };
                prop_assert_eq!(field.weight, expected);
                if field.required {
                    prop_assert!(field.weight >= 1);
                }
            }
        }
    }

    #[test]
    fn test_row_limit_hides_later_types(blocks in blocks_strategy(), limit in 1u32..40) {
        let (sheet, type_rows) = build_sheet(&blocks);
        let config = WorkbookConfig {
            row_limit: limit,
            ..WorkbookConfig::default()
        };
        let model = ModelExtractor::new(config).extract_model(&sheet).unwrap();

        let visible = type_rows.iter().filter(|row| **row <= limit).count();
        prop_assert_eq!(model.types.len(), visible);
    }
}
