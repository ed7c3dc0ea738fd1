//! Tests for configuration loading

use content_model_core::config::{ContentModelConfig, FieldPlacementOverride};
use content_model_core::error::ContentModelError;
use content_model_core::types::FieldGroup;
use content_model_service::config::{load_config, load_content_model_config};
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_explicit_file_overrides_defaults() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("cmm.yaml");
    fs::write(
        &path,
        r"
workbook:
  path: models/site.xlsx
  sheet_name: Model
  row_limit: 200
  category_groups:
    Sidebar: meta
provisioner:
  required_weight: -10
  placements:
    - context: full
      section: 0
      region: first
",
    )
    .expect("write config");

    let config = load_content_model_config(Some(&path)).expect("should load config");

    assert_eq!(config.workbook.sheet_name, "Model");
    assert_eq!(config.workbook.row_limit, 200);
    assert_eq!(
        config.workbook.path.as_deref(),
        Some(std::path::Path::new("models/site.xlsx"))
    );
    assert_eq!(config.workbook.group_for_category("Sidebar"), FieldGroup::Meta);
    // Replaced, not merged
    assert_eq!(config.workbook.group_for_category("Meta"), FieldGroup::Content);
    // Untouched sections keep their defaults
    assert_eq!(config.workbook.type_marker, "Node");
    assert_eq!(config.provisioner.entity_kind, "node");
    assert_eq!(config.provisioner.required_weight, -10);
    assert_eq!(config.provisioner.placements.len(), 1);
    assert_eq!(config.provisioner.placements[0].region, "first");
}

#[test]
fn test_environment_substitution() {
    unsafe {
        env::set_var("CMM_TEST_SHEET_NAME", "Content types");
    }

    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("cmm.yaml");
    fs::write(
        &path,
        "workbook:\n  sheet_name: ${CMM_TEST_SHEET_NAME}\n  default_base_type: ${CMM_TEST_UNSET_BASE:-page}\n",
    )
    .expect("write config");

    let config: ContentModelConfig = load_config(&path).expect("should load config");
    assert_eq!(config.workbook.sheet_name, "Content types");
    assert_eq!(config.workbook.default_base_type, "page");

    unsafe {
        env::remove_var("CMM_TEST_SHEET_NAME");
    }
}

#[test]
fn test_override_plans() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("cmm.yaml");
    fs::write(
        &path,
        r"
provisioner:
  overrides:
    field_hero:
      skip_form_group: true
      placements:
        - context: teaser
          region: media
",
    )
    .expect("write config");

    let config = load_content_model_config(Some(&path)).expect("should load config");
    let hero: &FieldPlacementOverride = &config.provisioner.overrides["field_hero"];
    assert!(hero.skip_form_group);
    assert_eq!(hero.placements[0].section, 0);
    assert_eq!(hero.placements[0].region, "media");
    assert!(!config.provisioner.uses_form_group("field_hero"));
    assert!(
        !config
            .provisioner
            .overrides
            .contains_key("field_published_date")
    );
}

#[test]
fn test_invalid_values_rejected() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("cmm.yaml");
    fs::write(&path, "workbook:\n  row_limit: 0\n").expect("write config");

    let err = load_content_model_config(Some(&path)).unwrap_err();
    assert!(matches!(err, ContentModelError::ConfigError(_)));
    assert!(err.to_string().contains("row_limit"));
}

#[test]
fn test_malformed_yaml_rejected() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("cmm.yaml");
    fs::write(&path, "workbook: [unclosed").expect("write config");

    let err = load_config::<ContentModelConfig>(&path).unwrap_err();
    assert!(matches!(err, ContentModelError::ConfigError(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().expect("temp dir");
    let err = load_content_model_config(Some(&temp_dir.path().join("absent.yaml"))).unwrap_err();
    assert!(matches!(err, ContentModelError::IoError(_)));
}
