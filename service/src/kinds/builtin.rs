//! Built-in field kinds

use super::{FieldKindMapping, FieldKindRegistry, FormatterSet, REFERENCE_KIND, SettingsProfile};
use content_model_core::types::{FormatterConfig, LabelPosition, WidgetConfig};
use once_cell::sync::Lazy;
use serde_json::{Value, json};

/// Every kind the sheet may name in column H
pub static BUILTIN_KINDS: Lazy<FieldKindRegistry> = Lazy::new(|| {
    let mut registry = FieldKindRegistry::new();
    for mapping in [
        boolean(),
        date(),
        entity_reference(),
        html(),
        link(),
        text(),
        text_list(),
        text_long(),
    ] {
        registry.register(mapping);
    }
    registry
});

fn formatter(label: LabelPosition, formatter: &str, settings: Value) -> FormatterConfig {
    FormatterConfig {
        label,
        formatter: formatter.to_string(),
        settings,
    }
}

fn widget(widget: &str, settings: Value) -> WidgetConfig {
    WidgetConfig {
        widget: widget.to_string(),
        settings,
    }
}

/// Same formatter in every context, label shown only on `full`
fn uniform(full_label: LabelPosition, name: &str, settings: &Value) -> FormatterSet {
    FormatterSet {
        default: formatter(full_label, name, settings.clone()),
        secondary: formatter(LabelPosition::Hidden, name, settings.clone()),
        index: formatter(LabelPosition::Hidden, name, settings.clone()),
    }
}

fn mapping(
    tag: &str,
    storage_type: &str,
    widget: WidgetConfig,
    formatters: FormatterSet,
    settings: SettingsProfile,
) -> FieldKindMapping {
    FieldKindMapping {
        tag: tag.to_string(),
        storage_type: storage_type.to_string(),
        widget,
        formatters,
        settings,
    }
}

fn boolean() -> FieldKindMapping {
    mapping(
        "Boolean",
        "boolean",
        widget("boolean_checkbox", json!({})),
        uniform(LabelPosition::Inline, "boolean", &json!({})),
        SettingsProfile::Plain,
    )
}

fn date() -> FieldKindMapping {
    let settings = json!({ "timezone_override": "", "format_type": "h_day_month_year" });
    mapping(
        "Date",
        "datetime",
        widget("datetime_default", json!({})),
        uniform(LabelPosition::Inline, "datetime_default", &settings),
        SettingsProfile::Date,
    )
}

fn entity_reference() -> FieldKindMapping {
    let linked = json!({ "link": true });
    mapping(
        REFERENCE_KIND,
        "entity_reference",
        widget("entity_reference_autocomplete", json!({})),
        FormatterSet {
            default: formatter(LabelPosition::Inline, "entity_reference_label", linked.clone()),
            secondary: formatter(LabelPosition::Hidden, "entity_reference_label", linked),
            index: formatter(
                LabelPosition::Hidden,
                "entity_reference_label",
                json!({ "link": false }),
            ),
        },
        SettingsProfile::Reference,
    )
}

fn html() -> FieldKindMapping {
    mapping(
        "HTML",
        "text_long",
        widget("string_textarea", json!({})),
        FormatterSet {
            default: formatter(LabelPosition::Above, "text_default", json!({})),
            secondary: formatter(LabelPosition::Inline, "text_default", json!({})),
            index: formatter(LabelPosition::Hidden, "text_default", json!({})),
        },
        SettingsProfile::Plain,
    )
}

fn link() -> FieldKindMapping {
    let settings = json!({
        "trim_length": null,
        "url_only": false,
        "url_plain": false,
        "rel": 0,
        "target": 0,
    });
    mapping(
        "Link: Title and URL",
        "link",
        widget(
            "link_default",
            json!({ "placeholder_url": "", "placeholder_title": "" }),
        ),
        FormatterSet {
            default: formatter(LabelPosition::Inline, "link", settings.clone()),
            secondary: formatter(LabelPosition::Hidden, "link", settings.clone()),
            index: formatter(LabelPosition::Hidden, "link_separate", settings),
        },
        SettingsProfile::Plain,
    )
}

fn text() -> FieldKindMapping {
    mapping(
        "Text (255)",
        "string",
        widget("string_textfield", json!({})),
        uniform(LabelPosition::Inline, "string", &json!({ "link_to_entity": false })),
        SettingsProfile::Plain,
    )
}

fn text_list() -> FieldKindMapping {
    mapping(
        "List (text)",
        "list_string",
        widget("options_select", json!({})),
        uniform(LabelPosition::Inline, "list_default", &json!({})),
        SettingsProfile::AllowedValues,
    )
}

fn text_long() -> FieldKindMapping {
    let settings = json!({ "link_to_entity": false });
    mapping(
        "Text (long)",
        "string_long",
        widget("string_textarea", json!({})),
        FormatterSet {
            default: formatter(LabelPosition::Above, "basic_string", settings.clone()),
            secondary: formatter(LabelPosition::Hidden, "basic_string", settings),
            index: formatter(LabelPosition::Hidden, "basic_string", json!({})),
        },
        SettingsProfile::Plain,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tags() {
        let tags: Vec<&str> = BUILTIN_KINDS.tags().collect();
        assert_eq!(
            tags,
            vec![
                "Boolean",
                "Date",
                "Entity reference",
                "HTML",
                "Link: Title and URL",
                "Text (255)",
                "List (text)",
                "Text (long)",
            ]
        );
    }

    #[test]
    fn test_storage_types() {
        let storage = |tag: &str| {
            BUILTIN_KINDS
                .kinds
                .get(tag)
                .map(|m| m.storage_type.clone())
                .unwrap()
        };
        assert_eq!(storage("Text (255)"), "string");
        assert_eq!(storage("Text (long)"), "string_long");
        assert_eq!(storage("HTML"), "text_long");
        assert_eq!(storage("Date"), "datetime");
    }

    #[test]
    fn test_link_index_formatter() {
        let link = link();
        assert_eq!(link.resolve_config("search_index").unwrap().formatter, "link_separate");
        assert_eq!(link.resolve_config("full").unwrap().formatter, "link");
        assert_eq!(link.widget.settings["placeholder_url"], "");
    }

    #[test]
    fn test_html_secondary_label_is_inline() {
        let html = html();
        assert_eq!(
            html.resolve_config("summary").unwrap().label,
            LabelPosition::Inline
        );
    }
}
