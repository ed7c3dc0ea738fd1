//! Idempotent provisioning of content types and fields

use super::placement::{
    block_configuration, place_in_form, place_in_view, rebind_view_display,
};
use super::report::{
    ApplyReport, FieldHandle, PlacementOutcome, SkippedField, TypeDeletion, TypeHandle,
    TypeOutcome,
};
use crate::kinds::{FieldKindMapping, FieldKindRegistry};
use content_model_core::config::{ProvisionerConfig, ViewPlacement};
use content_model_core::error::{ContentModelError, Result};
use content_model_core::records::{
    ContentTypeRecord, DisplayKey, FieldInstanceRecord, FieldStorageRecord,
};
use content_model_core::traits::ContentHost;
use content_model_core::types::{
    ContentModel, ContentTypeDefinition, ContentTypeSchema, FieldDefinition, FormatterConfig,
};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What to provision for each selected type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// The type and its cloned template fields and displays
    TypeOnly,
    /// The type, then every field declared for it
    TypeWithFields,
    /// Only the declared fields; the type must already exist on the host
    FieldsOnly,
}

impl ApplyMode {
    fn touches_type(self) -> bool {
        matches!(self, Self::TypeOnly | Self::TypeWithFields)
    }

    fn touches_fields(self) -> bool {
        matches!(self, Self::TypeWithFields | Self::FieldsOnly)
    }
}

/// Everything resolved for a field before the first host write
struct ResolvedField {
    mapping: FieldKindMapping,
    storage_settings: Value,
    instance_settings: Value,
    placements: Vec<(ViewPlacement, FormatterConfig)>,
}

/// Applies content model definitions to a content host
///
/// Every upsert loads the target by name first. An existing object is
/// updated in place and keeps its uuid; a missing one is created. Running the
/// same definitions twice leaves the host as one run would.
pub struct Provisioner<'h, H: ContentHost> {
    host: &'h mut H,
    config: ProvisionerConfig,
    kinds: FieldKindRegistry,
}

impl<'h, H: ContentHost> Provisioner<'h, H> {
    /// Create a provisioner driving `host`
    pub fn new(host: &'h mut H, config: ProvisionerConfig, kinds: FieldKindRegistry) -> Self {
        Self {
            host,
            config,
            kinds,
        }
    }

    /// The host being driven
    pub fn host(&self) -> &H {
        &*self.host
    }

    /// Settings in use
    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    /// Create or update a content type by cloning its template. Template
    /// field instances and displays are cloned onto the type; anything the
    /// type already has keeps its uuid.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` if the base type is missing, or `HostApi`
    /// if the host rejects a write.
    pub fn upsert_type(&mut self, definition: &ContentTypeDefinition) -> Result<TypeHandle> {
        let template = self.host.load_type(&definition.base_type)?.ok_or_else(|| {
            ContentModelError::TemplateNotFound {
                name: definition.base_type.clone(),
            }
        })?;
        let existing = self.host.load_type(&definition.name)?;
        let created = existing.is_none();

        let saved = self.host.save_type(ContentTypeRecord {
            id: definition.name.clone(),
            uuid: existing.and_then(|record| record.uuid),
            label: definition.label.clone(),
            description: definition.description.clone(),
            properties: template.properties,
        })?;
        let uuid = saved_uuid(saved.uuid, || format!("save type {}", definition.name))?;

        if definition.name != definition.base_type {
            self.clone_template_fields(&definition.base_type, &definition.name)?;
            self.clone_template_displays(&definition.base_type, &definition.name)?;
        }

        info!(
            content_type = %definition.name,
            template = %definition.base_type,
            created,
            "Upserted content type"
        );
        Ok(TypeHandle {
            id: definition.name.clone(),
            uuid,
            created,
        })
    }

    /// Create or update a field on `bundle`: storage, instance, form widget
    /// and view placements, in that order.
    ///
    /// # Errors
    ///
    /// Field-local errors (`UnknownFieldKind`, `UnknownContext`, `ParseError`)
    /// are returned before anything is written. `HostApi` is returned if the
    /// host rejects a write or lacks a display the field is placed on.
    pub fn upsert_field(&mut self, bundle: &str, field: &FieldDefinition) -> Result<FieldHandle> {
        let resolved = self.resolve_field(field)?;
        let kind = self.config.entity_kind.clone();

        let storage = self.upsert_storage(field, &resolved)?;
        let storage_uuid = saved_uuid(storage.uuid, || format!("save field storage {}", storage.id()))?;

        let existing = self.host.load_field_instance(&kind, bundle, &field.name)?;
        let created = existing.is_none();
        let instance = match existing {
            Some(mut instance) => {
                instance.field_type.clone_from(&storage.field_type);
                instance.label.clone_from(&field.label);
                instance.description.clone_from(&field.description);
                instance.required = field.required;
                instance.settings = resolved.instance_settings.clone();
                instance
            }
            None => {
                debug!(field = %field.name, bundle, "Creating field instance");
                FieldInstanceRecord {
                    entity_kind: kind.clone(),
                    bundle: bundle.to_string(),
                    field_name: field.name.clone(),
                    uuid: None,
                    field_type: storage.field_type.clone(),
                    label: field.label.clone(),
                    description: field.description.clone(),
                    required: field.required,
                    settings: resolved.instance_settings.clone(),
                }
            }
        };
        let instance = self.host.save_field_instance(instance)?;
        let instance_uuid = saved_uuid(instance.uuid, || format!("save field instance {}", instance.id()))?;

        self.place_on_form(bundle, field, &resolved.mapping)?;

        let mut placements = Vec::with_capacity(resolved.placements.len());
        for (placement, formatter) in resolved.placements {
            placements.push(self.place_on_view(bundle, field, &placement, formatter)?);
        }

        info!(
            field = %field.name,
            bundle,
            kind = %resolved.mapping.tag,
            created,
            placements = placements.len(),
            "Upserted field"
        );
        Ok(FieldHandle {
            entity_kind: kind,
            bundle: bundle.to_string(),
            field_name: field.name.clone(),
            storage_type: storage.field_type,
            storage_uuid,
            instance_uuid,
            created,
            placements,
        })
    }

    /// Upsert a type and every field declared for it, in one transaction.
    /// A field-local error skips that field; any other error rolls the type
    /// back.
    ///
    /// # Errors
    ///
    /// Returns the first non field-local error after rolling back.
    pub fn apply_type(&mut self, schema: &ContentTypeSchema) -> Result<TypeOutcome> {
        self.apply(schema, ApplyMode::TypeWithFields)
    }

    /// Upsert the declared fields of a type that already exists on the host,
    /// in one transaction
    ///
    /// # Errors
    ///
    /// Returns `HostApi` if the type is missing or a write is rejected.
    pub fn apply_fields(&mut self, schema: &ContentTypeSchema) -> Result<TypeOutcome> {
        self.apply(schema, ApplyMode::FieldsOnly)
    }

    /// Run one [`ApplyMode`] for a type inside its own transaction
    ///
    /// # Errors
    ///
    /// Returns the first non field-local error after rolling back.
    pub fn apply(&mut self, schema: &ContentTypeSchema, mode: ApplyMode) -> Result<TypeOutcome> {
        let name = schema.definition.name.as_str();
        self.host.begin_transaction(name)?;

        match self.apply_type_inner(schema, mode) {
            Ok(outcome) => {
                self.host.commit_transaction()?;
                Ok(outcome)
            }
            Err(e) => {
                warn!(content_type = name, error = %e, "Rolling back content type");
                if let Err(rollback) = self.host.rollback_transaction() {
                    warn!(content_type = name, error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Provision the named types of a model, in the order given
    ///
    /// # Errors
    ///
    /// Returns `UnknownContentType` for a name the model lacks, and aborts on
    /// the first type that fails. Types already applied stay committed.
    pub fn apply_model(
        &mut self,
        model: &ContentModel,
        names: &[String],
        mode: ApplyMode,
    ) -> Result<ApplyReport> {
        let schemas = names
            .iter()
            .map(|name| model.get(name))
            .collect::<Result<Vec<_>>>()?;

        let mut report = ApplyReport::default();
        for schema in schemas {
            report.types.push(self.apply(schema, mode)?);
        }
        Ok(report)
    }

    /// Delete a type and everything attached to its bundle, in one
    /// transaction. Returns `false` if the type was not on the host.
    ///
    /// # Errors
    ///
    /// Returns `HostApi` if the host rejects the deletion.
    pub fn delete_type(&mut self, name: &str) -> Result<bool> {
        self.host.begin_transaction(name)?;
        match self.host.delete_type(name) {
            Ok(deleted) => {
                self.host.commit_transaction()?;
                if deleted {
                    info!(content_type = name, "Deleted content type");
                } else {
                    warn!(content_type = name, "Content type does not exist on the host");
                }
                Ok(deleted)
            }
            Err(e) => {
                if let Err(rollback) = self.host.rollback_transaction() {
                    warn!(content_type = name, error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Delete content types in the order given
    ///
    /// # Errors
    ///
    /// Stops at the first deletion the host rejects.
    pub fn delete_types(&mut self, names: &[String]) -> Result<Vec<TypeDeletion>> {
        names
            .iter()
            .map(|name| {
                self.delete_type(name).map(|deleted| TypeDeletion {
                    name: name.clone(),
                    deleted,
                })
            })
            .collect()
    }

    fn apply_type_inner(&mut self, schema: &ContentTypeSchema, mode: ApplyMode) -> Result<TypeOutcome> {
        let definition = &schema.definition;
        let mut outcome = TypeOutcome::new(&definition.name);

        if mode.touches_type() {
            outcome.handle = Some(self.upsert_type(definition)?);
        } else if self.host.load_type(&definition.name)?.is_none() {
            return Err(ContentModelError::host_api(
                format!("create fields for {}", definition.name),
                "content type does not exist on the host",
            ));
        }

        if mode.touches_fields() {
            for field in &schema.fields {
                match self.upsert_field(&definition.name, field) {
                    Ok(handle) => outcome.fields.push(handle),
                    Err(e) if e.is_field_local() => {
                        warn!(
                            content_type = %definition.name,
                            field = %field.name,
                            row = field.source_row,
                            error = %e,
                            "Skipping field"
                        );
                        outcome.skipped.push(SkippedField {
                            field: field.name.clone(),
                            row: field.source_row,
                            reason: e.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(outcome)
    }

    fn resolve_field(&self, field: &FieldDefinition) -> Result<ResolvedField> {
        let mapping = self.kinds.resolve(field)?.clone();
        let storage_settings = mapping.storage_settings(field, &self.config)?;
        let instance_settings = mapping.instance_settings(field)?;
        let placements = self
            .config
            .placements_for(&field.name)
            .iter()
            .map(|placement| {
                mapping
                    .resolve_config(&placement.context)
                    .map(|formatter| (placement.clone(), formatter))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedField {
            mapping,
            storage_settings,
            instance_settings,
            placements,
        })
    }

    fn upsert_storage(
        &mut self,
        field: &FieldDefinition,
        resolved: &ResolvedField,
    ) -> Result<FieldStorageRecord> {
        let kind = &self.config.entity_kind;
        let record = match self.host.load_field_storage(kind, &field.name)? {
            Some(mut storage) => {
                if storage.field_type != resolved.mapping.storage_type {
                    warn!(
                        field = %field.name,
                        existing = %storage.field_type,
                        wanted = %resolved.mapping.storage_type,
                        "Field storage type cannot change; keeping existing type"
                    );
                }
                storage.cardinality = field.cardinality;
                storage.settings = resolved.storage_settings.clone();
                storage
            }
            None => {
                debug!(field = %field.name, "Creating field storage");
                FieldStorageRecord {
                    entity_kind: kind.clone(),
                    field_name: field.name.clone(),
                    uuid: None,
                    field_type: resolved.mapping.storage_type.clone(),
                    cardinality: field.cardinality,
                    settings: resolved.storage_settings.clone(),
                }
            }
        };
        self.host.save_field_storage(record)
    }

    fn place_on_form(
        &mut self,
        bundle: &str,
        field: &FieldDefinition,
        mapping: &FieldKindMapping,
    ) -> Result<()> {
        let key = DisplayKey::new(&self.config.entity_kind, bundle, &self.config.form_mode);
        let mut display = self.host.load_form_display(&key)?.ok_or_else(|| {
            ContentModelError::host_api(
                format!("place {} on form display {key}", field.name),
                "form display does not exist",
            )
        })?;

        let group = self
            .config
            .uses_form_group(&field.name)
            .then_some(field.group);
        place_in_form(
            &mut display,
            &field.name,
            mapping.widget.clone(),
            field.weight,
            group,
        );
        self.host.save_form_display(display)?;
        Ok(())
    }

    fn place_on_view(
        &mut self,
        bundle: &str,
        field: &FieldDefinition,
        placement: &ViewPlacement,
        formatter: FormatterConfig,
    ) -> Result<PlacementOutcome> {
        let key = DisplayKey::new(&self.config.entity_kind, bundle, &placement.context);
        let mut display = self.host.load_view_display(&key)?.ok_or_else(|| {
            ContentModelError::host_api(
                format!("place {} on view display {key}", field.name),
                "view display does not exist",
            )
        })?;

        let weight = if field.required {
            self.config.required_weight
        } else {
            field.weight
        };
        let configuration = block_configuration(&key, field, formatter);
        let created = place_in_view(&mut display, placement, configuration, weight)?;
        self.host.save_view_display(display)?;

        Ok(PlacementOutcome {
            context: placement.context.clone(),
            section: placement.section,
            region: placement.region.clone(),
            weight,
            created,
        })
    }

    fn clone_template_fields(&mut self, template: &str, bundle: &str) -> Result<()> {
        let kind = self.config.entity_kind.clone();
        for source in self.host.list_field_instances(&kind, template)? {
            let existing = self.host.load_field_instance(&kind, bundle, &source.field_name)?;
            let uuid = existing.and_then(|instance| instance.uuid);
            debug!(field = %source.field_name, bundle, "Cloning template field");
            self.host.save_field_instance(FieldInstanceRecord {
                bundle: bundle.to_string(),
                uuid,
                ..source
            })?;
        }
        Ok(())
    }

    fn clone_template_displays(&mut self, template: &str, bundle: &str) -> Result<()> {
        let kind = self.config.entity_kind.clone();

        for mode in with_default(self.host.form_modes(&kind)?) {
            let source_key = DisplayKey::new(&kind, template, &mode);
            let Some(mut display) = self.host.load_form_display(&source_key)? else {
                continue;
            };
            let key = source_key.with_bundle(bundle);
            display.uuid = self.host.load_form_display(&key)?.and_then(|d| d.uuid);
            display.key = key;
            self.host.save_form_display(display)?;
        }

        for mode in with_default(self.host.view_modes(&kind)?) {
            let source_key = DisplayKey::new(&kind, template, &mode);
            let Some(mut display) = self.host.load_view_display(&source_key)? else {
                continue;
            };
            let key = source_key.with_bundle(bundle);
            display.uuid = self.host.load_view_display(&key)?.and_then(|d| d.uuid);
            display.key = key;
            rebind_view_display(&mut display, template);
            self.host.save_view_display(display)?;
        }
        Ok(())
    }
}

fn with_default(mut modes: Vec<String>) -> Vec<String> {
    if !modes.iter().any(|mode| mode == "default") {
        modes.push("default".to_string());
    }
    modes
}

fn saved_uuid(uuid: Option<Uuid>, operation: impl FnOnce() -> String) -> Result<Uuid> {
    uuid.ok_or_else(|| ContentModelError::host_api(operation(), "host returned no uuid"))
}
