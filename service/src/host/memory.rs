//! In-memory content host

use super::ensure_uuid;
use content_model_core::error::{ContentModelError, Result};
use content_model_core::records::{
    ContentTypeRecord, DisplayKey, FieldInstanceRecord, FieldStorageRecord, FormDisplayRecord,
    ViewDisplayRecord,
};
use content_model_core::traits::ContentHost;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct HostState {
    types: IndexMap<String, ContentTypeRecord>,
    storages: IndexMap<String, FieldStorageRecord>,
    instances: IndexMap<String, FieldInstanceRecord>,
    form_displays: BTreeMap<DisplayKey, FormDisplayRecord>,
    view_displays: BTreeMap<DisplayKey, ViewDisplayRecord>,
}

/// Content host backed by in-process maps
///
/// `begin_transaction` snapshots the whole state and `rollback_transaction`
/// restores it, so a failed type leaves no trace.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    state: HostState,
    snapshot: Option<HostState>,
    form_modes: IndexMap<String, Vec<String>>,
    view_modes: IndexMap<String, Vec<String>>,
    rejected: Vec<String>,
    saves: usize,
}

impl InMemoryHost {
    /// Empty host with no modes registered
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the form modes of an entity kind
    #[must_use]
    pub fn with_form_modes(mut self, entity_kind: &str, modes: &[&str]) -> Self {
        self.form_modes.insert(
            entity_kind.to_string(),
            modes.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Register the view modes of an entity kind
    #[must_use]
    pub fn with_view_modes(mut self, entity_kind: &str, modes: &[&str]) -> Self {
        self.view_modes.insert(
            entity_kind.to_string(),
            modes.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Make every save whose record id contains `fragment` fail with a
    /// host API error
    pub fn reject_saves_matching(&mut self, fragment: impl Into<String>) {
        self.rejected.push(fragment.into());
    }

    /// Number of successful save calls so far
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Whether a transaction is open
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    /// All field storage records
    pub fn field_storages(&self) -> impl Iterator<Item = &FieldStorageRecord> {
        self.state.storages.values()
    }

    fn check_save(&mut self, operation: &str, id: &str) -> Result<()> {
        if self.rejected.iter().any(|fragment| id.contains(fragment.as_str())) {
            return Err(ContentModelError::host_api(
                format!("{operation} {id}"),
                "rejected by host",
            ));
        }
        self.saves += 1;
        debug!(operation, id, "Host save");
        Ok(())
    }
}

impl ContentHost for InMemoryHost {
    fn load_type(&self, id: &str) -> Result<Option<ContentTypeRecord>> {
        Ok(self.state.types.get(id).cloned())
    }

    fn save_type(&mut self, mut record: ContentTypeRecord) -> Result<ContentTypeRecord> {
        self.check_save("save type", &record.id)?;
        ensure_uuid(&mut record.uuid);
        self.state.types.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn delete_type(&mut self, id: &str) -> Result<bool> {
        if self.state.types.shift_remove(id).is_none() {
            return Ok(false);
        }
        self.state.instances.retain(|_, instance| instance.bundle != id);
        self.state.form_displays.retain(|key, _| key.bundle != id);
        self.state.view_displays.retain(|key, _| key.bundle != id);
        Ok(true)
    }

    fn list_types(&self) -> Result<Vec<String>> {
        Ok(self.state.types.keys().cloned().collect())
    }

    fn load_field_storage(
        &self,
        entity_kind: &str,
        field_name: &str,
    ) -> Result<Option<FieldStorageRecord>> {
        Ok(self
            .state
            .storages
            .get(&format!("{entity_kind}.{field_name}"))
            .cloned())
    }

    fn save_field_storage(&mut self, mut record: FieldStorageRecord) -> Result<FieldStorageRecord> {
        let id = record.id();
        self.check_save("save field storage", &id)?;
        ensure_uuid(&mut record.uuid);
        self.state.storages.insert(id, record.clone());
        Ok(record)
    }

    fn load_field_instance(
        &self,
        entity_kind: &str,
        bundle: &str,
        field_name: &str,
    ) -> Result<Option<FieldInstanceRecord>> {
        Ok(self
            .state
            .instances
            .get(&format!("{entity_kind}.{bundle}.{field_name}"))
            .cloned())
    }

    fn save_field_instance(
        &mut self,
        mut record: FieldInstanceRecord,
    ) -> Result<FieldInstanceRecord> {
        let id = record.id();
        self.check_save("save field instance", &id)?;
        ensure_uuid(&mut record.uuid);
        self.state.instances.insert(id, record.clone());
        Ok(record)
    }

    fn list_field_instances(
        &self,
        entity_kind: &str,
        bundle: &str,
    ) -> Result<Vec<FieldInstanceRecord>> {
        Ok(self
            .state
            .instances
            .values()
            .filter(|i| i.entity_kind == entity_kind && i.bundle == bundle)
            .cloned()
            .collect())
    }

    fn load_form_display(&self, key: &DisplayKey) -> Result<Option<FormDisplayRecord>> {
        Ok(self.state.form_displays.get(key).cloned())
    }

    fn save_form_display(&mut self, mut record: FormDisplayRecord) -> Result<FormDisplayRecord> {
        self.check_save("save form display", &record.key.to_string())?;
        ensure_uuid(&mut record.uuid);
        self.state
            .form_displays
            .insert(record.key.clone(), record.clone());
        Ok(record)
    }

    fn load_view_display(&self, key: &DisplayKey) -> Result<Option<ViewDisplayRecord>> {
        Ok(self.state.view_displays.get(key).cloned())
    }

    fn save_view_display(&mut self, mut record: ViewDisplayRecord) -> Result<ViewDisplayRecord> {
        self.check_save("save view display", &record.key.to_string())?;
        ensure_uuid(&mut record.uuid);
        self.state
            .view_displays
            .insert(record.key.clone(), record.clone());
        Ok(record)
    }

    fn form_modes(&self, entity_kind: &str) -> Result<Vec<String>> {
        Ok(self.form_modes.get(entity_kind).cloned().unwrap_or_default())
    }

    fn view_modes(&self, entity_kind: &str) -> Result<Vec<String>> {
        Ok(self.view_modes.get(entity_kind).cloned().unwrap_or_default())
    }

    fn begin_transaction(&mut self, scope: &str) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(ContentModelError::host_api(
                format!("begin transaction {scope}"),
                "a transaction is already open",
            ));
        }
        self.snapshot = Some(self.state.clone());
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| ContentModelError::host_api("commit transaction", "no open transaction"))
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let snapshot = self.snapshot.take().ok_or_else(|| {
            ContentModelError::host_api("rollback transaction", "no open transaction")
        })?;
        self.state = snapshot;
        Ok(())
    }
}
