//! Core trait definitions for content hosts

use crate::error::Result;
use crate::records::{
    ContentTypeRecord, DisplayKey, FieldInstanceRecord, FieldStorageRecord, FormDisplayRecord,
    ViewDisplayRecord,
};

/// The content-model API of a CMS host
///
/// Every call is a blocking request/response. Mutations take `&mut self`:
/// the upsert protocol addresses entities by name, so a host must be driven
/// by a single actor, one operation at a time.
///
/// Saving a record whose `uuid` is `None` creates it and assigns a uuid;
/// saving a record that carries a uuid updates it in place. Both return the
/// record as stored.
pub trait ContentHost {
    /// Load a content type by machine name
    fn load_type(&self, id: &str) -> Result<Option<ContentTypeRecord>>;

    /// Create or update a content type
    fn save_type(&mut self, record: ContentTypeRecord) -> Result<ContentTypeRecord>;

    /// Delete a content type and everything attached to its bundle.
    /// Returns `false` if the type did not exist.
    fn delete_type(&mut self, id: &str) -> Result<bool>;

    /// Machine names of every content type
    fn list_types(&self) -> Result<Vec<String>>;

    /// Load field storage
    fn load_field_storage(
        &self,
        entity_kind: &str,
        field_name: &str,
    ) -> Result<Option<FieldStorageRecord>>;

    /// Create or update field storage
    fn save_field_storage(&mut self, record: FieldStorageRecord) -> Result<FieldStorageRecord>;

    /// Load a field instance
    fn load_field_instance(
        &self,
        entity_kind: &str,
        bundle: &str,
        field_name: &str,
    ) -> Result<Option<FieldInstanceRecord>>;

    /// Create or update a field instance
    fn save_field_instance(&mut self, record: FieldInstanceRecord)
    -> Result<FieldInstanceRecord>;

    /// Every field instance attached to a bundle
    fn list_field_instances(
        &self,
        entity_kind: &str,
        bundle: &str,
    ) -> Result<Vec<FieldInstanceRecord>>;

    /// Load a form display
    fn load_form_display(&self, key: &DisplayKey) -> Result<Option<FormDisplayRecord>>;

    /// Create or update a form display
    fn save_form_display(&mut self, record: FormDisplayRecord) -> Result<FormDisplayRecord>;

    /// Load a view display
    fn load_view_display(&self, key: &DisplayKey) -> Result<Option<ViewDisplayRecord>>;

    /// Create or update a view display
    fn save_view_display(&mut self, record: ViewDisplayRecord) -> Result<ViewDisplayRecord>;

    /// Form modes registered for an entity kind, not including `default`
    fn form_modes(&self, entity_kind: &str) -> Result<Vec<String>>;

    /// View modes registered for an entity kind, not including `default`
    fn view_modes(&self, entity_kind: &str) -> Result<Vec<String>>;

    /// Open a logical transaction. Nested transactions are not supported.
    fn begin_transaction(&mut self, scope: &str) -> Result<()>;

    /// Make every change since `begin_transaction` durable
    fn commit_transaction(&mut self) -> Result<()>;

    /// Discard every change since `begin_transaction`
    fn rollback_transaction(&mut self) -> Result<()>;
}
