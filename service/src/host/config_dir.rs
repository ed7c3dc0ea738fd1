//! Content host backed by a configuration export directory
//!
//! Every record lives in its own YAML file, named after the configuration
//! object it represents:
//!
//! | Record            | File                                                   |
//! |-------------------|--------------------------------------------------------|
//! | content type      | `<kind>.type.<id>.yml`                                 |
//! | field storage     | `field.storage.<kind>.<field>.yml`                     |
//! | field instance    | `field.field.<kind>.<bundle>.<field>.yml`              |
//! | form display      | `core.entity_form_display.<kind>.<bundle>.<mode>.yml`  |
//! | view display      | `core.entity_view_display.<kind>.<bundle>.<mode>.yml`  |
//! | form / view modes | `core.entity_{form,view}_mode.<kind>.<mode>.yml`       |
//!
//! Writes made inside a transaction are staged and only reach the disk on
//! commit. In dry-run mode commits are kept in memory instead, so later reads
//! still see them.

use super::ensure_uuid;
use content_model_core::error::{ContentModelError, Result};
use content_model_core::records::{
    ContentTypeRecord, DisplayKey, FieldInstanceRecord, FieldStorageRecord, FormDisplayRecord,
    ViewDisplayRecord,
};
use content_model_core::traits::ContentHost;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const EXTENSION: &str = ".yml";

/// Staged file changes; `None` deletes the file
type Changes = BTreeMap<String, Option<String>>;

/// Content host reading and writing a directory of YAML config files
#[derive(Debug)]
pub struct ConfigDirectoryHost {
    root: PathBuf,
    bundle_of: String,
    dry_run: bool,
    staged: Changes,
    overlay: Changes,
    transaction: Option<String>,
}

impl ConfigDirectoryHost {
    /// Open a config directory whose content types are bundles of `bundle_of`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>, bundle_of: impl Into<String>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ContentModelError::config(format!(
                "config directory {} does not exist",
                root.display()
            )));
        }
        Ok(Self {
            root,
            bundle_of: bundle_of.into(),
            dry_run: false,
            staged: Changes::new(),
            overlay: Changes::new(),
            transaction: None,
        })
    }

    /// Keep committed changes in memory instead of writing them
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Directory being managed
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files changed by dry-run commits, with `true` for writes and `false`
    /// for deletions
    pub fn pending_changes(&self) -> impl Iterator<Item = (&str, bool)> {
        self.overlay
            .iter()
            .map(|(name, contents)| (name.as_str(), contents.is_some()))
    }

    fn type_file(&self, id: &str) -> String {
        format!("{}.type.{id}{EXTENSION}", self.bundle_of)
    }

    fn display_file(kind: &str, key: &DisplayKey) -> String {
        format!("core.entity_{kind}_display.{key}{EXTENSION}")
    }

    fn read(&self, name: &str) -> Result<Option<String>> {
        if let Some(contents) = self.staged.get(name).or_else(|| self.overlay.get(name)) {
            return Ok(contents.clone());
        }
        let path = self.root.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.read(name)?
            .map(|contents| {
                serde_yaml::from_str(&contents).map_err(|e| {
                    ContentModelError::serialization(format!("Failed to parse {name}: {e}"))
                })
            })
            .transpose()
    }

    fn store<T: Serialize>(&mut self, name: String, record: &T) -> Result<()> {
        let contents = serde_yaml::to_string(record)?;
        self.change(name, Some(contents))
    }

    fn change(&mut self, name: String, contents: Option<String>) -> Result<()> {
        debug!(file = %name, delete = contents.is_none(), "Stage config change");
        if self.transaction.is_some() {
            self.staged.insert(name, contents);
            Ok(())
        } else {
            let mut changes = Changes::new();
            changes.insert(name, contents);
            self.apply(changes)
        }
    }

    fn apply(&mut self, changes: Changes) -> Result<()> {
        if self.dry_run {
            for name in changes.keys() {
                info!(file = %name, "Dry run: would change config file");
            }
            self.overlay.extend(changes);
            return Ok(());
        }

        for (name, contents) in changes {
            let path = self.root.join(&name);
            match contents {
                Some(contents) => fs::write(&path, contents)?,
                None if path.is_file() => fs::remove_file(&path)?,
                None => {}
            }
        }
        Ok(())
    }

    /// Names of every existing file starting with `prefix`, staged changes included
    fn names_with_prefix(&self, prefix: &str) -> Result<BTreeSet<String>> {
        let pattern = format!(
            "{}/{}*{EXTENSION}",
            glob::Pattern::escape(&self.root.to_string_lossy()),
            glob::Pattern::escape(prefix)
        );
        let entries = glob::glob(&pattern)
            .map_err(|e| ContentModelError::config(format!("Invalid glob pattern: {e}")))?;

        let mut names = BTreeSet::new();
        for entry in entries {
            let path = entry.map_err(|e| ContentModelError::io_error(e.to_string()))?;
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.insert(name.to_string());
            }
        }

        for (name, contents) in self.overlay.iter().chain(&self.staged) {
            if !name.starts_with(prefix) || !name.ends_with(EXTENSION) {
                continue;
            }
            if contents.is_some() {
                names.insert(name.clone());
            } else {
                names.remove(name);
            }
        }
        Ok(names)
    }

    /// Suffixes after `prefix` of every matching file, extension stripped
    fn ids_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .names_with_prefix(prefix)?
            .into_iter()
            .filter_map(|name| {
                name.strip_prefix(prefix)
                    .and_then(|rest| rest.strip_suffix(EXTENSION))
                    .map(ToString::to_string)
            })
            .collect())
    }

    fn modes(&self, kind: &str, entity_kind: &str) -> Result<Vec<String>> {
        let prefix = format!("core.entity_{kind}_mode.{entity_kind}.");
        Ok(self
            .ids_with_prefix(&prefix)?
            .into_iter()
            .filter(|mode| mode != "default")
            .collect())
    }
}

impl ContentHost for ConfigDirectoryHost {
    fn load_type(&self, id: &str) -> Result<Option<ContentTypeRecord>> {
        self.load(&self.type_file(id))
    }

    fn save_type(&mut self, mut record: ContentTypeRecord) -> Result<ContentTypeRecord> {
        ensure_uuid(&mut record.uuid);
        self.store(self.type_file(&record.id), &record)?;
        Ok(record)
    }

    fn delete_type(&mut self, id: &str) -> Result<bool> {
        if self.load_type(id)?.is_none() {
            return Ok(false);
        }

        let kind = self.bundle_of.clone();
        let mut doomed = vec![self.type_file(id)];
        for prefix in [
            format!("field.field.{kind}.{id}."),
            format!("core.entity_form_display.{kind}.{id}."),
            format!("core.entity_view_display.{kind}.{id}."),
        ] {
            doomed.extend(self.names_with_prefix(&prefix)?);
        }

        for name in doomed {
            self.change(name, None)?;
        }
        Ok(true)
    }

    fn list_types(&self) -> Result<Vec<String>> {
        self.ids_with_prefix(&format!("{}.type.", self.bundle_of))
    }

    fn load_field_storage(
        &self,
        entity_kind: &str,
        field_name: &str,
    ) -> Result<Option<FieldStorageRecord>> {
        self.load(&format!("field.storage.{entity_kind}.{field_name}{EXTENSION}"))
    }

    fn save_field_storage(&mut self, mut record: FieldStorageRecord) -> Result<FieldStorageRecord> {
        ensure_uuid(&mut record.uuid);
        self.store(format!("field.storage.{}{EXTENSION}", record.id()), &record)?;
        Ok(record)
    }

    fn load_field_instance(
        &self,
        entity_kind: &str,
        bundle: &str,
        field_name: &str,
    ) -> Result<Option<FieldInstanceRecord>> {
        self.load(&format!(
            "field.field.{entity_kind}.{bundle}.{field_name}{EXTENSION}"
        ))
    }

    fn save_field_instance(
        &mut self,
        mut record: FieldInstanceRecord,
    ) -> Result<FieldInstanceRecord> {
        ensure_uuid(&mut record.uuid);
        self.store(format!("field.field.{}{EXTENSION}", record.id()), &record)?;
        Ok(record)
    }

    fn list_field_instances(
        &self,
        entity_kind: &str,
        bundle: &str,
    ) -> Result<Vec<FieldInstanceRecord>> {
        let prefix = format!("field.field.{entity_kind}.{bundle}.");
        let mut instances = Vec::new();
        for name in self.names_with_prefix(&prefix)? {
            if let Some(instance) = self.load(&name)? {
                instances.push(instance);
            }
        }
        Ok(instances)
    }

    fn load_form_display(&self, key: &DisplayKey) -> Result<Option<FormDisplayRecord>> {
        self.load(&Self::display_file("form", key))
    }

    fn save_form_display(&mut self, mut record: FormDisplayRecord) -> Result<FormDisplayRecord> {
        ensure_uuid(&mut record.uuid);
        self.store(Self::display_file("form", &record.key), &record)?;
        Ok(record)
    }

    fn load_view_display(&self, key: &DisplayKey) -> Result<Option<ViewDisplayRecord>> {
        self.load(&Self::display_file("view", key))
    }

    fn save_view_display(&mut self, mut record: ViewDisplayRecord) -> Result<ViewDisplayRecord> {
        ensure_uuid(&mut record.uuid);
        self.store(Self::display_file("view", &record.key), &record)?;
        Ok(record)
    }

    fn form_modes(&self, entity_kind: &str) -> Result<Vec<String>> {
        self.modes("form", entity_kind)
    }

    fn view_modes(&self, entity_kind: &str) -> Result<Vec<String>> {
        self.modes("view", entity_kind)
    }

    fn begin_transaction(&mut self, scope: &str) -> Result<()> {
        if let Some(open) = &self.transaction {
            return Err(ContentModelError::host_api(
                format!("begin transaction {scope}"),
                format!("transaction '{open}' is still open"),
            ));
        }
        self.transaction = Some(scope.to_string());
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        let scope = self.transaction.take().ok_or_else(|| {
            ContentModelError::host_api("commit transaction", "no open transaction")
        })?;
        let changes = std::mem::take(&mut self.staged);
        info!(scope = %scope, files = changes.len(), "Committing config changes");
        self.apply(changes)
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let scope = self.transaction.take().ok_or_else(|| {
            ContentModelError::host_api("rollback transaction", "no open transaction")
        })?;
        info!(scope = %scope, files = self.staged.len(), "Discarding config changes");
        self.staged.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn article() -> ContentTypeRecord {
        ContentTypeRecord {
            id: "article".to_string(),
            uuid: None,
            label: "Article".to_string(),
            description: String::new(),
            properties: IndexMap::new(),
        }
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let err = ConfigDirectoryHost::open("/definitely/not/here", "node").unwrap_err();
        assert!(matches!(err, ContentModelError::ConfigError(_)));
    }

    #[test]
    fn test_staged_until_commit() {
        let dir = TempDir::new().unwrap();
        let mut host = ConfigDirectoryHost::open(dir.path(), "node").unwrap();

        host.begin_transaction("article").unwrap();
        host.save_type(article()).unwrap();
        assert!(!dir.path().join("node.type.article.yml").exists());
        assert!(host.load_type("article").unwrap().is_some());

        host.commit_transaction().unwrap();
        assert!(dir.path().join("node.type.article.yml").exists());
    }

    #[test]
    fn test_dry_run_never_writes() {
        let dir = TempDir::new().unwrap();
        let mut host = ConfigDirectoryHost::open(dir.path(), "node")
            .unwrap()
            .dry_run(true);

        host.begin_transaction("article").unwrap();
        host.save_type(article()).unwrap();
        host.commit_transaction().unwrap();

        assert!(!dir.path().join("node.type.article.yml").exists());
        assert_eq!(host.list_types().unwrap(), vec!["article".to_string()]);
        assert_eq!(host.pending_changes().count(), 1);
    }

    #[test]
    fn test_modes_exclude_default() {
        let dir = TempDir::new().unwrap();
        for mode in ["default", "full", "teaser"] {
            fs::write(
                dir.path().join(format!("core.entity_view_mode.node.{mode}.yml")),
                "id: x\n",
            )
            .unwrap();
        }
        let host = ConfigDirectoryHost::open(dir.path(), "node").unwrap();
        assert_eq!(
            host.view_modes("node").unwrap(),
            vec!["full".to_string(), "teaser".to_string()]
        );
        assert!(host.form_modes("node").unwrap().is_empty());
    }
}
