//! Persistence abstraction for custom fields.
//!
//! [`CustomFieldStore`] is the trait the controller talks to; it abstracts
//! over the actual database backend. [`InMemoryStore`] is the thread-safe
//! in-memory implementation used by tests and development.
//!
//! Model validation is enforced on save: [`CustomFieldStore::save_field`]
//! rejects invalid records with the collected [`ValidationError`], and
//! [`CustomFieldStore::destroy_field`] refuses to delete a field that is
//! still referenced by recorded custom values.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use worktrack_core::error::{ValidationError, WorktrackError, WorktrackResult};

use crate::model::{CustomField, CustomOption, CustomValue, WorkPackageType};

/// Storage operations needed by the custom-fields controller.
#[async_trait]
pub trait CustomFieldStore: Send + Sync {
    /// Returns all custom fields, ordered by id.
    async fn all_fields(&self) -> Vec<CustomField>;

    /// Fetches a single field by id.
    async fn find_field(&self, id: u64) -> Option<CustomField>;

    /// Validates and persists a field together with its options.
    ///
    /// Unsaved records (id `0`) are assigned ids, as are any unsaved options
    /// they carry. On success the passed record reflects the persisted state.
    async fn save_field(&self, field: &mut CustomField) -> Result<(), ValidationError>;

    /// Hard-deletes a field.
    ///
    /// Fails with [`WorktrackError::Integrity`] when recorded custom values
    /// still reference the field.
    async fn destroy_field(&self, id: u64) -> WorktrackResult<()>;

    /// Fetches a single option by id, regardless of which field owns it.
    async fn find_option(&self, id: u64) -> Option<CustomOption>;

    /// Returns `true` if a persisted option with this id exists anywhere.
    async fn option_exists(&self, id: u64) -> bool;

    /// Persists changes to an already-saved option in place.
    async fn save_option(&self, option: &CustomOption) -> WorktrackResult<()>;

    /// Hard-deletes a single option.
    async fn destroy_option(&self, id: u64) -> WorktrackResult<()>;

    /// Deletes every custom value recorded for the field with the given raw
    /// value, returning how many were removed.
    async fn delete_custom_values(&self, custom_field_id: u64, value: &str) -> usize;

    /// Records a custom value, returning its assigned id.
    async fn create_custom_value(&self, value: CustomValue) -> u64;

    /// Resolves work-package types by id, in the order given.
    async fn work_package_types(&self, ids: &[u64]) -> Vec<WorkPackageType>;
}

#[derive(Debug, Default)]
struct StoreInner {
    fields: HashMap<u64, CustomField>,
    custom_values: Vec<CustomValue>,
    work_package_types: HashMap<u64, WorkPackageType>,
    next_field_id: u64,
    next_option_id: u64,
    next_value_id: u64,
    next_type_id: u64,
}

/// In-memory implementation of [`CustomFieldStore`].
///
/// Options are stored embedded in their owning field's record. Thread-safe
/// via `Arc<RwLock<…>>`, so clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a work-package type and returns it with its assigned id.
    pub fn insert_work_package_type(&self, name: impl Into<String>) -> WorkPackageType {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.next_type_id += 1;
        let wp_type = WorkPackageType {
            id: inner.next_type_id,
            name: name.into(),
        };
        inner
            .work_package_types
            .insert(wp_type.id, wp_type.clone());
        wp_type
    }

    /// Returns the number of persisted fields.
    pub fn field_count(&self) -> usize {
        self.inner.read().expect("store lock poisoned").fields.len()
    }

    /// Returns the number of recorded custom values.
    pub fn custom_value_count(&self) -> usize {
        self.inner
            .read()
            .expect("store lock poisoned")
            .custom_values
            .len()
    }
}

#[async_trait]
impl CustomFieldStore for InMemoryStore {
    async fn all_fields(&self) -> Vec<CustomField> {
        let inner = self.inner.read().expect("store lock poisoned");
        let mut fields: Vec<CustomField> = inner.fields.values().cloned().collect();
        fields.sort_by_key(|f| f.id);
        fields
    }

    async fn find_field(&self, id: u64) -> Option<CustomField> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.fields.get(&id).cloned()
    }

    async fn save_field(&self, field: &mut CustomField) -> Result<(), ValidationError> {
        field.validate()?;

        let mut inner = self.inner.write().expect("store lock poisoned");
        let now = Utc::now();
        if field.new_record() {
            inner.next_field_id += 1;
            field.id = inner.next_field_id;
            field.created_at = now;
        }
        field.updated_at = now;

        for option in &mut field.custom_options {
            option.custom_field_id = field.id;
            if option.new_record() {
                inner.next_option_id += 1;
                option.id = inner.next_option_id;
            }
        }

        inner.fields.insert(field.id, field.clone());
        Ok(())
    }

    async fn destroy_field(&self, id: u64) -> WorktrackResult<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if !inner.fields.contains_key(&id) {
            return Err(WorktrackError::NotFound(format!("custom field {id}")));
        }
        if inner.custom_values.iter().any(|v| v.custom_field_id == id) {
            return Err(WorktrackError::Integrity(format!(
                "custom field {id} is referenced by custom values"
            )));
        }
        inner.fields.remove(&id);
        Ok(())
    }

    async fn find_option(&self, id: u64) -> Option<CustomOption> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .fields
            .values()
            .flat_map(|f| f.custom_options.iter())
            .find(|o| o.id == id)
            .cloned()
    }

    async fn option_exists(&self, id: u64) -> bool {
        self.find_option(id).await.is_some()
    }

    async fn save_option(&self, option: &CustomOption) -> WorktrackResult<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let field = inner
            .fields
            .get_mut(&option.custom_field_id)
            .ok_or_else(|| {
                WorktrackError::NotFound(format!("custom field {}", option.custom_field_id))
            })?;
        let stored = field
            .custom_options
            .iter_mut()
            .find(|o| o.id == option.id)
            .ok_or_else(|| WorktrackError::NotFound(format!("custom option {}", option.id)))?;
        *stored = option.clone();
        Ok(())
    }

    async fn destroy_option(&self, id: u64) -> WorktrackResult<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        for field in inner.fields.values_mut() {
            let len_before = field.custom_options.len();
            field.custom_options.retain(|o| o.id != id);
            if field.custom_options.len() < len_before {
                return Ok(());
            }
        }
        Err(WorktrackError::NotFound(format!("custom option {id}")))
    }

    async fn delete_custom_values(&self, custom_field_id: u64, value: &str) -> usize {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let len_before = inner.custom_values.len();
        inner
            .custom_values
            .retain(|v| !(v.custom_field_id == custom_field_id && v.value == value));
        len_before - inner.custom_values.len()
    }

    async fn create_custom_value(&self, mut value: CustomValue) -> u64 {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.next_value_id += 1;
        value.id = inner.next_value_id;
        let id = value.id;
        inner.custom_values.push(value);
        id
    }

    async fn work_package_types(&self, ids: &[u64]) -> Vec<WorkPackageType> {
        let inner = self.inner.read().expect("store lock poisoned");
        ids.iter()
            .filter_map(|id| inner.work_package_types.get(id))
            .cloned()
            .collect()
    }
}
