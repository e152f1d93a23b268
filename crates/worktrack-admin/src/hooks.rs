//! Extension hooks fired after custom-field writes.
//!
//! Plugins register handlers against a named hook; the controller fires the
//! hook after a successful create or update, passing the saved field.
//! Handlers run in registration order on the calling thread.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::model::CustomField;

/// The extension points the custom-fields controller exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomFieldHook {
    /// Fired after a field is created and saved.
    Created,
    /// Fired after a field is updated and saved.
    Updated,
}

impl CustomFieldHook {
    /// Returns the hook's registered name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Created => "custom_field_created",
            Self::Updated => "custom_field_updated",
        }
    }
}

/// A hook handler; receives the saved field.
pub type HookHandler = Arc<dyn Fn(&CustomField) + Send + Sync>;

/// Registry of hook handlers, shareable across threads.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use worktrack_admin::hooks::{CustomFieldHook, HookRegistry};
///
/// let registry = HookRegistry::new();
/// registry.connect(CustomFieldHook::Created, "audit", Arc::new(|field| {
///     println!("created custom field {}", field.name);
/// }));
/// assert_eq!(registry.handler_count(CustomFieldHook::Created), 1);
/// ```
#[derive(Default)]
pub struct HookRegistry {
    handlers: RwLock<HashMap<CustomFieldHook, Vec<(String, HookHandler)>>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a handler to a hook.
    ///
    /// The `handler_id` identifies the handler for later disconnection; a
    /// handler registered under an existing id replaces it.
    pub fn connect(&self, hook: CustomFieldHook, handler_id: impl Into<String>, handler: HookHandler) {
        let id = handler_id.into();
        let mut handlers = self.handlers.write().expect("hook lock poisoned");
        let entries = handlers.entry(hook).or_default();
        if let Some(entry) = entries.iter_mut().find(|(hid, _)| *hid == id) {
            entry.1 = handler;
        } else {
            entries.push((id, handler));
        }
    }

    /// Disconnects the handler with the given id.
    ///
    /// Returns `true` if a handler was found and removed.
    pub fn disconnect(&self, hook: CustomFieldHook, handler_id: &str) -> bool {
        let mut handlers = self.handlers.write().expect("hook lock poisoned");
        let Some(entries) = handlers.get_mut(&hook) else {
            return false;
        };
        let len_before = entries.len();
        entries.retain(|(id, _)| id != handler_id);
        entries.len() < len_before
    }

    /// Fires a hook, calling every connected handler with the field.
    pub fn call(&self, hook: CustomFieldHook, field: &CustomField) {
        let handlers = self.handlers.read().expect("hook lock poisoned");
        if let Some(entries) = handlers.get(&hook) {
            tracing::debug!(hook = hook.name(), handlers = entries.len(), "firing hook");
            for (_, handler) in entries {
                handler(field);
            }
        }
    }

    /// Returns the number of handlers connected to a hook.
    pub fn handler_count(&self, hook: CustomFieldHook) -> usize {
        self.handlers
            .read()
            .expect("hook lock poisoned")
            .get(&hook)
            .map_or(0, Vec::len)
    }
}
