//! Permitted parameters for custom-field forms.
//!
//! [`CustomFieldParams`] is the attribute set an admin form may submit on
//! create and update. [`CustomFieldParams::filtered`] applies the enterprise
//! gate: the multi-value flag is stripped unless the installation is
//! entitled to it, so an unentitled submission never reaches the record.

use serde::{Deserialize, Serialize};

use crate::license::{EnterpriseFeature, EnterpriseGate};
use crate::model::{CustomField, FieldFormat};

/// One submitted option row of a list field.
///
/// The rows arrive as an ordered collection; order is the desired display
/// order. An absent id means "new option". `default_value` is a
/// checkbox-style flag: any non-empty value is truthy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmittedOption {
    /// The id of an existing option, or `None` for a new one.
    #[serde(default)]
    pub id: Option<u64>,
    /// The display string.
    pub value: String,
    /// The raw checkbox value marking this option as the default.
    #[serde(default)]
    pub default_value: Option<String>,
}

impl SubmittedOption {
    /// Creates a row for a new option.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: None,
            value: value.into(),
            default_value: None,
        }
    }

    /// Creates a row targeting an existing option.
    pub fn existing(id: u64, value: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            value: value.into(),
            default_value: None,
        }
    }

    /// Marks the row as the default option.
    #[must_use]
    pub fn default_flag(mut self, flag: &str) -> Self {
        self.default_value = Some(flag.to_string());
        self
    }

    /// Returns `true` if the default checkbox was present and non-empty.
    pub fn is_default(&self) -> bool {
        self.default_value.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// The permitted attribute set for a custom-field form submission.
///
/// Absent attributes leave the record untouched on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomFieldParams {
    /// The display name.
    #[serde(default)]
    pub name: Option<String>,
    /// The value format.
    #[serde(default)]
    pub field_format: Option<FieldFormat>,
    /// Whether the field is required.
    #[serde(default)]
    pub is_required: Option<bool>,
    /// Whether a list field accepts multiple selections (license-gated).
    #[serde(default)]
    pub multi_value: Option<bool>,
    /// The default value for non-list formats.
    #[serde(default)]
    pub default_value: Option<String>,
    /// Submitted option rows, in desired display order.
    #[serde(default)]
    pub custom_options: Vec<SubmittedOption>,
}

impl CustomFieldParams {
    /// Strips license-gated attributes the installation is not entitled to.
    #[must_use]
    pub fn filtered(mut self, gate: &dyn EnterpriseGate) -> Self {
        if !gate.allows(EnterpriseFeature::MultiselectCustomFields) {
            self.multi_value = None;
        }
        self
    }

    /// Applies the submitted attributes to a field in memory.
    ///
    /// Option rows are not applied here; they go through the reconciliation
    /// routine in [`crate::options`].
    pub fn apply_to(&self, field: &mut CustomField) {
        if let Some(name) = &self.name {
            field.name.clone_from(name);
        }
        if let Some(format) = self.field_format {
            field.field_format = format;
        }
        if let Some(required) = self.is_required {
            field.is_required = required;
        }
        if let Some(multi) = self.multi_value {
            field.multi_value = multi;
        }
        if let Some(default) = &self.default_value {
            field.default_value = Some(default.clone());
        }
    }
}
