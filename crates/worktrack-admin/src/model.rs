//! The custom-field data model.
//!
//! [`CustomField`] is a field definition created by an administrator,
//! [`CustomOption`] is one selectable value of a list-format field, and
//! [`CustomValue`] is a recorded assignment of a field's value on some
//! entity instance. Records with an id of `0` have never been saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use worktrack_core::error::ValidationError;

use crate::registry::CustomFieldType;

/// The maximum length of a custom field name, in characters.
pub const NAME_MAX_LENGTH: usize = 30;

/// The value format of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    /// A single line of text.
    Text,
    /// A multi-line text block.
    LongText,
    /// An integer value.
    Int,
    /// A floating-point value.
    Float,
    /// One of a discrete set of options.
    List,
    /// A calendar date.
    Date,
    /// A boolean flag.
    Bool,
    /// A reference to a user.
    User,
    /// A reference to a version.
    Version,
}

impl FieldFormat {
    /// Returns the format key as it appears in forms and settings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::LongText => "long_text",
            Self::Int => "int",
            Self::Float => "float",
            Self::List => "list",
            Self::Date => "date",
            Self::Bool => "bool",
            Self::User => "user",
            Self::Version => "version",
        }
    }
}

/// One selectable value of a list-format custom field.
///
/// Positions are 1-based and dense; they are reassigned in submission order
/// on every reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomOption {
    /// The option id; `0` until first saved.
    pub id: u64,
    /// The id of the owning custom field; `0` until the parent is saved.
    pub custom_field_id: u64,
    /// The display string.
    pub value: String,
    /// The 1-based display position.
    pub position: u32,
    /// Whether this option is pre-selected by default.
    pub default_value: bool,
}

impl CustomOption {
    /// Creates an unsaved option.
    pub fn new(value: impl Into<String>, position: u32, default_value: bool) -> Self {
        Self {
            id: 0,
            custom_field_id: 0,
            value: value.into(),
            position,
            default_value,
        }
    }

    /// Returns `true` if this option has never been saved.
    pub const fn new_record(&self) -> bool {
        self.id == 0
    }
}

/// An admin-defined metadata field attachable to a kind of domain entity.
///
/// # Examples
///
/// ```
/// use worktrack_admin::model::{CustomField, FieldFormat};
/// use worktrack_admin::registry::CustomFieldType;
///
/// let field = CustomField::new(CustomFieldType::Project)
///     .name("Responsible department")
///     .format(FieldFormat::Text);
/// assert!(field.new_record());
/// assert!(field.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomField {
    /// The field id; `0` until first saved.
    pub id: u64,
    /// The display name.
    pub name: String,
    /// The concrete subtype, i.e. which entity kind the field attaches to.
    pub field_type: CustomFieldType,
    /// The value format.
    pub field_format: FieldFormat,
    /// Whether entities must fill in this field.
    pub is_required: bool,
    /// Whether a list field accepts multiple selected options. Only
    /// meaningful for [`FieldFormat::List`]; gated by an enterprise feature.
    pub multi_value: bool,
    /// The default value for non-list formats.
    pub default_value: Option<String>,
    /// Ordering among fields of the same subtype.
    pub position: u32,
    /// The selectable options of a list-format field.
    pub custom_options: Vec<CustomOption>,
    /// For work-package fields, the work-package types the field is enabled on.
    pub work_package_type_ids: Vec<u64>,
    /// When the field was first saved.
    pub created_at: DateTime<Utc>,
    /// When the field was last saved.
    pub updated_at: DateTime<Utc>,
}

impl CustomField {
    /// Creates an unsaved field of the given subtype with defaults.
    pub fn new(field_type: CustomFieldType) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: String::new(),
            field_type,
            field_format: FieldFormat::Text,
            is_required: false,
            multi_value: false,
            default_value: None,
            position: 0,
            custom_options: Vec::new(),
            work_package_type_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the value format.
    #[must_use]
    pub const fn format(mut self, format: FieldFormat) -> Self {
        self.field_format = format;
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.is_required = required;
        self
    }

    /// Adds a selectable option at the next position.
    #[must_use]
    pub fn with_option(mut self, value: impl Into<String>, default_value: bool) -> Self {
        let position = self.custom_options.len() as u32 + 1;
        self.custom_options
            .push(CustomOption::new(value, position, default_value));
        self
    }

    /// Returns `true` if this field has never been saved.
    pub const fn new_record(&self) -> bool {
        self.id == 0
    }

    /// Returns `true` if this is a list-format field.
    pub fn is_list(&self) -> bool {
        self.field_format == FieldFormat::List
    }

    /// Validates the field, returning every violation found.
    ///
    /// Enforced rules: the name is present and at most [`NAME_MAX_LENGTH`]
    /// characters; list fields carry at least one option and at most one
    /// default option; `multi_value` is only set on list fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();

        if self.name.trim().is_empty() {
            errors.add("name", "must not be blank");
        } else if self.name.chars().count() > NAME_MAX_LENGTH {
            errors.add(
                "name",
                format!("is too long (maximum is {NAME_MAX_LENGTH} characters)"),
            );
        }

        if self.is_list() {
            if self.custom_options.is_empty() {
                errors.add("custom_options", "must have at least one option");
            }
            let defaults = self
                .custom_options
                .iter()
                .filter(|o| o.default_value)
                .count();
            if defaults > 1 {
                errors.add("custom_options", "only one option can be the default");
            }
        } else if self.multi_value {
            errors.add("multi_value", "is only available for list fields");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            errors.message = "Custom field is invalid".to_string();
            errors.code = "invalid".to_string();
            Err(errors)
        }
    }
}

/// A recorded assignment of a custom field's value on an entity instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomValue {
    /// The value id; `0` until saved.
    pub id: u64,
    /// The custom field this value belongs to.
    pub custom_field_id: u64,
    /// The id of the entity instance carrying the value.
    pub customized_id: u64,
    /// The raw stored value. For list fields this is the option id rendered
    /// as a string.
    pub value: String,
}

impl CustomValue {
    /// Creates an unsaved custom value.
    pub fn new(custom_field_id: u64, customized_id: u64, value: impl Into<String>) -> Self {
        Self {
            id: 0,
            custom_field_id,
            customized_id,
            value: value.into(),
        }
    }
}

/// A work-package type (e.g. "Task", "Bug") that a work-package custom
/// field can be enabled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPackageType {
    /// The type id.
    pub id: u64,
    /// The display name.
    pub name: String,
}
