//! The closed registry of custom-field subtypes.
//!
//! Creation requests carry a user-supplied subtype tag (e.g.
//! `"ProjectCustomField"`). The tag is resolved against this closed enum
//! rather than by reflection, so unrecognized names can never instantiate an
//! unintended type.

use serde::{Deserialize, Serialize};

/// The concrete subtype of a custom field, i.e. which kind of domain entity
/// the field attaches to.
///
/// Each variant has a canonical tag ending in `"CustomField"`; the tag is
/// what appears in URLs, the listing tabs, and creation requests.
///
/// # Examples
///
/// ```
/// use worktrack_admin::registry::CustomFieldType;
///
/// assert_eq!(
///     CustomFieldType::from_tag("ProjectCustomField"),
///     Some(CustomFieldType::Project)
/// );
/// assert_eq!(CustomFieldType::from_tag("EvilClass"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CustomFieldType {
    /// Fields attachable to work packages.
    WorkPackage,
    /// Fields attachable to projects.
    Project,
    /// Fields attachable to users.
    User,
    /// Fields attachable to groups.
    Group,
    /// Fields attachable to time entries.
    TimeEntry,
    /// Fields attachable to versions.
    Version,
}

impl CustomFieldType {
    /// The suffix every valid subtype tag must carry.
    pub const TAG_SUFFIX: &'static str = "CustomField";

    /// All registered subtypes.
    pub const ALL: [Self; 6] = [
        Self::WorkPackage,
        Self::Project,
        Self::User,
        Self::Group,
        Self::TimeEntry,
        Self::Version,
    ];

    /// Returns the canonical tag for this subtype.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::WorkPackage => "WorkPackageCustomField",
            Self::Project => "ProjectCustomField",
            Self::User => "UserCustomField",
            Self::Group => "GroupCustomField",
            Self::TimeEntry => "TimeEntryCustomField",
            Self::Version => "VersionCustomField",
        }
    }

    /// Resolves a user-supplied tag to a registered subtype.
    ///
    /// The tag must end in [`TAG_SUFFIX`](Self::TAG_SUFFIX) and match a
    /// registered subtype exactly; anything else yields `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if !tag.ends_with(Self::TAG_SUFFIX) {
            return None;
        }
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl std::fmt::Display for CustomFieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
