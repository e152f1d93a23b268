//! The admin requirement.
//!
//! Every custom-field action is reserved to administrators. Authentication
//! itself happens upstream; the controller only checks the flag on the
//! already-resolved current user.

use serde::{Deserialize, Serialize};

use worktrack_core::error::{WorktrackError, WorktrackResult};

/// The user a request is executing as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The login name.
    pub name: String,
    /// Whether the user holds administrator privileges.
    pub admin: bool,
}

impl CurrentUser {
    /// Creates an administrator.
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: true,
        }
    }

    /// Creates a regular (non-admin) user.
    pub fn regular(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: false,
        }
    }

    /// The unauthenticated user.
    pub fn anonymous() -> Self {
        Self::regular("anonymous")
    }
}

/// Rejects the request unless the user is an administrator.
pub fn require_admin(user: &CurrentUser) -> WorktrackResult<()> {
    if user.admin {
        Ok(())
    } else {
        Err(WorktrackError::PermissionDenied(format!(
            "user '{}' is not an administrator",
            user.name
        )))
    }
}
