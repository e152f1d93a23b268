//! Redirect targets and the back-or-default resolver.
//!
//! Path helpers keep redirect construction in one place, and
//! [`back_url_or_default`] makes the "return to previous page or default"
//! behavior an explicit contract: only safe relative paths are honored.

/// The unfiltered custom-fields listing.
pub fn custom_fields_path() -> String {
    "/admin/custom_fields".to_string()
}

/// The listing filtered to a subtype tab.
pub fn custom_fields_tab_path(tab: &str) -> String {
    format!("/admin/custom_fields?tab={tab}")
}

/// The edit page for a custom field.
pub fn edit_custom_field_path(id: u64) -> String {
    format!("/admin/custom_fields/{id}/edit")
}

/// Returns `true` if the URL is a safe in-application redirect target.
///
/// Safe targets are relative paths: a single leading `/`, no scheme or
/// host, no backslashes, no control characters.
pub fn is_safe_redirect(url: &str) -> bool {
    url.starts_with('/')
        && !url.starts_with("//")
        && !url.contains("://")
        && !url.contains('\\')
        && !url.chars().any(char::is_control)
}

/// Resolves the redirect target after a successful write: the caller's
/// back-url when it is safe, the given default otherwise.
pub fn back_url_or_default(back_url: Option<&str>, default: &str) -> String {
    match back_url {
        Some(url) if is_safe_redirect(url) => url.to_string(),
        _ => default.to_string(),
    }
}
