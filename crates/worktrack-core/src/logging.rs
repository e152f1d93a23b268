//! Logging setup for the worktrack backend.
//!
//! Provides a [`tracing`]-based subscriber configured from
//! [`Settings`](crate::settings::Settings) and a helper for per-action spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter directive is read from `settings.log_level`. In debug mode a
/// compact single-line console format is used; in production events are
/// emitted as flattened JSON so the action-span fields (controller, action)
/// land as top-level keys for log aggregation. Calling this twice is
/// harmless: the second attempt to install a subscriber is ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for a controller action.
///
/// # Examples
///
/// ```
/// use worktrack_core::logging::action_span;
///
/// let span = action_span("custom_fields", "create");
/// let _guard = span.enter();
/// tracing::info!("handling action");
/// ```
pub fn action_span(controller: &str, action: &str) -> tracing::Span {
    tracing::info_span!("action", controller = controller, action = action)
}
