//! # worktrack-core
//!
//! Core building blocks shared across the worktrack backend: the error
//! taxonomy, application settings, and logging setup.

pub mod error;
pub mod logging;
pub mod settings;

pub use error::{ValidationError, WorktrackError, WorktrackResult};
pub use settings::Settings;
