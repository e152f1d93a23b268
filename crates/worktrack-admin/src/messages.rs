//! One-time flash messages.
//!
//! Actions report their outcome through a per-request [`Flash`] storage;
//! messages are consumed when drained into the response.

use serde::{Deserialize, Serialize};

/// The severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// A success notice.
    Notice,
    /// A warning that requires attention.
    Warning,
    /// An error message.
    Error,
}

impl FlashLevel {
    /// Returns the CSS tag for this level.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A single flash message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// The severity.
    pub level: FlashLevel,
    /// The message text.
    pub text: String,
}

impl std::fmt::Display for FlashMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Per-request storage for one-time messages.
///
/// # Examples
///
/// ```
/// use worktrack_admin::messages::Flash;
///
/// let mut flash = Flash::new();
/// flash.notice("Successful creation.");
/// assert_eq!(flash.drain().len(), 1);
/// assert!(flash.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Flash {
    messages: Vec<FlashMessage>,
}

impl Flash {
    /// Creates an empty flash storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message with the given level and text.
    pub fn add(&mut self, level: FlashLevel, text: impl Into<String>) {
        self.messages.push(FlashMessage {
            level,
            text: text.into(),
        });
    }

    /// Adds a success notice.
    pub fn notice(&mut self, text: impl Into<String>) {
        self.add(FlashLevel::Notice, text);
    }

    /// Adds a warning.
    pub fn warning(&mut self, text: impl Into<String>) {
        self.add(FlashLevel::Warning, text);
    }

    /// Adds an error message.
    pub fn error(&mut self, text: impl Into<String>) {
        self.add(FlashLevel::Error, text);
    }

    /// Drains and returns all stored messages.
    pub fn drain(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Returns the stored messages without consuming them.
    pub fn peek(&self) -> &[FlashMessage] {
        &self.messages
    }

    /// Returns the number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if no messages are stored.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
