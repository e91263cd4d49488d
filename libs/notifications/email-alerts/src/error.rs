//! Error types for the notification pipeline.

use std::fmt;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur while configuring or rendering notifications.
///
/// Transport failures never appear here; they are captured in
/// [`mailer::SendResult`] error messages and inspected by the caller.
#[derive(Debug)]
pub enum NotificationError {
    /// Required configuration is missing or unusable
    Config(String),
    /// A template failed to compile
    Template(String),
    /// A compiled template failed to render
    Rendering(String),
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Template(msg) => write!(f, "Template error: {}", msg),
            Self::Rendering(msg) => write!(f, "Rendering error: {}", msg),
        }
    }
}

impl std::error::Error for NotificationError {}

impl From<handlebars::TemplateError> for NotificationError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Rendering(err.to_string())
    }
}
