//! The event model
//!
//! Events are owned by the caller and read-only to the pipeline. Property
//! values are arbitrary JSON-like trees (scalars, nested mappings,
//! sequences) carried as `serde_json::Value`.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Severity of a log or alert event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Level {
    Verbose,
    Debug,
    #[default]
    Information,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Verbose => "Verbose",
            Level::Debug => "Debug",
            Level::Information => "Information",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
        })
    }
}

/// One structured log/alert record flowing through the pipeline.
///
/// The event type is a stable numeric classifier shared by recurring events
/// of the same kind; it keys suppression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub event_type: u32,
    pub timestamp_utc: DateTime<Utc>,
    pub local_timestamp: DateTime<FixedOffset>,
    pub level: Level,
    pub message_template: String,
    pub rendered_message: String,
    #[serde(default)]
    pub exception: Option<String>,
    /// Ordered property map; `None` when the source attached no properties.
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        event_type: u32,
        timestamp_utc: DateTime<Utc>,
        level: Level,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            id: id.into(),
            event_type,
            timestamp_utc,
            local_timestamp: timestamp_utc.fixed_offset(),
            level,
            message_template: message.clone(),
            rendered_message: message,
            exception: None,
            properties: None,
        }
    }

    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }
}
