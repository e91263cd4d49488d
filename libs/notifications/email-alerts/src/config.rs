//! Per-instance configuration supplied by the host

use serde::{Deserialize, Serialize};

/// Default time zone used when formatting dates and times.
pub const DEFAULT_TIME_ZONE: &str = "Etc/UTC";

/// strftime form of RFC 3339, used when templates are rendered locally.
pub(crate) const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// Locale-style default used when rendering is delegated to a provider
/// template.
pub(crate) const PROVIDER_DATE_TIME_FORMAT: &str = "%B %d, %Y %I:%M:%S %p";

/// The hosting instance this pipeline runs in.
#[derive(Debug, Clone, Default)]
pub struct HostInfo {
    pub instance_name: String,
    pub base_uri: String,
}

impl HostInfo {
    pub fn new(instance_name: impl Into<String>, base_uri: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
            base_uri: base_uri.into(),
        }
    }
}

/// Settings for one notifier instance.
///
/// The `to` and `cc` address strings are Handlebars templates, evaluated
/// per event; the paired name strings are used verbatim. Multiple addresses
/// and names are separated by semicolons.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NotifierSettings {
    /// SendGrid API key; required unless a sender is injected.
    pub api_key: Option<String>,
    /// Provider-side template id; when set, rendering is delegated to the
    /// provider and the local body template is not sent.
    pub template_id: Option<String>,
    pub from: String,
    pub from_name: Option<String>,
    pub to: String,
    pub to_name: Option<String>,
    pub cc: Option<String>,
    pub cc_name: Option<String>,
    /// Subject template; a default is used when blank.
    pub subject_template: Option<String>,
    /// Body template; a default HTML template is used when blank.
    pub body_template: Option<String>,
    /// Once an event type has been sent, minutes to wait before sending it
    /// again. Zero disables suppression.
    pub suppression_minutes: u32,
    /// IANA time zone name; defaults to [`DEFAULT_TIME_ZONE`].
    pub time_zone_name: Option<String>,
    /// strftime format string for the `datetime` helper and provider
    /// payloads.
    pub date_time_format: Option<String>,
    /// Ask the provider to validate without delivering.
    pub sandbox_mode: bool,
}

impl NotifierSettings {
    pub(crate) fn time_zone(&self) -> &str {
        trimmed_or(&self.time_zone_name, DEFAULT_TIME_ZONE)
    }

    pub(crate) fn local_date_time_format(&self) -> &str {
        trimmed_or(&self.date_time_format, LOCAL_DATE_TIME_FORMAT)
    }

    pub(crate) fn provider_date_time_format(&self) -> &str {
        trimmed_or(&self.date_time_format, PROVIDER_DATE_TIME_FORMAT)
    }
}

fn trimmed_or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}
