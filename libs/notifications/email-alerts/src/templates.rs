//! Compiled notification templates
//!
//! Templates compile once, when the notifier attaches its configuration,
//! into a single registry that is shared read-only across renders.

use crate::config::NotifierSettings;
use crate::error::NotificationResult;
use crate::helpers;
use handlebars::Handlebars;
use serde_json::Value;

/// Subject used when no template is configured.
const DEFAULT_SUBJECT_TEMPLATE: &str = "[{{$Level}}] {{{$Message}}}";

/// Rendered subjects are truncated to this many characters.
const MAX_SUBJECT_LENGTH: usize = 130;

const SUBJECT: &str = "subject";
const BODY: &str = "body";
const TO: &str = "to";
const CC: &str = "cc";

/// Body used when no template is configured: level banner, event metadata,
/// exception block and a property table.
const DEFAULT_BODY_TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="padding: 12px; color: #ffffff; background-color: {{#if_eq $Level "Fatal"}}#b91c1c{{else}}{{#if_eq $Level "Error"}}#dc2626{{else}}{{#if_eq $Level "Warning"}}#d97706{{else}}#2563eb{{/if_eq}}{{/if_eq}}{{/if_eq}};">
    <strong>[{{$Level}}]</strong> {{$Message}}
  </div>
  <p>
    <a href="{{$EventUri}}">{{$EventType}}</a>
    on <strong>{{$Instance}}</strong>
    at {{datetime $UtcTimestamp $DateTimeFormat $TimeZoneName}}
  </p>
  {{#if $Exception}}
  <pre style="background-color: #f6f6f6; padding: 8px; overflow-x: auto;">{{$Exception}}</pre>
  {{/if}}
  <table cellpadding="6" cellspacing="0" style="border-collapse: collapse; border: 1px solid #ddd;">
    {{#each $Properties}}
    <tr>
      <td style="border: 1px solid #ddd;"><strong>{{@key}}</strong></td>
      <td style="border: 1px solid #ddd;">{{pretty this}}</td>
    </tr>
    {{/each}}
  </table>
</body>
</html>"##;

/// The four templates a notifier instance renders per event. The to and cc
/// address settings are templates too, so recipients can be derived from
/// event properties.
pub struct EventTemplates {
    registry: Handlebars<'static>,
    has_cc: bool,
}

impl EventTemplates {
    /// Compile every configured template; invalid syntax fails here, once,
    /// rather than per event.
    pub fn compile(settings: &NotifierSettings) -> NotificationResult<Self> {
        let mut registry = Handlebars::new();
        helpers::register(&mut registry);

        registry.register_template_string(
            SUBJECT,
            configured(&settings.subject_template, DEFAULT_SUBJECT_TEMPLATE),
        )?;
        registry.register_template_string(
            BODY,
            configured(&settings.body_template, DEFAULT_BODY_TEMPLATE),
        )?;
        registry.register_template_string(TO, &settings.to)?;

        let has_cc = match settings.cc.as_deref().filter(|cc| !cc.trim().is_empty()) {
            Some(cc) => {
                registry.register_template_string(CC, cc)?;
                true
            }
            None => false,
        };

        Ok(Self { registry, has_cc })
    }

    /// Rendered subject: newlines stripped, trimmed, and truncated to
    /// [`MAX_SUBJECT_LENGTH`] characters.
    pub fn render_subject(&self, context: &Value) -> NotificationResult<String> {
        let rendered = self.registry.render(SUBJECT, context)?;
        let subject = rendered.replace(['\r', '\n'], "");
        Ok(subject.trim().chars().take(MAX_SUBJECT_LENGTH).collect())
    }

    pub fn render_body(&self, context: &Value) -> NotificationResult<String> {
        Ok(self.registry.render(BODY, context)?)
    }

    pub fn render_to(&self, context: &Value) -> NotificationResult<String> {
        Ok(self.registry.render(TO, context)?)
    }

    /// `None` when no cc addresses are configured.
    pub fn render_cc(&self, context: &Value) -> NotificationResult<Option<String>> {
        if !self.has_cc {
            return Ok(None);
        }
        Ok(Some(self.registry.render(CC, context)?))
    }
}

fn configured<'a>(template: &'a Option<String>, default: &'a str) -> &'a str {
    template
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostInfo;
    use crate::context::build_rendering_context;
    use crate::error::NotificationError;
    use crate::event::{Event, Level};
    use chrono::{TimeZone, Utc};

    fn settings() -> NotifierSettings {
        NotifierSettings {
            from: "alerts@example.com".to_string(),
            to: "ops@example.com".to_string(),
            ..Default::default()
        }
    }

    fn context() -> Value {
        let event = Event::new(
            "event-1",
            99,
            Utc.with_ymd_and_hms(2023, 3, 1, 17, 30, 11).unwrap(),
            Level::Fatal,
            "Everything failed",
        )
        .with_property("What", 10);
        build_rendering_context(
            &event,
            &HostInfo::new("prod", "https://logs.example.com/"),
            "%Y-%m-%dT%H:%M:%S%:z",
            "Etc/UTC",
        )
    }

    #[test]
    fn default_subject_renders_level_and_message() {
        let templates = EventTemplates::compile(&settings()).unwrap();
        assert_eq!(
            templates.render_subject(&context()).unwrap(),
            "[Fatal] Everything failed"
        );
    }

    #[test]
    fn subjects_lose_newlines_and_are_truncated() {
        let mut s = settings();
        s.subject_template = Some(format!("  one\r\ntwo {}", "x".repeat(200)));
        let templates = EventTemplates::compile(&s).unwrap();

        let subject = templates.render_subject(&context()).unwrap();
        assert!(!subject.contains('\n'));
        assert!(subject.starts_with("onetwo"));
        assert_eq!(subject.chars().count(), 130);
    }

    #[test]
    fn default_body_renders_message_and_properties() {
        let templates = EventTemplates::compile(&settings()).unwrap();
        let body = templates.render_body(&context()).unwrap();

        assert!(body.contains("Everything failed"));
        assert!(body.contains("$00000063"));
        assert!(body.contains("<strong>What</strong>"));
        assert!(body.contains("2023-03-01T17:30:11Z"));
        assert!(body.contains("#b91c1c"));
    }

    #[test]
    fn to_addresses_are_templated() {
        let mut s = settings();
        s.to = "{{Name}}@example.com".to_string();
        let templates = EventTemplates::compile(&s).unwrap();

        let event = Event::new(
            "event-1",
            99,
            Utc.with_ymd_and_hms(2023, 3, 1, 17, 30, 11).unwrap(),
            Level::Error,
            "boom",
        )
        .with_property("Name", "ops");
        let context = build_rendering_context(
            &event,
            &HostInfo::new("prod", "https://logs.example.com/"),
            "%+",
            "Etc/UTC",
        );

        assert_eq!(templates.render_to(&context).unwrap(), "ops@example.com");
    }

    #[test]
    fn cc_is_optional() {
        let templates = EventTemplates::compile(&settings()).unwrap();
        assert!(templates.render_cc(&context()).unwrap().is_none());

        let mut s = settings();
        s.cc = Some("audit@example.com".to_string());
        let templates = EventTemplates::compile(&s).unwrap();
        assert_eq!(
            templates.render_cc(&context()).unwrap().as_deref(),
            Some("audit@example.com")
        );
    }

    #[test]
    fn invalid_template_syntax_fails_at_compile_time() {
        let mut s = settings();
        s.subject_template = Some("{{#if".to_string());
        let result = EventTemplates::compile(&s);
        assert!(matches!(result, Err(NotificationError::Template(_))));
    }
}
