//! Event model adapter
//!
//! Converts an event plus host context into the two renderable data shapes:
//! the rendering context (`$`-prefixed built-in keys, for local templates)
//! and the provider payload (unprefixed keys, for provider-side templates).
//! Event properties are overlaid onto the built-ins last, so a property
//! wins any literal-name collision; the `$` prefix keeps the local built-ins
//! clear of ordinary property names.

use crate::config::HostInfo;
use crate::event::Event;
use chrono::SecondsFormat;
use serde_json::{json, Map, Value};

/// Recursively normalize a property value: mappings normalize each entry,
/// sequences each element, scalars pass through unchanged.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(name, value)| (name.clone(), normalize(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        scalar => scalar.clone(),
    }
}

/// An absent property map normalizes to an empty mapping.
fn normalized_properties(event: &Event) -> Map<String, Value> {
    event
        .properties
        .as_ref()
        .map(|properties| {
            properties
                .iter()
                .map(|(name, value)| (name.clone(), normalize(value)))
                .collect()
        })
        .unwrap_or_default()
}

/// The event-detail URL on the hosting instance.
///
/// Only valid when events are streamed directly to the pipeline, not when
/// an upstream alert fabricated the event.
pub fn event_uri(base_uri: &str, event_id: &str) -> String {
    format!("{base_uri}#/events?filter=@Id%20%3D%20'{event_id}'&amp;show=expanded")
}

/// Event types render as `$` followed by eight uppercase hex digits.
pub fn event_type_token(event_type: u32) -> String {
    format!("${event_type:08X}")
}

/// Build the context evaluated by locally rendered templates. Built-in keys
/// carry a `$` prefix.
pub fn build_rendering_context(
    event: &Event,
    host: &HostInfo,
    date_time_format: &str,
    time_zone_name: &str,
) -> Value {
    build(event, host, date_time_format, time_zone_name, "$")
}

/// Build the payload handed to provider-side templates. Same information as
/// the rendering context, with unprefixed keys.
pub fn build_provider_payload(
    event: &Event,
    host: &HostInfo,
    date_time_format: &str,
    time_zone_name: &str,
) -> Value {
    build(event, host, date_time_format, time_zone_name, "")
}

fn build(
    event: &Event,
    host: &HostInfo,
    date_time_format: &str,
    time_zone_name: &str,
    prefix: &str,
) -> Value {
    let properties = normalized_properties(event);

    let mut payload = Map::new();
    let mut insert = |name: &str, value: Value| {
        payload.insert(format!("{prefix}{name}"), value);
    };

    insert("Id", json!(event.id));
    insert(
        "UtcTimestamp",
        json!(event
            .timestamp_utc
            .to_rfc3339_opts(SecondsFormat::Micros, true)),
    );
    insert(
        "LocalTimestamp",
        json!(event
            .local_timestamp
            .to_rfc3339_opts(SecondsFormat::Micros, false)),
    );
    insert("Level", json!(event.level.to_string()));
    insert("MessageTemplate", json!(event.message_template));
    insert("Message", json!(event.rendered_message));
    insert("Exception", json!(event.exception));
    insert("Properties", Value::Object(properties.clone()));
    insert("EventType", json!(event_type_token(event.event_type)));
    insert("Instance", json!(host.instance_name));
    insert("ServerUri", json!(host.base_uri));
    insert("EventUri", json!(event_uri(&host.base_uri, &event.id)));
    insert("DateTimeFormat", json!(date_time_format));
    insert("TimeZoneName", json!(time_zone_name));

    // Properties overlay the built-ins: last write wins on collision.
    for (name, value) in properties {
        payload.insert(name, value);
    }

    Value::Object(payload)
}
