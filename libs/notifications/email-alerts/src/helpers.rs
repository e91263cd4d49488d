//! Custom Handlebars helpers available to notification templates
//!
//! - `pretty` — readable value rendering for HTML tables
//! - `if_eq` — block helper comparing two values ordinally
//! - `substring` — bounded substring with forgiving argument parsing
//! - `datetime` — time-zone-aware timestamp formatting

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};
use chrono_tz::Tz;
use handlebars::{
    html_escape, Context, Handlebars, Helper, HelperResult, JsonRender, Output, RenderContext,
    Renderable,
};
use serde_json::Value;
use std::fmt::Write as _;

/// Register every custom helper on a registry.
pub fn register(registry: &mut Handlebars<'static>) {
    registry.register_helper("pretty", Box::new(pretty_helper));
    registry.register_helper("if_eq", Box::new(if_eq_helper));
    registry.register_helper("substring", Box::new(substring_helper));
    registry.register_helper("datetime", Box::new(datetime_helper));
}

/// `{{pretty value}}`
///
/// Absent values render as a literal `null`; nested mappings and sequences
/// as their JSON serialization; anything else as its string form, with a
/// whitespace-only string replaced by `&nbsp;` so empty HTML table cells
/// stay visible.
fn pretty_helper<'reg, 'rc>(
    h: &Helper<'rc>,
    _r: &'reg Handlebars<'reg>,
    _ctx: &'rc Context,
    _rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    match h.param(0).map(|p| p.value()) {
        None | Some(Value::Null) => out.write("null")?,
        Some(value @ (Value::Object(_) | Value::Array(_))) => {
            let serialized = serde_json::to_string(value).unwrap_or_default();
            out.write(&html_escape(&serialized))?;
        }
        Some(scalar) => {
            let text = scalar.render();
            if text.trim().is_empty() {
                out.write("&nbsp;")?;
            } else {
                out.write(&html_escape(&text))?;
            }
        }
    }
    Ok(())
}

/// `{{#if_eq lhs rhs}}...{{else}}...{{/if_eq}}`
///
/// Renders the block when the trimmed string forms compare equal; anything
/// other than exactly two arguments renders the else-branch.
fn if_eq_helper<'reg, 'rc>(
    h: &Helper<'rc>,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    let branch = if h.params().len() == 2 {
        let lhs = h.param(0).map(|p| p.value().render()).unwrap_or_default();
        let rhs = h.param(1).map(|p| p.value().render()).unwrap_or_default();
        if lhs.trim() == rhs.trim() {
            h.template()
        } else {
            h.inverse()
        }
    } else {
        h.inverse()
    };

    match branch {
        Some(template) => template.render(r, ctx, rc, out),
        None => Ok(()),
    }
}

/// `{{substring value start length}}`
///
/// With no further arguments the value passes through unchanged. A start
/// beyond the end of the string yields the empty string; a length is
/// clamped to what remains. Offsets are in characters, and non-numeric
/// start/length arguments count as zero.
fn substring_helper<'reg, 'rc>(
    h: &Helper<'rc>,
    _r: &'reg Handlebars<'reg>,
    _ctx: &'rc Context,
    _rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    let Some(value) = h.param(0).map(|p| p.value()) else {
        return Ok(());
    };
    let text = value.render();

    if h.params().len() < 2 {
        out.write(&html_escape(&text))?;
        return Ok(());
    }

    let start = parse_offset(h.param(1).map(|p| p.value()));
    let available = text.chars().count();
    if start > available {
        return Ok(());
    }

    let taken: String = if h.params().len() < 3 {
        text.chars().skip(start).collect()
    } else {
        let length = parse_offset(h.param(2).map(|p| p.value())).min(available - start);
        text.chars().skip(start).take(length).collect()
    };

    out.write(&html_escape(&taken))?;
    Ok(())
}

fn parse_offset(value: Option<&Value>) -> usize {
    value
        .map(JsonRender::render)
        .unwrap_or_default()
        .trim()
        .parse()
        .unwrap_or(0)
}

/// `{{datetime value format timezone}}`
///
/// Parses the value as a timestamp (an input without an offset is treated
/// as UTC; parse failure yields no output), optionally converts it into an
/// IANA time zone, and formats it with the given strftime string (RFC 3339
/// when absent). A zero offset renders with the ISO-8601 trailing `Z`
/// convention rather than `+00:00`.
fn datetime_helper<'reg, 'rc>(
    h: &Helper<'rc>,
    _r: &'reg Handlebars<'reg>,
    _ctx: &'rc Context,
    _rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    let Some(input) = h.param(0).and_then(|p| p.value().as_str()) else {
        return Ok(());
    };
    let Some(mut timestamp) = parse_timestamp(input) else {
        return Ok(());
    };

    let format = h.param(1).and_then(|p| p.value().as_str());

    if let Some(zone_name) = h.param(2).and_then(|p| p.value().as_str()) {
        let Ok(zone) = zone_name.parse::<Tz>() else {
            return Ok(());
        };
        timestamp = timestamp.with_timezone(&zone).fixed_offset();
    }

    out.write(&html_escape(&format_timestamp(timestamp, format)))?;
    Ok(())
}

fn parse_timestamp(input: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed);
    }

    // Offset-less inputs are treated as UTC.
    for naive_format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, naive_format) {
            return Some(parsed.and_utc().fixed_offset());
        }
    }

    None
}

fn format_timestamp(timestamp: DateTime<FixedOffset>, format: Option<&str>) -> String {
    let utc = timestamp.offset().local_minus_utc() == 0;

    let Some(format) = format else {
        return timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);
    };

    let mut rendered = String::new();
    if write!(rendered, "{}", timestamp.format(format)).is_err() {
        // An invalid strftime string renders as no output.
        return String::new();
    }

    if utc {
        // ISO-8601 UTC convention: trailing `Z` rather than `+00:00`.
        rendered.replace("+00:00", "Z")
    } else {
        rendered
    }
}
