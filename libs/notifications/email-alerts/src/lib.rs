//! Event-to-email notification pipeline
//!
//! Turns a stream of structured log/alert events into formatted email
//! notifications, with per-event-type rate suppression and pluggable
//! delivery via the `mailer` crate. The hosting platform feeds one event at
//! a time and reads back a running count of successful sends.
//!
//! ## Components
//!
//! - **Event model**: [`Event`] and [`Level`], owned by the caller
//! - **Template data**: [`context`] builds the rendering context
//!   (`$`-prefixed keys) and the provider payload (unprefixed keys) per
//!   event
//! - **Templates**: [`EventTemplates`], Handlebars templates compiled once
//!   at attach time, with the custom `pretty`, `if_eq`, `substring` and
//!   `datetime` helpers
//! - **Suppression**: [`SuppressionTracker`], a lazy time-windowed dedup
//!   gate keyed by event type
//! - **Pipeline**: [`EmailNotifier`], which gates, renders, assembles and
//!   dispatches each event
//!
//! ## Usage
//!
//! ```ignore
//! use email_alerts::{EmailNotifier, HostInfo, NotifierSettings};
//!
//! let settings = NotifierSettings {
//!     api_key: Some("SG.xxxxx".into()),
//!     from: "alerts@example.com".into(),
//!     to: "ops@example.com".into(),
//!     suppression_minutes: 10,
//!     ..Default::default()
//! };
//! let notifier = EmailNotifier::new(settings, HostInfo::new("prod", "https://logs.example.com/"))?;
//! notifier.on_event(&event).await?;
//! ```

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod helpers;
pub mod notifier;
pub mod suppression;
pub mod templates;

pub use clock::{Clock, SystemClock};
pub use config::{HostInfo, NotifierSettings, DEFAULT_TIME_ZONE};
pub use error::{NotificationError, NotificationResult};
pub use event::{Event, Level};
pub use notifier::EmailNotifier;
pub use suppression::SuppressionTracker;
pub use templates::EventTemplates;
