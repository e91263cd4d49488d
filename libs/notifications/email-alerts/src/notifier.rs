//! The event→email pipeline
//!
//! One event enters, is suppressed-or-not, is rendered into
//! subject/body/recipients, assembled into a transport-neutral message and
//! handed to the configured sender. Successful sends are counted; failed
//! sends are logged and captured, never raised.

use crate::clock::{Clock, SystemClock};
use crate::config::{HostInfo, NotifierSettings};
use crate::context;
use crate::error::{NotificationError, NotificationResult};
use crate::event::Event;
use crate::suppression::SuppressionTracker;
use crate::templates::EventTemplates;
use mailer::{Email, SendGridSender, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

/// Formats events into email notifications and dispatches them through a
/// pluggable sender, one event per call.
pub struct EmailNotifier {
    settings: NotifierSettings,
    host: HostInfo,
    templates: EventTemplates,
    sender: Arc<dyn Sender>,
    clock: Arc<dyn Clock>,
    suppressions: Mutex<SuppressionTracker>,
    sent_count: AtomicU64,
}

impl EmailNotifier {
    /// Wire the default SendGrid transport from the configured API key.
    pub fn new(settings: NotifierSettings, host: HostInfo) -> NotificationResult<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                NotificationError::Config("a SendGrid API key must be supplied".to_string())
            })?
            .to_string();

        let sender = Arc::new(SendGridSender::new(api_key, settings.sandbox_mode));
        Self::with_sender(settings, host, sender, Arc::new(SystemClock))
    }

    /// Use an injected transport and clock. The sender owns its own
    /// credentials on this path, so no API key is required here.
    pub fn with_sender(
        settings: NotifierSettings,
        host: HostInfo,
        sender: Arc<dyn Sender>,
        clock: Arc<dyn Clock>,
    ) -> NotificationResult<Self> {
        if settings.from.trim().is_empty() {
            return Err(NotificationError::Config(
                "a from address must be supplied".to_string(),
            ));
        }
        if settings.to.trim().is_empty() {
            return Err(NotificationError::Config(
                "a to address must be supplied".to_string(),
            ));
        }

        let templates = EventTemplates::compile(&settings)?;
        let suppressions = Mutex::new(SuppressionTracker::from_minutes(
            settings.suppression_minutes,
        ));

        Ok(Self {
            settings,
            host,
            templates,
            sender,
            clock,
            suppressions,
            sent_count: AtomicU64::new(0),
        })
    }

    /// Number of successful sends since this notifier was constructed.
    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::Relaxed)
    }

    /// Process one event: gate, render, assemble, dispatch.
    ///
    /// Suppressed events are silently dropped. A to-address template that
    /// evaluates to no recipients is a logged warning, not an error.
    /// Transport failures are captured in the send result and logged; the
    /// caller observes them only through [`sent_count`](Self::sent_count).
    pub async fn on_event(&self, event: &Event) -> NotificationResult<()> {
        if self.should_suppress(event) {
            debug!(event_type = event.event_type, "event suppressed within window");
            return Ok(());
        }

        let rendering_context = context::build_rendering_context(
            event,
            &self.host,
            self.settings.local_date_time_format(),
            self.settings.time_zone(),
        );

        let to = self.templates.render_to(&rendering_context)?;
        if to.split(',').all(|recipient| recipient.trim().is_empty()) {
            warn!("to-address template did not evaluate to one or more recipient addresses");
            return Ok(());
        }

        let subject = self.templates.render_subject(&rendering_context)?;
        let body = self.templates.render_body(&rendering_context)?;

        let mut email = Email::new(
            self.settings.from.trim(),
            self.settings.from_name.as_deref().unwrap_or_default().trim(),
        )
        .to(&to, self.settings.to_name.as_deref())
        .subject(subject)
        .body(body, true);

        if let Some(cc) = self.templates.render_cc(&rendering_context)? {
            if !cc.trim().is_empty() {
                email = email.cc(&cc, self.settings.cc_name.as_deref());
            }
        }

        let result = match self
            .settings
            .template_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
        {
            Some(template_id) => {
                let payload = context::build_provider_payload(
                    event,
                    &self.host,
                    self.settings.provider_date_time_format(),
                    self.settings.time_zone(),
                );
                match self.sender.as_template_sender() {
                    Some(sender) => sender.send_with_template(&email, template_id, &payload).await,
                    None => {
                        warn!(
                            template_id,
                            "configured sender cannot render provider templates; sending the rendered body instead"
                        );
                        self.sender.send(&email).await
                    }
                }
            }
            None => self.sender.send(&email).await,
        };

        if result.successful() {
            self.sent_count.fetch_add(1, Ordering::Relaxed);
        } else {
            error!(errors = ?result.error_messages, "notification send failed");
        }

        Ok(())
    }

    fn should_suppress(&self, event: &Event) -> bool {
        let now = self.clock.utc_now();
        // Single read-modify-write section; windows are keyed independently
        // but the backing map is shared.
        let mut suppressions = self
            .suppressions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        suppressions.should_suppress(event.event_type, now)
    }
}
