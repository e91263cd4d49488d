//! End-to-end pipeline tests against a capturing transport.

use chrono::{DateTime, Duration, TimeZone, Utc};
use email_alerts::{
    Clock, EmailNotifier, Event, HostInfo, Level, NotificationError, NotifierSettings,
};
use mailer::MockSender;
use std::sync::{Arc, Mutex};

/// Manually advanced clock, injected so suppression windows are
/// deterministic.
struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += duration;
    }
}

impl Clock for ManualClock {
    fn utc_now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 3, 1, 17, 30, 11).unwrap()
}

fn settings() -> NotifierSettings {
    NotifierSettings {
        from: "alerts@example.com".to_string(),
        from_name: Some("Alerts".to_string()),
        to: "ops@example.com".to_string(),
        ..Default::default()
    }
}

fn host() -> HostInfo {
    HostInfo::new("test-instance", "https://logs.example.com/")
}

fn fatal_event(event_type: u32) -> Event {
    Event::new(
        "event-1",
        event_type,
        start(),
        Level::Fatal,
        "Everything failed",
    )
}

fn notifier(
    settings: NotifierSettings,
    sender: Arc<MockSender>,
    clock: Arc<ManualClock>,
) -> EmailNotifier {
    EmailNotifier::with_sender(settings, host(), sender, clock).unwrap()
}

#[tokio::test]
async fn events_are_suppressed_within_the_window() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let mut s = settings();
    s.suppression_minutes = 10;
    let notifier = notifier(s, sender.clone(), clock.clone());

    notifier.on_event(&fatal_event(99)).await.unwrap();
    clock.advance(Duration::minutes(1));
    notifier.on_event(&fatal_event(99)).await.unwrap();
    notifier.on_event(&fatal_event(99)).await.unwrap();

    assert_eq!(notifier.sent_count(), 1);
    assert_eq!(sender.sent_count().await, 1);

    // Advancing past the window reopens it.
    clock.advance(Duration::hours(1));
    notifier.on_event(&fatal_event(99)).await.unwrap();
    assert_eq!(notifier.sent_count(), 2);
}

#[tokio::test]
async fn suppression_windows_are_independent_per_event_type() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let mut s = settings();
    s.suppression_minutes = 10;
    let notifier = notifier(s, sender.clone(), clock);

    notifier.on_event(&fatal_event(1)).await.unwrap();
    notifier.on_event(&fatal_event(2)).await.unwrap();
    notifier.on_event(&fatal_event(1)).await.unwrap();

    assert_eq!(notifier.sent_count(), 2);
}

#[tokio::test]
async fn zero_window_never_suppresses() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let notifier = notifier(settings(), sender.clone(), clock);

    notifier.on_event(&fatal_event(99)).await.unwrap();
    notifier.on_event(&fatal_event(99)).await.unwrap();

    assert_eq!(notifier.sent_count(), 2);
}

#[tokio::test]
async fn to_addresses_are_templated_from_event_properties() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let mut s = settings();
    s.to = "{{Name}}@example.com".to_string();
    let notifier = notifier(s, sender.clone(), clock);

    let event = fatal_event(99).with_property("Name", "oncall");
    notifier.on_event(&event).await.unwrap();

    assert!(sender.was_sent_to("oncall@example.com").await);
}

#[tokio::test]
async fn semicolon_recipients_pair_with_names() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let mut s = settings();
    s.to = "a@x.com;b@y.com".to_string();
    s.to_name = Some("A;B".to_string());
    let notifier = notifier(s, sender.clone(), clock);

    notifier.on_event(&fatal_event(99)).await.unwrap();

    let sent = sender.sent().await;
    let to = &sent[0].email.to;
    assert_eq!(to.len(), 2);
    assert_eq!(to[0].email_address, "a@x.com");
    assert_eq!(to[0].name, "A");
    assert_eq!(to[1].email_address, "b@y.com");
    assert_eq!(to[1].name, "B");
}

#[tokio::test]
async fn empty_to_template_skips_the_send_without_error() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let mut s = settings();
    s.to = "{{Missing}}".to_string();
    let notifier = notifier(s, sender.clone(), clock);

    notifier.on_event(&fatal_event(99)).await.unwrap();

    assert_eq!(notifier.sent_count(), 0);
    assert_eq!(sender.sent_count().await, 0);
}

#[tokio::test]
async fn rendered_subject_and_html_body_reach_the_sender() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let notifier = notifier(settings(), sender.clone(), clock);

    notifier.on_event(&fatal_event(99)).await.unwrap();

    let sent = sender.sent().await;
    let email = &sent[0].email;
    assert_eq!(email.subject, "[Fatal] Everything failed");
    assert!(email.is_html);
    assert!(email.body.contains("Everything failed"));
    assert_eq!(email.from.email_address, "alerts@example.com");
    assert_eq!(email.from.name, "Alerts");
}

#[tokio::test]
async fn cc_addresses_are_rendered_and_paired() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let mut s = settings();
    s.cc = Some("audit@example.com;{{Team}}@example.com".to_string());
    s.cc_name = Some("Audit;Team".to_string());
    let notifier = notifier(s, sender.clone(), clock);

    let event = fatal_event(99).with_property("Team", "platform");
    notifier.on_event(&event).await.unwrap();

    let sent = sender.sent().await;
    let cc = &sent[0].email.cc;
    assert_eq!(cc.len(), 2);
    assert_eq!(cc[0].email_address, "audit@example.com");
    assert_eq!(cc[1].email_address, "platform@example.com");
    assert_eq!(cc[1].name, "Team");
}

#[tokio::test]
async fn template_id_sends_carry_the_provider_payload() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let mut s = settings();
    s.template_id = Some("d-12345".to_string());
    let notifier = notifier(s, sender.clone(), clock);

    let event = fatal_event(99).with_property("What", 10);
    notifier.on_event(&event).await.unwrap();

    let sent = sender.sent().await;
    assert_eq!(sent[0].template_id.as_deref(), Some("d-12345"));

    let data = sent[0].template_data.as_ref().unwrap();
    assert_eq!(data["Level"], "Fatal");
    assert_eq!(data["EventType"], "$00000063");
    assert_eq!(data["What"], 10);
    assert!(data.get("$Level").is_none());
}

#[tokio::test]
async fn template_capability_falls_back_to_a_literal_send() {
    let sender = Arc::new(MockSender::without_template_capability());
    let clock = Arc::new(ManualClock::starting_at(start()));
    let mut s = settings();
    s.template_id = Some("d-12345".to_string());
    let notifier = notifier(s, sender.clone(), clock);

    notifier.on_event(&fatal_event(99)).await.unwrap();

    let sent = sender.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].template_id.is_none());
    assert_eq!(notifier.sent_count(), 1);
}

#[tokio::test]
async fn failed_sends_are_not_counted() {
    let sender = Arc::new(MockSender::failing("provider down"));
    let clock = Arc::new(ManualClock::starting_at(start()));
    let notifier = notifier(settings(), sender.clone(), clock);

    notifier.on_event(&fatal_event(99)).await.unwrap();

    assert_eq!(notifier.sent_count(), 0);
}

#[tokio::test]
async fn missing_required_configuration_is_rejected_up_front() {
    let sender = Arc::new(MockSender::new());
    let clock = Arc::new(ManualClock::starting_at(start()));

    let mut s = settings();
    s.from = String::new();
    let result = EmailNotifier::with_sender(s, host(), sender.clone(), clock.clone());
    assert!(matches!(result, Err(NotificationError::Config(_))));

    let mut s = settings();
    s.to = "  ".to_string();
    let result = EmailNotifier::with_sender(s, host(), sender, clock);
    assert!(matches!(result, Err(NotificationError::Config(_))));

    // The SendGrid-wiring constructor additionally requires an API key.
    let result = EmailNotifier::new(settings(), host());
    assert!(matches!(result, Err(NotificationError::Config(_))));
}
