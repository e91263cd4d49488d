//! Capturing sender for tests

use crate::email::Email;
use crate::models::SendResult;
use crate::sender::{Sender, TemplateSender};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

/// A message captured by [`MockSender`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub email: Email,
    pub template_id: Option<String>,
    pub template_data: Option<Value>,
}

/// Mock sender that records every dispatched message for assertions.
pub struct MockSender {
    sent: Mutex<Vec<SentMessage>>,
    should_fail: bool,
    failure_message: Option<String>,
    template_capable: bool,
}

impl MockSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            should_fail: false,
            failure_message: None,
            template_capable: true,
        }
    }

    /// A sender whose every attempt fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            failure_message: Some(message.into()),
            ..Self::new()
        }
    }

    /// A sender that does not expose the template-send capability, for
    /// exercising caller fallback paths.
    pub fn without_template_capability() -> Self {
        Self {
            template_capable: false,
            ..Self::new()
        }
    }

    /// All captured messages, in send order.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn was_sent_to(&self, email_address: &str) -> bool {
        self.sent
            .lock()
            .await
            .iter()
            .any(|m| m.email.to.iter().any(|a| a.email_address == email_address))
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }

    async fn record(&self, message: SentMessage) -> SendResult {
        if self.should_fail {
            return SendResult::failure(
                self.failure_message
                    .clone()
                    .unwrap_or_else(|| "mock failure".to_string()),
            );
        }

        let mut sent = self.sent.lock().await;
        sent.push(message);
        SendResult {
            message_id: Some(format!("mock-{}", sent.len())),
            error_messages: Vec::new(),
        }
    }
}

impl Default for MockSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sender for MockSender {
    async fn send(&self, email: &Email) -> SendResult {
        self.record(SentMessage {
            email: email.clone(),
            template_id: None,
            template_data: None,
        })
        .await
    }

    fn as_template_sender(&self) -> Option<&dyn TemplateSender> {
        self.template_capable.then_some(self)
    }
}

#[async_trait]
impl TemplateSender for MockSender {
    async fn send_with_template(
        &self,
        email: &Email,
        template_id: &str,
        data: &Value,
    ) -> SendResult {
        self.record(SentMessage {
            email: email.clone(),
            template_id: Some(template_id.to_string()),
            template_data: Some(data.clone()),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_sent_messages() {
        let sender = MockSender::new();
        let email = Email::new("alerts@example.com", "").to("ops@example.com", None);

        let result = sender.send(&email).await;
        assert!(result.successful());
        assert_eq!(sender.sent_count().await, 1);
        assert!(sender.was_sent_to("ops@example.com").await);
        assert!(!sender.was_sent_to("other@example.com").await);
    }

    #[tokio::test]
    async fn failing_sender_reports_errors() {
        let sender = MockSender::failing("simulated failure");
        let email = Email::new("alerts@example.com", "").to("ops@example.com", None);

        let result = sender.send(&email).await;
        assert!(!result.successful());
        assert_eq!(result.error_messages, vec!["simulated failure".to_string()]);
        assert_eq!(sender.sent_count().await, 0);
    }

    #[tokio::test]
    async fn records_template_payloads() {
        let sender = MockSender::new();
        let email = Email::new("alerts@example.com", "").to("ops@example.com", None);
        let data = serde_json::json!({ "Level": "Fatal" });

        let template_sender = sender.as_template_sender().unwrap();
        template_sender
            .send_with_template(&email, "d-123", &data)
            .await;

        let sent = sender.sent().await;
        assert_eq!(sent[0].template_id.as_deref(), Some("d-123"));
        assert_eq!(sent[0].template_data.as_ref().unwrap()["Level"], "Fatal");
    }

    #[test]
    fn capability_can_be_withheld() {
        let sender = MockSender::without_template_capability();
        assert!(sender.as_template_sender().is_none());
    }
}
