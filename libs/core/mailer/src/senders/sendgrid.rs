//! SendGrid HTTP sender
//!
//! Translates the transport-neutral [`Email`] into SendGrid v3 mail-send
//! API calls and parses the provider's response into a uniform
//! [`SendResult`]. Success or failure is determined purely by the HTTP
//! status class.

use crate::address::Address;
use crate::email::Email;
use crate::models::{Priority, SendResult};
use crate::sender::{Sender, TemplateSender};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use eyre::{eyre, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

/// SendGrid transactional mail endpoint
const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Sends messages through the SendGrid HTTP API.
pub struct SendGridSender {
    api_key: String,
    sandbox_mode: bool,
    client: Client,
}

impl SendGridSender {
    pub fn new(api_key: impl Into<String>, sandbox_mode: bool) -> Self {
        Self {
            api_key: api_key.into(),
            sandbox_mode,
            client: Client::new(),
        }
    }

    /// Create from environment variables.
    ///
    /// Expects `SENDGRID_API_KEY`; `SENDGRID_SANDBOX` may be set to `true`
    /// to validate requests without delivering them.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("SENDGRID_API_KEY").map_err(|_| eyre!("SENDGRID_API_KEY not set"))?;

        let sandbox_mode = std::env::var("SENDGRID_SANDBOX")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self::new(api_key, sandbox_mode))
    }

    fn build_request(&self, email: &Email, template: Option<(&str, &Value)>) -> SendGridRequest {
        // Template sends omit the literal content; the provider renders
        // server-side from the personalization's dynamic data.
        let mut content = Vec::new();
        if template.is_none() {
            if let Some(text) = &email.plaintext_alternative_body {
                content.push(Content::text(text));
            } else if !email.is_html {
                content.push(Content::text(&email.body));
            }
            if email.is_html {
                content.push(Content::html(&email.body));
            }
        }

        let mut headers: Vec<(String, String)> = email.headers.clone();
        headers.extend(priority_headers(email.priority));

        let attachments: Vec<SendGridAttachment> = email
            .attachments
            .iter()
            .map(|a| SendGridAttachment {
                content: BASE64.encode(&a.data),
                filename: a.filename.clone(),
                content_type: a.content_type.clone(),
                disposition: a.is_inline.then(|| "inline".to_string()),
                content_id: a.content_id.clone(),
            })
            .collect();

        SendGridRequest {
            personalizations: vec![Personalization {
                to: non_blank(&email.to),
                cc: non_blank(&email.cc),
                bcc: non_blank(&email.bcc),
                dynamic_template_data: template.map(|(_, data)| data.clone()),
            }],
            from: EmailAddress::from(&email.from),
            // SendGrid accepts a single reply-to address
            reply_to: email
                .reply_to
                .iter()
                .find(|a| !a.email_address.trim().is_empty())
                .map(EmailAddress::from),
            subject: email.subject.clone(),
            content,
            template_id: template.map(|(id, _)| id.to_string()),
            categories: (!email.tags.is_empty()).then(|| email.tags.clone()),
            headers: (!headers.is_empty()).then(|| {
                headers
                    .into_iter()
                    .map(|(name, value)| (name, Value::String(value)))
                    .collect()
            }),
            attachments: (!attachments.is_empty()).then_some(attachments),
            mail_settings: self.sandbox_mode.then(|| MailSettings {
                sandbox_mode: Toggle { enable: true },
            }),
        }
    }

    async fn dispatch(&self, request: &SendGridRequest) -> SendResult {
        debug!(subject = %request.subject, "dispatching message to SendGrid");

        let response = match self
            .client
            .post(SENDGRID_API_URL)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "SendGrid request failed");
                return SendResult::failure(format!("SendGrid request failed: {e}"));
            }
        };

        let status = response.status();
        let mut result = SendResult {
            message_id: response
                .headers()
                .get("X-Message-Id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            error_messages: Vec::new(),
        };

        if status.is_success() {
            debug!(message_id = ?result.message_id, "message accepted by SendGrid");
            return result;
        }

        result.error_messages.push(status.to_string());

        let body = response.text().await.unwrap_or_default();
        if let Ok(parsed) = serde_json::from_str::<Value>(&body) {
            if let Some(errors) = parsed.get("errors").and_then(Value::as_array) {
                for error in errors {
                    result.error_messages.push(match error {
                        Value::String(message) => message.clone(),
                        other => other.to_string(),
                    });
                }
            }
        }

        error!(status = %status, errors = ?result.error_messages, "SendGrid rejected the message");
        result
    }
}

/// Conventional priority header pairs; `Normal` adds nothing.
fn priority_headers(priority: Priority) -> Vec<(String, String)> {
    let pairs: &[(&str, &str)] = match priority {
        Priority::High => &[
            ("Priority", "Urgent"),
            ("Importance", "High"),
            ("X-Priority", "1"),
            ("X-MSMail-Priority", "High"),
        ],
        Priority::Low => &[
            ("Priority", "Non-Urgent"),
            ("Importance", "Low"),
            ("X-Priority", "5"),
            ("X-MSMail-Priority", "Low"),
        ],
        Priority::Normal => &[],
    };

    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn non_blank(addresses: &[Address]) -> Vec<EmailAddress> {
    addresses
        .iter()
        .filter(|a| !a.email_address.trim().is_empty())
        .map(EmailAddress::from)
        .collect()
}

/// SendGrid API request payload
#[derive(Debug, Serialize)]
struct SendGridRequest {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<EmailAddress>,
    subject: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    content: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<SendGridAttachment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mail_settings: Option<MailSettings>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<EmailAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<EmailAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dynamic_template_data: Option<Value>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl From<&Address> for EmailAddress {
    fn from(address: &Address) -> Self {
        Self {
            email: address.email_address.clone(),
            name: (!address.name.is_empty()).then(|| address.name.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

impl Content {
    fn text(value: &str) -> Self {
        Self {
            content_type: "text/plain".to_string(),
            value: value.to_string(),
        }
    }

    fn html(value: &str) -> Self {
        Self {
            content_type: "text/html".to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendGridAttachment {
    content: String,
    filename: String,
    #[serde(rename = "type")]
    content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct MailSettings {
    sandbox_mode: Toggle,
}

#[derive(Debug, Serialize)]
struct Toggle {
    enable: bool,
}

#[async_trait]
impl Sender for SendGridSender {
    async fn send(&self, email: &Email) -> SendResult {
        let request = self.build_request(email, None);
        self.dispatch(&request).await
    }

    fn as_template_sender(&self) -> Option<&dyn TemplateSender> {
        Some(self)
    }
}

#[async_trait]
impl TemplateSender for SendGridSender {
    async fn send_with_template(
        &self,
        email: &Email,
        template_id: &str,
        data: &Value,
    ) -> SendResult {
        let request = self.build_request(email, Some((template_id, data)));
        self.dispatch(&request).await
    }
}
