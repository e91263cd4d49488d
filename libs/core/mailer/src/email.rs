//! The `Email` builder

use crate::address::{parse_address_list, Address};
use crate::models::{Attachment, Priority};
use serde::{Deserialize, Serialize};

/// A transport-neutral email message, built once per send and discarded
/// after dispatch.
///
/// Recipient-list mutators accept the same semicolon-separated string form
/// as [`parse_address_list`], pairing positionally with an optional name
/// string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub from: Address,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub reply_to: Vec<Address>,
    pub subject: String,
    pub body: String,
    /// Alternative `text/plain` rendering sent alongside an HTML body.
    pub plaintext_alternative_body: Option<String>,
    pub is_html: bool,
    pub priority: Priority,
    pub tags: Vec<String>,
    /// Custom headers in insertion order.
    pub headers: Vec<(String, String)>,
    pub attachments: Vec<Attachment>,
}

impl Email {
    /// Start a message from the given sender address.
    pub fn new(from: impl Into<String>, from_name: impl Into<String>) -> Self {
        Self {
            from: Address::new(from, from_name),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
            subject: String::new(),
            body: String::new(),
            plaintext_alternative_body: None,
            is_html: false,
            priority: Priority::Normal,
            tags: Vec::new(),
            headers: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn to(mut self, addresses: &str, names: Option<&str>) -> Self {
        self.to.extend(parse_address_list(addresses, names));
        self
    }

    pub fn to_address(mut self, address: Address) -> Self {
        self.to.push(address);
        self
    }

    pub fn cc(mut self, addresses: &str, names: Option<&str>) -> Self {
        self.cc.extend(parse_address_list(addresses, names));
        self
    }

    pub fn bcc(mut self, addresses: &str, names: Option<&str>) -> Self {
        self.bcc.extend(parse_address_list(addresses, names));
        self
    }

    pub fn reply_to(mut self, addresses: &str, names: Option<&str>) -> Self {
        self.reply_to.extend(parse_address_list(addresses, names));
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>, is_html: bool) -> Self {
        self.body = body.into();
        self.is_html = is_html;
        self
    }

    pub fn plaintext_alternative(mut self, body: impl Into<String>) -> Self {
        self.plaintext_alternative_body = Some(body.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn high_priority(self) -> Self {
        self.priority(Priority::High)
    }

    pub fn low_priority(self) -> Self {
        self.priority(Priority::Low)
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append an attachment unless an equal one is already present.
    pub fn attach(mut self, attachment: Attachment) -> Self {
        if !self.attachments.contains(&attachment) {
            self.attachments.push(attachment);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str) -> Attachment {
        Attachment {
            filename: name.to_string(),
            data: vec![1, 2, 3],
            content_type: "text/plain".to_string(),
            is_inline: false,
            content_id: None,
        }
    }

    #[test]
    fn builder_assembles_message() {
        let email = Email::new("alerts@example.com", "Alerts")
            .to("a@x.com;b@y.com", Some("A;B"))
            .cc("c@z.com", None)
            .subject("Subject")
            .body("<p>hi</p>", true)
            .high_priority()
            .tag("alerts")
            .header("X-Env", "test");

        assert_eq!(email.from, Address::new("alerts@example.com", "Alerts"));
        assert_eq!(
            email.to,
            vec![Address::new("a@x.com", "A"), Address::new("b@y.com", "B")]
        );
        assert_eq!(email.cc, vec![Address::new("c@z.com", "")]);
        assert_eq!(email.subject, "Subject");
        assert!(email.is_html);
        assert_eq!(email.priority, Priority::High);
        assert_eq!(email.tags, vec!["alerts".to_string()]);
        assert_eq!(
            email.headers,
            vec![("X-Env".to_string(), "test".to_string())]
        );
    }

    #[test]
    fn equal_attachments_are_deduplicated() {
        let email = Email::new("alerts@example.com", "")
            .attach(attachment("report.txt"))
            .attach(attachment("report.txt"))
            .attach(attachment("other.txt"));

        assert_eq!(email.attachments.len(), 2);
    }

    #[test]
    fn recipient_order_is_preserved() {
        let email = Email::new("alerts@example.com", "")
            .to("z@x.com", None)
            .to("a@x.com", None);

        let addresses: Vec<&str> = email
            .to
            .iter()
            .map(|a| a.email_address.as_str())
            .collect();
        assert_eq!(addresses, vec!["z@x.com", "a@x.com"]);
    }
}
