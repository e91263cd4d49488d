//! Save-to-disk sender
//!
//! Diagnostic fallback that serializes each message as a flat header+body
//! text file instead of touching the network. Any message content is
//! accepted; only filesystem problems can produce error messages.

use crate::address::Address;
use crate::email::Email;
use crate::models::SendResult;
use crate::sender::Sender;
use async_trait::async_trait;
use rand::Rng as _;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;

pub struct SaveToDiskSender {
    directory: PathBuf,
}

impl SaveToDiskSender {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn format_message(email: &Email) -> String {
        fn join(addresses: &[Address]) -> String {
            addresses
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        }

        let mut lines = String::new();
        let _ = writeln!(lines, "From: {}", email.from);
        let _ = writeln!(lines, "To: {}", join(&email.to));
        let _ = writeln!(lines, "Cc: {}", join(&email.cc));
        let _ = writeln!(lines, "Bcc: {}", join(&email.bcc));
        let _ = writeln!(lines, "ReplyTo: {}", join(&email.reply_to));
        let _ = writeln!(lines, "Subject: {}", email.subject);
        for (name, value) in &email.headers {
            let _ = writeln!(lines, "{name}:{value}");
        }
        let _ = writeln!(lines);
        lines.push_str(&email.body);
        lines
    }
}

#[async_trait]
impl Sender for SaveToDiskSender {
    async fn send(&self, email: &Email) -> SendResult {
        let filename = format!(
            "{}_{}",
            chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"),
            rand::rng().random_range(0..1000)
        );
        let path = self.directory.join(filename);

        match tokio::fs::write(&path, Self::format_message(email)).await {
            Ok(()) => {
                debug!(path = %path.display(), "message saved to disk");
                SendResult::default()
            }
            Err(e) => SendResult::failure(format!(
                "failed to write message to {}: {e}",
                path.display()
            )),
        }
    }
}
