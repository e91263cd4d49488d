//! The delivery contract

use crate::email::Email;
use crate::models::SendResult;
use async_trait::async_trait;
use serde_json::Value;

/// Pluggable transport for assembled messages.
///
/// Implementations report every outcome through [`SendResult`]; transport
/// and provider failures are captured in `error_messages`, never raised.
/// Cancellation follows the usual async rule: dropping the future abandons
/// the send. No implementation retries.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Dispatch a message.
    async fn send(&self, email: &Email) -> SendResult;

    /// Blocking convenience wrapper around [`send`](Sender::send).
    ///
    /// Spins a throwaway current-thread runtime, so it must not be called
    /// from within an async context.
    fn send_blocking(&self, email: &Email) -> SendResult {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(self.send(email)),
            Err(e) => SendResult::failure(format!("failed to start blocking runtime: {e}")),
        }
    }

    /// Senders that can delegate rendering to a provider-side template
    /// expose that capability here; callers check before using it.
    fn as_template_sender(&self) -> Option<&dyn TemplateSender> {
        None
    }
}

/// Optional capability: send a message rendered server-side from a
/// provider template, given the template id and its payload. The message's
/// literal body is omitted on this path.
#[async_trait]
pub trait TemplateSender: Sender {
    async fn send_with_template(
        &self,
        email: &Email,
        template_id: &str,
        data: &Value,
    ) -> SendResult;
}
