//! Transport-neutral email model with pluggable delivery
//!
//! This library separates *what* a message is from *how* it leaves the
//! system. Messages are assembled once with the [`Email`] builder and handed
//! to a [`Sender`]; the result of every attempt is reported through
//! [`SendResult`] rather than an error path, so callers decide what a failed
//! delivery means to them.
//!
//! ## Components
//!
//! - **Addressing**: [`Address`] and [`parse_address_list`] for
//!   semicolon-separated recipient/name strings
//! - **Message model**: [`Email`], [`Attachment`], [`Priority`]
//! - **Delivery**: the [`Sender`] contract, with the optional
//!   [`TemplateSender`] capability for provider-side template rendering
//! - **Senders**: [`SendGridSender`] (HTTP API), [`SaveToDiskSender`]
//!   (diagnostic fallback), and [`MockSender`] (capturing, for tests)

pub mod address;
pub mod email;
pub mod models;
pub mod sender;
pub mod senders;

pub use address::{parse_address_list, Address};
pub use email::Email;
pub use models::{Attachment, Priority, SendResult};
pub use sender::{Sender, TemplateSender};
pub use senders::{MockSender, SaveToDiskSender, SendGridSender, SentMessage};
