//! Sender implementations

pub mod mock;
pub mod save_to_disk;
pub mod sendgrid;

pub use mock::{MockSender, SentMessage};
pub use save_to_disk::SaveToDiskSender;
pub use sendgrid::SendGridSender;
