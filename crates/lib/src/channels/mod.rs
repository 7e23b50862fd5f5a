//! Messaging transport (WhatsApp via Twilio).
//!
//! Transport trait so dispatch can send outbound messages without knowing the
//! provider; the gateway constructs the Twilio implementation from config.

mod inbound;
mod twilio;

pub use inbound::InboundMessage;
pub use twilio::TwilioChannel;

use async_trait::async_trait;

/// Outbound message sender. `to` is a provider address like `whatsapp:+15550001111`.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), String>;
}
