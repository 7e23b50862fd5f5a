//! Inbound message from the provider webhook: sender address and text body.

/// A message delivered by the messaging provider's webhook. Built per request,
/// never persisted.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Sender address, format "<scheme>:<number>" (e.g. "whatsapp:+15550001111").
    pub from: String,
    pub body: String,
}
