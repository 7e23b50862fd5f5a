//! Gateway: the inbound webhook HTTP server.
//!
//! One port serves the provider webhook (form-encoded POST, TwiML answer) and a
//! health probe. All internal failures are absorbed; the provider always gets 200.

mod server;
mod twiml;

pub use server::{run_gateway, GatewayState};
pub use twiml::messaging_response;
