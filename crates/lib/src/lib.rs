//! Dentline core library — config, knowledge base, LLM client, Twilio channel,
//! triage, responders, practitioner relay, and the webhook gateway.

pub mod channels;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod init;
pub mod knowledge;
pub mod llm;
pub mod relay;
pub mod respond;
pub mod triage;
