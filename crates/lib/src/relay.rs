//! Practitioner reverse-channel: escalation notes out, "Reply to" commands back.
//!
//! The command prefix the parser matches and the hint embedded in every
//! escalation note are the same literal. The two directions form a textual
//! protocol; change one and the other breaks.

use crate::channels::MessageTransport;
use crate::llm::TextGenerator;

/// Command prefix a practitioner message must start with (matched case-insensitively).
pub const REPLY_COMMAND_PREFIX: &str = "reply to";

/// Reply-syntax hint included in every escalation note. A body built as
/// `hint + instruction` must parse via `parse_command`.
pub fn reply_command_hint(customer: &str) -> String {
    format!("Reply to {}: ", customer)
}

fn forward_note(header: &str, customer: &str, query: &str) -> String {
    format!(
        "--- {} ---\nFrom: {}\nQuery: {}\n\nTo respond, start your message with: '{}'",
        header,
        customer,
        query,
        reply_command_hint(customer)
    )
}

/// Note sent to the practitioner for an escalated query.
pub fn escalation_note(customer: &str, query: &str) -> String {
    forward_note("NEW CUSTOMER QUERY", customer, query)
}

/// Note sent to the practitioner when the classifier output was unrecognized.
pub fn unhandled_note(customer: &str, query: &str) -> String {
    forward_note("UNHANDLED QUERY", customer, query)
}

/// Best-effort send to the practitioner: a transport failure is logged and
/// swallowed, never retried, and never blocks the customer-facing reply.
async fn send_note(transport: &dyn MessageTransport, practitioner: &str, note: &str) {
    if let Err(e) = transport.send(practitioner, note).await {
        log::warn!("escalation send to practitioner failed: {}", e);
    }
}

/// Forward an escalated query to the practitioner.
pub async fn escalate(
    transport: &dyn MessageTransport,
    practitioner: &str,
    customer: &str,
    query: &str,
) {
    send_note(transport, practitioner, &escalation_note(customer, query)).await;
}

/// Forward a query whose classification was unrecognized to the practitioner.
pub async fn escalate_unhandled(
    transport: &dyn MessageTransport,
    practitioner: &str,
    customer: &str,
    query: &str,
) {
    send_note(transport, practitioner, &unhandled_note(customer, query)).await;
}

/// A parsed practitioner relay command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PractitionerCommand {
    /// Target customer address ("scheme:number").
    pub target: String,
    pub instruction: String,
}

/// True when the message is a practitioner command attempt: practitioner sender
/// (exact match, and a configured one) plus the command prefix. Command-shaped
/// bodies from anyone else stay ordinary customer queries.
pub fn is_command_attempt(practitioner: &str, from: &str, body: &str) -> bool {
    !practitioner.is_empty()
        && from == practitioner
        && body.trim().to_lowercase().starts_with(REPLY_COMMAND_PREFIX)
}

/// Parse a practitioner command, or `None` when the message is not a command or
/// is malformed (malformed commands are logged and otherwise a silent no-op).
///
/// The remainder after the prefix splits on colons into exactly three segments:
/// scheme, number, instruction. The first two rejoin as the target address.
/// Assumes a target address contains exactly one colon (the scheme marker).
pub fn parse_command(practitioner: &str, from: &str, body: &str) -> Option<PractitionerCommand> {
    if !is_command_attempt(practitioner, from, body) {
        return None;
    }
    let rest = body.trim()[REPLY_COMMAND_PREFIX.len()..].trim();
    let segments: Vec<&str> = rest.splitn(3, ':').collect();
    let [scheme, number, instruction] = segments.as_slice() else {
        log::warn!("practitioner command malformed (expected 'Reply to scheme:number: text'), ignoring");
        return None;
    };
    let scheme = scheme.trim();
    let number = number.trim();
    let instruction = instruction.trim();
    if scheme.is_empty() || number.is_empty() || instruction.is_empty() {
        log::warn!("practitioner command has empty segments, ignoring");
        return None;
    }
    Some(PractitionerCommand {
        target: format!("{}:{}", scheme, number),
        instruction: instruction.to_string(),
    })
}

/// Fallback wrapper used when rephrasing fails.
pub fn plain_update(instruction: &str) -> String {
    format!("An update from the clinic:\n\n{}", instruction)
}

fn rephrase_prompt(instruction: &str) -> String {
    format!(
        r#"You are relaying a dentist's note to their patient over WhatsApp. Rewrite the note below as a complete, polite message to the patient. Keep the meaning exactly; do not add medical advice of your own. Respond with ONLY the message text.

Note: "{instruction}"
Message:
"#
    )
}

/// Relay a parsed practitioner command to the target customer.
///
/// The instruction is rephrased into a complete, polite message; when that call
/// fails the fixed template wrapper is sent instead so the update is never lost.
/// Exactly one outbound message goes to the target; nothing is echoed back on
/// the practitioner's own channel.
pub async fn relay_command(
    llm: &dyn TextGenerator,
    transport: &dyn MessageTransport,
    command: &PractitionerCommand,
) {
    let message = match llm.generate(&rephrase_prompt(&command.instruction)).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => plain_update(&command.instruction),
        Err(e) => {
            log::warn!("rephrase failed ({}), sending plain update", e);
            plain_update(&command.instruction)
        }
    };
    if let Err(e) = transport.send(&command.target, &message).await {
        log::warn!("relay to {} failed: {}", command.target, e);
    }
}
