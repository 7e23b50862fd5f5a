//! Responder strategies: produce the customer-facing reply text per category.
//!
//! Greeting and the two forwarding notices are fixed strings. Clinic-info and
//! general-health answers are generated; a failed call returns `Err` so the
//! caller substitutes the transient-error message instead of a fabricated answer.

use crate::llm::{LlmError, TextGenerator};

/// Fixed reply for the greeting category; no collaborator call.
pub const GREETING_REPLY: &str = "Hello! How can I help you today regarding the dental clinic?";

/// Customer-facing text for an escalated query.
pub const ESCALATION_NOTICE: &str = "Thank you for your query. I am forwarding this to the practitioner for a precise answer and will get back to you shortly.";

/// Customer-facing text when the classifier output was unrecognized.
pub const UNHANDLED_NOTICE: &str = "I'm sorry, I'm not sure how to handle that. I am forwarding your message to the clinic staff for assistance.";

/// Shown when a generated answer could not be produced.
pub const TRANSIENT_ERROR_REPLY: &str =
    "Sorry, I couldn't process that right now. Please try again in a moment.";

/// Disclaimer appended verbatim to every general-health answer, on its own line.
pub const HEALTH_DISCLAIMER: &str = "Please note, this is general information and not a substitute for a professional dental consultation. For specific advice, please consult with a dentist.";

fn clinic_info_prompt(query: &str, knowledge: &str) -> String {
    format!(
        r#"You are a friendly and professional AI assistant for a dental clinic.
Using ONLY the information from the knowledge base below, answer the customer's query.
--- KNOWLEDGE BASE START ---
{knowledge}
--- KNOWLEDGE BASE END ---

Customer Query: "{query}"
Your Answer:
"#
    )
}

fn general_health_prompt(query: &str) -> String {
    format!(
        r#"You are a helpful and knowledgeable dental assistant AI. Answer the following general dental health question in a clear and informative way. You are not a doctor, so keep the answer general.

Question: "{query}"
Answer:
"#
    )
}

/// Answer a clinic-info query grounded in the knowledge base. The prompt always
/// embeds the current knowledge value verbatim, sentinel included, so the model
/// cannot answer from anything else.
pub async fn clinic_info_answer(
    llm: &dyn TextGenerator,
    query: &str,
    knowledge: &str,
) -> Result<String, LlmError> {
    let answer = llm.generate(&clinic_info_prompt(query, knowledge)).await?;
    Ok(answer.trim().to_string())
}

/// Answer a general dental-health question. The fixed disclaimer is appended on
/// its own trailing line; if the model already produced a similar one, the
/// duplication is accepted.
pub async fn general_health_answer(
    llm: &dyn TextGenerator,
    query: &str,
) -> Result<String, LlmError> {
    let answer = llm.generate(&general_health_prompt(query)).await?;
    Ok(format!("{}\n{}", answer.trim(), HEALTH_DISCLAIMER))
}
