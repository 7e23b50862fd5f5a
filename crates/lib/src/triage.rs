//! Triage classifier: map a customer query to a coarse intent category.
//!
//! One generative call per query, with a fixed fast path for common greetings so
//! they never cost an API call. A collaborator failure never surfaces: the query
//! is escalated instead of dropped.

use crate::llm::TextGenerator;

/// Fixed allow-list of greetings/closings that skip the generative call.
const GREETING_FAST_PATH: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hlo",
    "good morning",
    "good evening",
    "ok",
    "thank you",
    "thanks",
];

/// Intent category produced by triage and consumed once to pick a responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Greeting,
    ClinicInfo,
    GeneralHealth,
    Escalate,
    /// Classifier output that matched no known token. Kept verbatim rather than
    /// coerced; dispatch applies the unhandled fallback.
    Unrecognized(String),
}

impl Category {
    /// Total mapping from raw classifier output: trim, uppercase, match the
    /// known set. Anything else becomes `Unrecognized`.
    pub fn parse(raw: &str) -> Category {
        let tag = raw.trim().to_uppercase();
        match tag.as_str() {
            "GREETING" => Category::Greeting,
            "CLINIC_INFO" => Category::ClinicInfo,
            "GENERAL_HEALTH" => Category::GeneralHealth,
            "ESCALATE" => Category::Escalate,
            _ => Category::Unrecognized(tag),
        }
    }
}

/// True when the body is on the greeting fast-path list (case-insensitive exact match).
pub fn is_fast_path_greeting(body: &str) -> bool {
    let b = body.trim().to_lowercase();
    GREETING_FAST_PATH.iter().any(|g| *g == b)
}

/// Triage prompt: embeds the knowledge base verbatim plus worked examples that
/// disambiguate the edge cases (pricing and symptoms always escalate).
fn triage_prompt(query: &str, knowledge: &str) -> String {
    format!(
        r#"You are a highly intelligent triage assistant for a dental clinic's WhatsApp bot. Your job is to categorize the user's query into one of four types.

Here is the clinic's internal knowledge base for reference:
--- KNOWLEDGE BASE START ---
{knowledge}
--- KNOWLEDGE BASE END ---

Analyze the user's query: "{query}"

Categorize it into one of the following types. Respond with ONLY the category name:
1.  **GREETING**: If the query is a simple greeting like "hello", "hi", "good morning", or a simple closing like "thank you", "ok".
2.  **CLINIC_INFO**: If the query is asking for specific information found in the knowledge base (e.g., "what are your hours?", "where are you located?", "do you do root canals?").
3.  **GENERAL_HEALTH**: If the query is a general dental health question that is NOT about a specific person's pain, symptoms, or ongoing treatment (e.g., "what is the best way to whiten teeth?", "how often should I floss?").
4.  **ESCALATE**: If the query mentions specific pain, symptoms, a problem with an ongoing treatment, asks for a price for a procedure, seems like an emergency, or is about a specific patient's case. Anything that requires a doctor's personal attention.

Examples:
- "hi": GREETING
- "what time do you close?": CLINIC_INFO
- "is it better to use an electric or manual toothbrush?": GENERAL_HEALTH
- "my tooth is hurting a lot since yesterday": ESCALATE
- "how much for a dental implant?": ESCALATE

Query: "{query}"
Category:
"#
    )
}

/// Classify a customer query. The fast path answers common greetings without a
/// generative call; any collaborator failure resolves to `Escalate` so a query
/// is never silently dropped.
pub async fn classify(llm: &dyn TextGenerator, query: &str, knowledge: &str) -> Category {
    if is_fast_path_greeting(query) {
        log::info!("triage: GREETING (fast path)");
        return Category::Greeting;
    }
    match llm.generate(&triage_prompt(query, knowledge)).await {
        Ok(raw) => {
            let category = Category::parse(&raw);
            log::info!("triage: {:?} for query {:?}", category, query);
            category
        }
        Err(e) => {
            log::warn!("triage failed ({}), escalating", e);
            Category::Escalate
        }
    }
}
