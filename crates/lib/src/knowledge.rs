//! Knowledge base loader: clinic facts read once at startup.
//!
//! The knowledge base is an opaque text blob shared read-only by the triage
//! prompt and the clinic-info responder. A missing file is not fatal; a
//! sentinel placeholder is substituted so answers degrade instead of crashing.

use std::path::Path;

/// Placeholder used when the knowledge base file cannot be read.
pub const KNOWLEDGE_SENTINEL: &str = "No knowledge base found.";

/// Read the knowledge base file. Any read failure substitutes the sentinel.
pub fn load_knowledge(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log::warn!(
                "knowledge base not readable at {} ({}), using placeholder",
                path.display(),
                e
            );
            KNOWLEDGE_SENTINEL.to_string()
        }
    }
}
