//! Dispatch entrypoint: practitioner command or customer query, one reply out.

use crate::channels::MessageTransport;
use crate::llm::TextGenerator;
use crate::relay;
use crate::respond;
use crate::triage::{self, Category};
use std::sync::Arc;

/// Immutable per-process context for handling inbound messages. Built once at
/// startup and shared across requests; no globals, no cross-request state.
pub struct Dispatcher {
    practitioner_address: String,
    knowledge: String,
    llm: Arc<dyn TextGenerator>,
    transport: Arc<dyn MessageTransport>,
}

impl Dispatcher {
    pub fn new(
        practitioner_address: String,
        knowledge: String,
        llm: Arc<dyn TextGenerator>,
        transport: Arc<dyn MessageTransport>,
    ) -> Self {
        Self {
            practitioner_address,
            knowledge,
            llm,
            transport,
        }
    }

    /// Handle one inbound message. Returns the text to send back to the
    /// immediate sender, or `None` when the webhook reply must be empty
    /// (practitioner commands are never echoed back, well-formed or not).
    ///
    /// No failure escapes: classification errors escalate, answer errors become
    /// the fixed transient-error message, send errors are logged and swallowed.
    pub async fn handle_inbound(&self, from: &str, body: &str) -> Option<String> {
        if relay::is_command_attempt(&self.practitioner_address, from, body) {
            if let Some(command) = relay::parse_command(&self.practitioner_address, from, body) {
                log::info!("practitioner command: relaying to {}", command.target);
                relay::relay_command(self.llm.as_ref(), self.transport.as_ref(), &command).await;
            }
            // Malformed commands were already logged by the parser; the
            // practitioner intentionally gets no acknowledgment either way.
            return None;
        }

        let category = triage::classify(self.llm.as_ref(), body, &self.knowledge).await;
        let reply = match &category {
            Category::Greeting => respond::GREETING_REPLY.to_string(),
            Category::ClinicInfo => {
                match respond::clinic_info_answer(self.llm.as_ref(), body, &self.knowledge).await {
                    Ok(text) => text,
                    Err(e) => {
                        log::warn!("clinic info answer failed: {}", e);
                        respond::TRANSIENT_ERROR_REPLY.to_string()
                    }
                }
            }
            Category::GeneralHealth => {
                match respond::general_health_answer(self.llm.as_ref(), body).await {
                    Ok(text) => text,
                    Err(e) => {
                        log::warn!("general health answer failed: {}", e);
                        respond::TRANSIENT_ERROR_REPLY.to_string()
                    }
                }
            }
            Category::Escalate => {
                relay::escalate(self.transport.as_ref(), &self.practitioner_address, from, body)
                    .await;
                respond::ESCALATION_NOTICE.to_string()
            }
            Category::Unrecognized(tag) => {
                log::warn!("unrecognized triage category {:?}, forwarding to staff", tag);
                relay::escalate_unhandled(
                    self.transport.as_ref(),
                    &self.practitioner_address,
                    from,
                    body,
                )
                .await;
                respond::UNHANDLED_NOTICE.to_string()
            }
        };
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const PRACTITIONER: &str = "whatsapp:+919031807701";
    const CUSTOMER: &str = "whatsapp:+15550001111";

    struct ScriptedLlm {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedLlm {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(r) => Ok(r.clone()),
                None => Err(LlmError::Api("backend down".to_string())),
            }
        }
    }

    struct RecordingTransport {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageTransport for RecordingTransport {
        async fn send(&self, to: &str, body: &str) -> Result<(), String> {
            self.sent.lock().unwrap().push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn dispatcher(
        llm: Arc<ScriptedLlm>,
        transport: Arc<RecordingTransport>,
    ) -> Dispatcher {
        Dispatcher::new(
            PRACTITIONER.to_string(),
            "Hours: 9am-6pm.".to_string(),
            llm,
            transport,
        )
    }

    #[tokio::test]
    async fn fast_path_greeting_answers_without_collaborators() {
        let llm = ScriptedLlm::failing();
        let transport = RecordingTransport::new();
        let d = dispatcher(llm.clone(), transport.clone());
        let reply = d.handle_inbound(CUSTOMER, "hi").await;
        assert_eq!(reply.as_deref(), Some(respond::GREETING_REPLY));
        assert_eq!(llm.call_count(), 0);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn failing_backend_escalates_with_exactly_one_send() {
        let llm = ScriptedLlm::failing();
        let transport = RecordingTransport::new();
        let d = dispatcher(llm, transport.clone());
        let reply = d.handle_inbound(CUSTOMER, "my crown fell out").await;
        assert_eq!(reply.as_deref(), Some(respond::ESCALATION_NOTICE));
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, PRACTITIONER);
        assert!(sent[0].1.contains("my crown fell out"));
        assert!(sent[0].1.contains(CUSTOMER));
    }

    #[tokio::test]
    async fn unrecognized_category_forwards_to_staff() {
        let llm = ScriptedLlm::replying("BANANA");
        let transport = RecordingTransport::new();
        let d = dispatcher(llm, transport.clone());
        let reply = d.handle_inbound(CUSTOMER, "??").await;
        assert_eq!(reply.as_deref(), Some(respond::UNHANDLED_NOTICE));
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(transport.sent()[0].0, PRACTITIONER);
    }

    #[tokio::test]
    async fn clinic_info_answer_failure_substitutes_transient_message() {
        // Triage succeeds, then the answer call fails: first reply is the
        // category token, second call errors. Model that with a backend that
        // fails after the first call.
        struct OnceLlm {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl TextGenerator for OnceLlm {
            async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok("CLINIC_INFO".to_string())
                } else {
                    Err(LlmError::Api("backend down".to_string()))
                }
            }
        }

        let transport = RecordingTransport::new();
        let d = Dispatcher::new(
            PRACTITIONER.to_string(),
            "Hours: 9am-6pm.".to_string(),
            Arc::new(OnceLlm {
                calls: AtomicUsize::new(0),
            }),
            transport.clone(),
        );
        let reply = d.handle_inbound(CUSTOMER, "what are your hours?").await;
        assert_eq!(reply.as_deref(), Some(respond::TRANSIENT_ERROR_REPLY));
        // an answer failure does not trigger escalation by itself
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn practitioner_command_relays_and_returns_empty() {
        let llm = ScriptedLlm::replying("Please take ibuprofen twice a day.");
        let transport = RecordingTransport::new();
        let d = dispatcher(llm, transport.clone());
        let reply = d
            .handle_inbound(PRACTITIONER, "Reply to whatsapp:+15550001111: Take ibuprofen")
            .await;
        assert_eq!(reply, None);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, CUSTOMER);
        assert_eq!(sent[0].1, "Please take ibuprofen twice a day.");
    }

    #[tokio::test]
    async fn malformed_practitioner_command_is_a_silent_no_op() {
        let llm = ScriptedLlm::failing();
        let transport = RecordingTransport::new();
        let d = dispatcher(llm.clone(), transport.clone());
        let reply = d
            .handle_inbound(PRACTITIONER, "Reply to whatsapp:+15550001111")
            .await;
        assert_eq!(reply, None);
        assert!(transport.sent().is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn practitioner_query_without_prefix_is_triaged_as_a_customer() {
        let llm = ScriptedLlm::replying("GREETING");
        let transport = RecordingTransport::new();
        let d = dispatcher(llm, transport.clone());
        let reply = d.handle_inbound(PRACTITIONER, "did the patient call back?").await;
        assert_eq!(reply.as_deref(), Some(respond::GREETING_REPLY));
        assert!(transport.sent().is_empty());
    }
}
