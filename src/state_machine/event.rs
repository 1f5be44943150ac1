//! Events that can occur in a session

use crate::llm::LlmErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Ask the persona for its welcome reply
    Start,

    // User events
    UserMessage {
        text: String,
    },

    // LLM events
    LlmReply {
        text: String,
    },
    LlmError {
        kind: LlmErrorKind,
    },
}
