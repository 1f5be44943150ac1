//! Effects produced by state transitions

use crate::llm::ChatMessage;
use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Reset the history to a single, freshly rendered system message
    SeedHistory,

    /// Append a message to the history
    AppendMessage(ChatMessage),

    /// Send the history to the LLM, with the system message re-rendered
    RequestLlm,

    /// Hand a persona reply to the caller for display
    Display { text: String },

    /// Tell the caller to show the reveal step after `delay`
    ScheduleReveal { persona_id: String, delay: Duration },
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendMessage(ChatMessage::user(text))
    }

    pub fn append_assistant(text: impl Into<String>) -> Self {
        Effect::AppendMessage(ChatMessage::assistant(text))
    }

    pub fn display(text: impl Into<String>) -> Self {
        Effect::Display { text: text.into() }
    }
}
