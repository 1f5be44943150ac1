//! Conversation session runtime
//!
//! A [`Session`] owns one conversation with one persona. It feeds events to
//! the pure [`transition`] function and executes the effects it returns,
//! the only place where the LLM is called.
//!
//! Operations take `&mut self`, so a session never has two requests in
//! flight.

use crate::config::{GameConfig, Persona};
use crate::error::GameError;
use crate::llm::{ChatMessage, LlmError, LlmRequest, LlmService, MessageRole};
use crate::state_machine::{transition, Effect, Event, SessionContext, SessionState};
use crate::system_prompt;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Instruction to show the reveal step for a persona after a delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub persona_id: String,
    pub delay: Duration,
}

/// What the caller should present after an operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Persona reply to display, marker already stripped
    pub display: Option<String>,
    /// Set once the persona confirmed the guess
    pub reveal: Option<Reveal>,
}

impl TurnOutcome {
    /// Nothing happened (blank input)
    #[cfg(test)]
    pub fn is_ignored(&self) -> bool {
        self.display.is_none() && self.reveal.is_none()
    }

    #[cfg(test)]
    pub fn is_concluded(&self) -> bool {
        self.reveal.is_some()
    }
}

/// One player's conversation with one persona
pub struct Session {
    id: Uuid,
    config: Arc<GameConfig>,
    persona: Persona,
    context: SessionContext,
    state: SessionState,
    history: Vec<ChatMessage>,
    llm: Arc<dyn LlmService>,
}

impl Session {
    /// Create an uninitialized session for `persona_id`.
    ///
    /// Fails with [`GameError::UnknownPersona`] before any LLM call is made.
    pub fn new(
        config: Arc<GameConfig>,
        persona_id: &str,
        llm: Arc<dyn LlmService>,
    ) -> Result<Self, GameError> {
        let persona = config
            .persona(persona_id)
            .cloned()
            .ok_or_else(|| GameError::UnknownPersona(persona_id.to_string()))?;
        let context = SessionContext::new(persona.id.clone(), config.reveal_delay);

        Ok(Self {
            id: Uuid::new_v4(),
            config,
            persona,
            context,
            state: SessionState::default(),
            history: Vec::new(),
            llm,
        })
    }

    /// Seed the system prompt and fetch the persona's welcome reply.
    ///
    /// On failure the session stays uninitialized and `start` can be called
    /// again.
    pub async fn start(&mut self) -> Result<TurnOutcome, GameError> {
        tracing::info!(
            session_id = %self.id,
            persona_id = %self.persona.id,
            model = %self.llm.model_id(),
            "Starting session"
        );
        self.dispatch(Event::Start).await
    }

    /// Send one player message. Blank input is ignored without an LLM call.
    pub async fn submit_user_turn(&mut self, text: &str) -> Result<TurnOutcome, GameError> {
        self.dispatch(Event::UserMessage {
            text: text.to_string(),
        })
        .await
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Stored history, oldest first
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Render the system prompt for this session's persona.
    pub fn render_system_prompt(&self) -> String {
        system_prompt::render(&self.config.system_prompt_template, &self.persona)
    }

    /// Copy of the history as sent to the LLM: index 0 is always a freshly
    /// rendered system message.
    pub fn outbound_messages(&self) -> Vec<ChatMessage> {
        let system = ChatMessage::system(self.render_system_prompt());
        let mut messages = self.history.clone();
        match messages.first_mut() {
            Some(first) if first.role == MessageRole::System => *first = system,
            _ => messages.insert(0, system),
        }
        messages
    }

    async fn dispatch(&mut self, event: Event) -> Result<TurnOutcome, GameError> {
        let mut outcome = TurnOutcome::default();
        let mut failure: Option<LlmError> = None;
        let mut pending = VecDeque::from([event]);

        while let Some(event) = pending.pop_front() {
            let result = transition(&self.state, &self.context, event)?;

            if result.new_state != self.state {
                tracing::debug!(
                    session_id = %self.id,
                    from = self.state.name(),
                    to = result.new_state.name(),
                    "State transition"
                );
            }
            self.state = result.new_state;

            for effect in result.effects {
                match effect {
                    Effect::SeedHistory => {
                        self.history = vec![ChatMessage::system(self.render_system_prompt())];
                    }
                    Effect::AppendMessage(message) => self.history.push(message),
                    Effect::RequestLlm => match self.request_reply().await {
                        Ok(text) => pending.push_back(Event::LlmReply { text }),
                        Err(e) => {
                            pending.push_back(Event::LlmError { kind: e.kind });
                            failure = Some(e);
                        }
                    },
                    Effect::Display { text } => outcome.display = Some(text),
                    Effect::ScheduleReveal { persona_id, delay } => {
                        tracing::info!(
                            session_id = %self.id,
                            persona_id = %persona_id,
                            turns = self.history.len(),
                            "Correct guess, session concluded"
                        );
                        outcome.reveal = Some(Reveal { persona_id, delay });
                    }
                }
            }
        }

        match failure {
            Some(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    state = self.state.name(),
                    transient = e.kind.is_transient(),
                    error = %e,
                    "Turn failed"
                );
                Err(e.into())
            }
            None => Ok(outcome),
        }
    }

    async fn request_reply(&self) -> Result<String, LlmError> {
        let request = LlmRequest {
            messages: self.outbound_messages(),
        };
        let response = self.llm.complete(&request).await?;
        Ok(response.text)
    }
}
