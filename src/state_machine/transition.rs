//! Pure state transition function

use super::{Effect, Event, SessionContext, SessionState};
use thiserror::Error;

/// Prefix the persona puts on its reply when the player guessed right
pub const CORRECT_GUESS_MARKER: &str = "[[[CORRECT_GUESS]]]";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Conversation has not started yet")]
    NotStarted,
    #[error("Conversation already started")]
    AlreadyStarted,
    #[error("Conversation is over, the figure has been identified")]
    Concluded,
}

/// Strip the correct-guess marker, returning the trimmed remainder.
///
/// `None` when the reply does not start with the marker.
pub fn strip_correct_guess(reply: &str) -> Option<&str> {
    reply.strip_prefix(CORRECT_GUESS_MARKER).map(str::trim)
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Start
        // ============================================================

        // Uninitialized + Start -> Uninitialized until the welcome arrives
        (SessionState::Uninitialized, Event::Start) => {
            Ok(TransitionResult::new(SessionState::Uninitialized)
                .with_effect(Effect::SeedHistory)
                .with_effect(Effect::RequestLlm))
        }

        // Uninitialized + LlmReply -> Active. A welcome never concludes,
        // but a stray marker is still not shown.
        (SessionState::Uninitialized, Event::LlmReply { text }) => {
            let text = match strip_correct_guess(&text) {
                Some(clean) => clean.to_string(),
                None => text,
            };
            Ok(TransitionResult::new(SessionState::Active)
                .with_effect(Effect::append_assistant(text.clone()))
                .with_effect(Effect::display(text)))
        }

        // Failed welcome leaves the session startable again
        (SessionState::Uninitialized, Event::LlmError { .. }) => {
            Ok(TransitionResult::new(SessionState::Uninitialized))
        }

        (SessionState::Uninitialized, Event::UserMessage { .. }) => {
            Err(TransitionError::NotStarted)
        }

        (SessionState::Active, Event::Start) => Err(TransitionError::AlreadyStarted),

        // ============================================================
        // User turns
        // ============================================================

        (SessionState::Active, Event::UserMessage { text }) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(TransitionResult::new(SessionState::Active));
            }
            Ok(TransitionResult::new(SessionState::Active)
                .with_effect(Effect::append_user(text))
                .with_effect(Effect::RequestLlm))
        }

        // ============================================================
        // Replies
        // ============================================================

        (SessionState::Active, Event::LlmReply { text }) => {
            match strip_correct_guess(&text).map(str::to_string) {
                // Stored history keeps the stripped text too, so the marker
                // never reaches a transcript.
                Some(clean) => Ok(TransitionResult::new(SessionState::Concluded {
                    persona_id: context.persona_id.clone(),
                })
                .with_effect(Effect::append_assistant(clean.clone()))
                .with_effect(Effect::display(clean))
                .with_effect(Effect::ScheduleReveal {
                    persona_id: context.persona_id.clone(),
                    delay: context.reveal_delay,
                })),
                None => Ok(TransitionResult::new(SessionState::Active)
                    .with_effect(Effect::append_assistant(text.clone()))
                    .with_effect(Effect::display(text))),
            }
        }

        // The user message stays; the caller may submit again
        (SessionState::Active, Event::LlmError { .. }) => {
            Ok(TransitionResult::new(SessionState::Active))
        }

        // ============================================================
        // Terminal
        // ============================================================

        (SessionState::Concluded { .. }, _) => Err(TransitionError::Concluded),
    }
}
