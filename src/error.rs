//! Errors surfaced to whatever drives the game

use crate::config::ConfigError;
use crate::llm::LlmError;
use crate::state_machine::TransitionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// Config could not be fetched or parsed
    #[error("config unavailable: {0}")]
    ConfigUnavailable(#[from] ConfigError),

    #[error("unknown persona: {0}")]
    UnknownPersona(String),

    /// Transport failure, timeout or non-success status
    #[error("AI request failed: {0}")]
    AiRequestFailed(LlmError),

    /// The endpoint answered but not with a usable chat completion
    #[error("AI response malformed: {0}")]
    AiResponseMalformed(LlmError),

    #[error(transparent)]
    InvalidTurn(#[from] TransitionError),

    /// Reading player input failed
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LlmError> for GameError {
    fn from(err: LlmError) -> Self {
        if err.kind.is_request_failure() {
            Self::AiRequestFailed(err)
        } else {
            Self::AiResponseMalformed(err)
        }
    }
}

impl GameError {
    /// Fatal errors abort initialization; the rest are per-turn and the
    /// player may simply try again.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigUnavailable(_) | Self::UnknownPersona(_))
    }

    /// HTTP status of a failed AI request, if the endpoint answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AiRequestFailed(e) | Self::AiResponseMalformed(e) => e.status,
            _ => None,
        }
    }
}
