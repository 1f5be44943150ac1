//! Mock implementations for testing
//!
//! These mocks let sessions and the game driver run without real I/O.

use crate::config::GameConfig;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::presentation::{Presenter, Route, Sender};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Fixtures
// ============================================================================

/// Two-persona config used across tests. Raw text, so key order is the
/// gallery order.
const TEST_CONFIG: &str = r#"{
    "characters": {
        "zhang_heng": {
            "id": "zhang_heng",
            "display_name": "Zhang Heng",
            "background": "An Eastern Han astronomer who built a seismoscope.",
            "relic": "A bronze jar ringed with dragons",
            "details": "Zhang Heng (78-139) was an astronomer, mathematician and poet."
        },
        "wang_zhihuan": {
            "id": "wang_zhihuan",
            "display_name": "Wang Zhihuan",
            "background": "A Tang dynasty frontier poet."
        }
    },
    "system_prompt_template": "You are {character_name}. {character_background} Never reveal that you are {character_name}. When the player names you, start your reply with [[[CORRECT_GUESS]]].",
    "api_settings": {
        "endpoint": "http://localhost/v1/chat/completions",
        "headers": { "Authorization": "Bearer test" }
    },
    "background_story": "A relic glows in your hands."
}"#;

pub fn test_config() -> GameConfig {
    GameConfig::from_json(TEST_CONFIG).unwrap()
}

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text)));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Recording Presenter
// ============================================================================

/// Everything a presenter was asked to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    Message { text: String, sender: Sender },
    Navigate(Route),
    PlayMusic,
    PauseMusic,
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub calls: Vec<PresenterCall>,
}

impl RecordingPresenter {
    pub fn messages_from(&self, sender: Sender) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                PresenterCall::Message { text, sender: s } if *s == sender => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn routes(&self) -> Vec<&Route> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                PresenterCall::Navigate(route) => Some(route),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn render_message(&mut self, text: &str, sender: Sender) {
        self.calls.push(PresenterCall::Message {
            text: text.to_string(),
            sender,
        });
    }

    fn navigate_to(&mut self, route: &Route) {
        self.calls.push(PresenterCall::Navigate(route.clone()));
    }

    fn play_music(&mut self) {
        self.calls.push(PresenterCall::PlayMusic);
    }

    fn pause_music(&mut self) {
        self.calls.push(PresenterCall::PauseMusic);
    }
}
