//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::llm::LlmErrorKind;
use proptest::prelude::*;
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("test-persona", Duration::from_millis(1500))
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::Timeout),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::InvalidRequest),
        Just(LlmErrorKind::Unknown),
        Just(LlmErrorKind::Malformed),
    ]
}

/// Replies that never carry the marker
fn arb_plain_reply() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?]{0,80}"
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Start),
        "[a-zA-Z ]{0,30}".prop_map(|text| Event::UserMessage { text }),
        arb_plain_reply().prop_map(|text| Event::LlmReply { text }),
        arb_plain_reply().prop_map(|text| Event::LlmReply {
            text: format!("{CORRECT_GUESS_MARKER}{text}")
        }),
        arb_error_kind().prop_map(|kind| Event::LlmError { kind }),
    ]
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Uninitialized),
        Just(SessionState::Active),
        Just(SessionState::Concluded {
            persona_id: "test-persona".to_string()
        }),
    ]
}

proptest! {
    /// Concluded is terminal: every event is rejected.
    #[test]
    fn concluded_rejects_everything(event in arb_event()) {
        let state = SessionState::Concluded { persona_id: "test-persona".to_string() };
        prop_assert_eq!(
            transition(&state, &test_context(), event).unwrap_err(),
            TransitionError::Concluded
        );
    }

    /// Whitespace-only input never touches history or the LLM.
    #[test]
    fn blank_user_input_is_noop(text in "[ \t\r\n]{0,10}") {
        let result = transition(&SessionState::Active, &test_context(), Event::UserMessage { text })
            .unwrap();
        prop_assert_eq!(result.new_state, SessionState::Active);
        prop_assert!(result.effects.is_empty());
    }

    /// Replies without the marker keep an active session active.
    #[test]
    fn plain_replies_keep_active(replies in proptest::collection::vec(arb_plain_reply(), 1..10)) {
        let mut state = SessionState::Active;
        for text in replies {
            let result = transition(&state, &test_context(), Event::LlmReply { text }).unwrap();
            state = result.new_state;
            prop_assert_eq!(&state, &SessionState::Active);
        }
    }

    /// A marker reply always concludes, and the marker never reaches display.
    #[test]
    fn marker_reply_concludes(tail in arb_plain_reply()) {
        let text = format!("{CORRECT_GUESS_MARKER}{tail}");
        let result = transition(&SessionState::Active, &test_context(), Event::LlmReply { text })
            .unwrap();
        prop_assert!(result.new_state.is_concluded());
        for effect in &result.effects {
            match effect {
                Effect::Display { text } => {
                    prop_assert!(!text.contains(CORRECT_GUESS_MARKER));
                    prop_assert_eq!(text.as_str(), tail.trim());
                }
                Effect::AppendMessage(msg) => {
                    prop_assert!(!msg.content.contains(CORRECT_GUESS_MARKER));
                }
                _ => {}
            }
        }
        let reveal_scheduled = result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::ScheduleReveal { .. }));
        prop_assert!(reveal_scheduled);
    }

    /// Errors never move a session forward.
    #[test]
    fn errors_never_advance(state in arb_state(), kind in arb_error_kind()) {
        match transition(&state, &test_context(), Event::LlmError { kind }) {
            Ok(result) => {
                prop_assert_eq!(&result.new_state, &state);
                prop_assert!(result.effects.is_empty());
            }
            Err(e) => prop_assert_eq!(e, TransitionError::Concluded),
        }
    }

    /// At most one LLM request per transition.
    #[test]
    fn at_most_one_request(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context(), event) {
            let requests = result
                .effects
                .iter()
                .filter(|e| matches!(e, Effect::RequestLlm))
                .count();
            prop_assert!(requests <= 1);
        }
    }
}
