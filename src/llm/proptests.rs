//! Property-based tests for the chat-completions wire layer
//!
//! - Replies are trimmed and otherwise preserved
//! - Missing choices or content are always malformed
//! - Outbound messages keep their order, roles and text

use super::openai::{
    ChatCompletionChoice, ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse,
    ChatCompletionsService,
};
use super::types::{ChatMessage, MessageRole};
use super::LlmErrorKind;
use proptest::prelude::*;

fn arb_role() -> impl Strategy<Value = MessageRole> {
    prop_oneof![
        Just(MessageRole::System),
        Just(MessageRole::User),
        Just(MessageRole::Assistant),
    ]
}

fn arb_message() -> impl Strategy<Value = ChatMessage> {
    (arb_role(), "[a-zA-Z0-9 _.!?,\n]{0,80}").prop_map(|(role, content)| ChatMessage { role, content })
}

fn response_with(contents: Vec<Option<String>>) -> ChatCompletionResponse {
    ChatCompletionResponse {
        choices: contents
            .into_iter()
            .map(|content| ChatCompletionChoice {
                message: ChatCompletionMessage { content },
            })
            .collect(),
        usage: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_reply_is_trimmed_first_choice(
        first in "[ \n\t]{0,3}[a-zA-Z0-9 .!?]{0,60}[ \n\t]{0,3}",
        rest in proptest::collection::vec("[a-z]{1,10}", 0..3)
    ) {
        let mut contents = vec![Some(first.clone())];
        contents.extend(rest.into_iter().map(Some));

        let response = ChatCompletionsService::normalize_response(response_with(contents)).unwrap();
        prop_assert_eq!(response.text, first.trim());
        prop_assert_eq!(response.usage.input_tokens, 0);
    }

    #[test]
    fn prop_missing_content_is_malformed(
        rest in proptest::collection::vec(proptest::option::of("[a-z]{1,10}"), 0..3)
    ) {
        let mut contents = vec![None];
        contents.extend(rest);

        let err = ChatCompletionsService::normalize_response(response_with(contents)).unwrap_err();
        prop_assert_eq!(err.kind, LlmErrorKind::Malformed);
        prop_assert!(!err.kind.is_request_failure());
    }

    #[test]
    fn prop_request_preserves_messages(
        messages in proptest::collection::vec(arb_message(), 0..8),
        model in "[a-z][a-z0-9-]{0,15}"
    ) {
        let body = serde_json::to_value(ChatCompletionRequest {
            model: &model,
            messages: &messages,
        })
        .unwrap();

        prop_assert_eq!(body["model"].as_str(), Some(model.as_str()));
        let wire = body["messages"].as_array().unwrap();
        prop_assert_eq!(wire.len(), messages.len());
        for (sent, original) in wire.iter().zip(&messages) {
            let role = serde_json::to_value(original.role).unwrap();
            prop_assert_eq!(&sent["role"], &role);
            prop_assert_eq!(sent["content"].as_str(), Some(original.content.as_str()));
        }
    }
}

#[test]
fn test_empty_choices_is_malformed() {
    let err = ChatCompletionsService::normalize_response(response_with(Vec::new())).unwrap_err();
    assert_eq!(err.kind, LlmErrorKind::Malformed);
}
