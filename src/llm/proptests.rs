//! Property tests for the chat completions wire mapping
//!
//! - responses with neither text nor calls are rejected
//! - calls keep their order and arguments; unparseable arguments pass through
//! - every outgoing message is accepted by the provider's shape rules
//! - tool outputs answer the call id they were given

#![allow(clippy::redundant_closure_for_method_calls)]

use super::openai::{
    test_helpers, CompletionChoice, CompletionResponse, WireFunctionCall, WireMessage,
    WireToolCall, WireUsage,
};
use super::types::ChatMessage;
use crate::history::ToolCallRequest;
use proptest::prelude::*;
use serde_json::Value;

// ============================================================================
// Strategies
// ============================================================================

/// Argument objects as a search call would carry them
fn arb_arguments() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{1,40}".prop_map(|query| serde_json::json!({ "query": query })),
        ("[a-zA-Z0-9 ]{1,40}", 1u32..=20).prop_map(|(query, max_results)| {
            serde_json::json!({ "query": query, "max_results": max_results })
        }),
        Just(serde_json::json!({})),
    ]
}

fn arb_call() -> impl Strategy<Value = ToolCallRequest> {
    ("call_[a-z0-9]{4,12}", arb_arguments())
        .prop_map(|(id, arguments)| ToolCallRequest::new(id, "web_search", arguments))
}

fn arb_chat_message() -> impl Strategy<Value = ChatMessage> {
    prop_oneof![
        "[a-zA-Z0-9 ?.]{0,80}".prop_map(ChatMessage::user),
        (
            proptest::option::of("[a-zA-Z0-9 .]{1,80}"),
            proptest::collection::vec(arb_call(), 0..4)
        )
            .prop_map(|(content, tool_calls)| ChatMessage::Assistant {
                content,
                tool_calls
            }),
        ("call_[a-z0-9]{4,12}", "[a-zA-Z0-9 {}:\",]{0,80}", any::<bool>())
            .prop_map(|(id, content, is_error)| ChatMessage::tool(id, content, is_error)),
    ]
}

fn completion(
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
    finish_reason: &str,
) -> CompletionResponse {
    CompletionResponse {
        choices: vec![CompletionChoice {
            message: WireMessage {
                role: "assistant".to_string(),
                content,
                tool_calls,
                tool_call_id: None,
            },
            finish_reason: Some(finish_reason.to_string()),
        }],
        usage: Some(WireUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
        }),
    }
}

fn wire_call(id: &str, name: &str, arguments: &str) -> WireToolCall {
    WireToolCall {
        id: id.to_string(),
        r#type: "function".to_string(),
        function: WireFunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

// ============================================================================
// Inbound
// ============================================================================

proptest! {
    #[test]
    fn prop_empty_completion_is_rejected(empty_text in proptest::option::of(Just(String::new()))) {
        let resp = completion(empty_text, None, "stop");
        prop_assert!(test_helpers::normalize_response(resp).is_err());
    }

    #[test]
    fn prop_calls_keep_order_and_arguments(calls in proptest::collection::vec(arb_call(), 1..5)) {
        let wire: Vec<WireToolCall> = calls
            .iter()
            .map(|c| wire_call(&c.id, &c.name, &c.arguments.to_string()))
            .collect();
        let resp = completion(None, Some(wire), "tool_calls");

        let normalized = test_helpers::normalize_response(resp).unwrap();
        prop_assert_eq!(normalized.tool_calls, calls);
    }

    #[test]
    fn prop_unnamed_call_is_rejected(call in arb_call()) {
        let wire = wire_call(&call.id, "", &call.arguments.to_string());
        let resp = completion(None, Some(vec![wire]), "tool_calls");
        prop_assert!(test_helpers::normalize_response(resp).is_err());
    }

    #[test]
    fn prop_unparseable_arguments_pass_through(id in "call_[a-z0-9]{4,12}") {
        for raw in ["{query:", "not json", "{\"query\": }", "[,]"] {
            let resp = completion(None, Some(vec![wire_call(&id, "web_search", raw)]), "tool_calls");
            let normalized = test_helpers::normalize_response(resp).unwrap();
            prop_assert_eq!(&normalized.tool_calls[0].arguments, &Value::String(raw.to_string()));
        }
    }
}

// ============================================================================
// Outbound
// ============================================================================

proptest! {
    /// Assistant messages carry text or calls; tool messages carry an id
    #[test]
    fn prop_wire_messages_are_well_formed(msg in arb_chat_message()) {
        let wire = test_helpers::to_wire(&msg);
        match wire.role.as_str() {
            "user" => prop_assert!(wire.content.is_some()),
            "assistant" => prop_assert!(wire.content.is_some() || wire.tool_calls.is_some()),
            "tool" => prop_assert!(wire.tool_call_id.is_some() && wire.content.is_some()),
            other => prop_assert!(false, "unexpected role {}", other),
        }
        prop_assert!(serde_json::to_value(&wire).is_ok());
    }

    #[test]
    fn prop_outgoing_calls_round_trip(calls in proptest::collection::vec(arb_call(), 1..5)) {
        let msg = ChatMessage::Assistant { content: None, tool_calls: calls.clone() };
        let wire = test_helpers::to_wire(&msg);
        let sent = wire.tool_calls.unwrap_or_default();

        prop_assert_eq!(sent.len(), calls.len());
        for (wire_call, call) in sent.iter().zip(&calls) {
            prop_assert_eq!(&wire_call.id, &call.id);
            let parsed: Value = serde_json::from_str(&wire_call.function.arguments).unwrap();
            prop_assert_eq!(&parsed, &call.arguments);
        }
    }

    #[test]
    fn prop_tool_output_answers_its_call(
        id in "call_[a-z0-9]{4,12}",
        content in "[a-zA-Z0-9 ]{0,40}",
        is_error in any::<bool>(),
    ) {
        let wire = test_helpers::to_wire(&ChatMessage::tool(id.clone(), content.clone(), is_error));
        prop_assert_eq!(wire.tool_call_id.as_deref(), Some(id.as_str()));
        let body = wire.content.unwrap_or_default();
        prop_assert_eq!(body.starts_with("Error: "), is_error);
        prop_assert!(body.ends_with(&content));
    }
}
