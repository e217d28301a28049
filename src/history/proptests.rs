//! Property-based tests for the history buffer

use super::*;
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

/// One causal group as the engine produces it
#[derive(Debug, Clone)]
enum Group {
    User(String),
    Answer(String),
    ToolRound { ids: Vec<String> },
}

fn arb_group() -> impl Strategy<Value = Group> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Group::User),
        "[a-z]{1,8}".prop_map(Group::Answer),
        proptest::collection::vec("[a-z]{6}", 1..4).prop_map(|ids| Group::ToolRound { ids }),
    ]
}

fn expand(groups: &[Group]) -> Vec<Message> {
    let mut out = Vec::new();
    for (n, group) in groups.iter().enumerate() {
        match group {
            Group::User(t) => out.push(Message::user(t.clone())),
            Group::Answer(t) => out.push(Message::assistant(t.clone())),
            Group::ToolRound { ids } => {
                let calls: Vec<_> = ids
                    .iter()
                    .map(|id| ToolCallRequest::new(format!("{n}-{id}"), "web_search", json!({"query": id})))
                    .collect();
                out.push(Message::tool_calls(None, calls.clone()));
                for c in calls {
                    out.push(Message::tool_result(ToolResult::success(c.id, "ok")));
                }
            }
        }
    }
    out
}

proptest! {
    #[test]
    fn prop_append_never_exceeds_capacity(
        capacity in 1usize..10,
        texts in proptest::collection::vec("[a-z]{1,5}", 0..30)
    ) {
        let mut buffer = HistoryBuffer::new(capacity);
        for t in &texts {
            buffer.append(Message::user(t.clone()));
            prop_assert!(buffer.len() <= capacity);
        }
        // Plain user messages are single-message groups: exactly the newest survive
        let expected: Vec<_> = texts
            .iter()
            .rev()
            .take(capacity)
            .rev()
            .map(|t| Message::user(t.clone()))
            .collect();
        prop_assert_eq!(buffer.snapshot(), expected);
    }

    #[test]
    fn prop_replace_keeps_a_suffix_within_capacity(
        capacity in 1usize..12,
        groups in proptest::collection::vec(arb_group(), 0..12)
    ) {
        let full = expand(&groups);
        let mut buffer = HistoryBuffer::new(capacity);
        buffer.replace(full.clone());
        let kept = buffer.snapshot();

        prop_assert!(kept.len() <= capacity);
        prop_assert!(full.ends_with(&kept), "trim must only remove from the front");
    }

    #[test]
    fn prop_trim_preserves_call_result_pairing(
        capacity in 1usize..12,
        groups in proptest::collection::vec(arb_group(), 0..12)
    ) {
        let mut buffer = HistoryBuffer::new(capacity);
        buffer.replace(expand(&groups));

        let mut requested = HashSet::new();
        for msg in buffer.iter() {
            match msg {
                Message::Assistant { tool_calls, .. } => {
                    requested.extend(tool_calls.iter().map(|c| c.id.clone()));
                }
                Message::ToolResult { call_id, .. } => {
                    prop_assert!(
                        requested.contains(call_id),
                        "tool result {} kept without its call",
                        call_id
                    );
                }
                Message::User { .. } | Message::System { .. } => {}
            }
        }
    }
}
