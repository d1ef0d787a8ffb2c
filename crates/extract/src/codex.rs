// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Codex CLI JSONL dialect: `event_msg`/`response_item` discriminated rows
//! with a `user_message` lifecycle event and a `message` role payload for
//! assistant turns.

use claodex_core::{Agent, EventSource, RoomEvent};
use serde_json::Value;

use crate::common::{extract_entry_timestamp, strip_group_chat_prefix};

pub fn extract_codex_room_events(entries: &[Value]) -> (Vec<RoomEvent>, Vec<String>) {
    let mut events = Vec::new();
    let mut warnings = Vec::new();
    let mut pending_assistant: Option<RoomEvent> = None;
    let mut warned_ambiguous_payload = false;

    let flush = |pending: &mut Option<RoomEvent>, events: &mut Vec<RoomEvent>| {
        if let Some(event) = pending.take() {
            events.push(event);
        }
    };

    for entry in entries {
        let entry_type = entry.get("type").and_then(Value::as_str).unwrap_or("");
        let timestamp = extract_entry_timestamp(entry);

        if entry_type == "event_msg" {
            let payload = entry.get("payload").cloned().unwrap_or(Value::Null);
            if payload.get("type").and_then(Value::as_str) != Some("user_message") {
                continue;
            }
            if has_ambiguous_user_payload(&payload) && !warned_ambiguous_payload {
                tracing::warn!("codex user_message payload carries both message and content; preferring message");
                warnings.push(
                    "warning: codex user_message payload contains both message and content; \
                     preferring message"
                        .to_string(),
                );
                warned_ambiguous_payload = true;
            }
            // user entries define assistant-turn boundaries even when text is empty
            flush(&mut pending_assistant, &mut events);

            let Some(timestamp) = timestamp else { continue };
            let user_text = extract_user_message_text(&payload);
            if user_text.trim().is_empty() {
                continue;
            }
            events.push(RoomEvent {
                timestamp,
                source: EventSource::User(Agent::Codex),
                body: user_text,
            });
            continue;
        }

        if entry_type != "response_item" {
            continue;
        }
        let payload = entry.get("payload").cloned().unwrap_or(Value::Null);
        if payload.get("type").and_then(Value::as_str) != Some("message")
            || payload.get("role").and_then(Value::as_str) != Some("assistant")
        {
            continue;
        }

        let Some(timestamp) = timestamp else { continue };
        let assistant_text = extract_message_text(&payload);
        if !assistant_text.trim().is_empty() {
            // final non-empty assistant message in each turn wins
            pending_assistant = Some(RoomEvent {
                timestamp,
                source: EventSource::Agent(Agent::Codex),
                body: assistant_text,
            });
        }
    }

    flush(&mut pending_assistant, &mut events);
    (events, warnings)
}

fn has_ambiguous_user_payload(payload: &Value) -> bool {
    if !payload.get("message").map(Value::is_string).unwrap_or(false) {
        return false;
    }
    matches!(payload.get("content"), Some(Value::String(_)) | Some(Value::Array(_)))
}

/// Extract user-message text from an `event_msg` payload. `message` wins
/// over `content` whenever both are present.
fn extract_user_message_text(payload: &Value) -> String {
    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        return strip_group_chat_prefix(message);
    }

    if let Some(blocks) = payload.get("content").and_then(Value::as_array) {
        let parts: Vec<&str> = blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .filter(|text| !text.trim().is_empty())
            .collect();
        if !parts.is_empty() {
            return strip_group_chat_prefix(&parts.join("\n"));
        }
    }

    if let Some(content) = payload.get("content").and_then(Value::as_str) {
        return strip_group_chat_prefix(content);
    }
    String::new()
}

fn extract_message_text(payload: &Value) -> String {
    if let Some(blocks) = payload.get("content").and_then(Value::as_array) {
        let parts: Vec<&str> = blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .filter(|text| !text.trim().is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join("\n");
        }
    }
    payload
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "codex_tests.rs"]
mod tests;
