// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude Code JSONL dialect: `user`/`assistant` entries with a nested
//! `message` object, command-tag wrapped skill invocations, and sidechain
//! rows that must be ignored entirely.

use std::sync::OnceLock;

use claodex_core::{Agent, EventSource, RoomEvent};
use regex::Regex;
use serde_json::Value;

use crate::common::{extract_entry_timestamp, strip_group_chat_prefix};

#[allow(clippy::expect_used)]
fn command_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<(command-message|command-name|command-args)>(.*?)</\1>")
            .expect("static command tag regex is valid")
    })
}

pub fn extract_claude_room_events(entries: &[Value]) -> Vec<RoomEvent> {
    let mut events = Vec::new();
    let mut pending_assistant: Option<RoomEvent> = None;

    let flush = |pending: &mut Option<RoomEvent>, events: &mut Vec<RoomEvent>| {
        if let Some(event) = pending.take() {
            events.push(event);
        }
    };

    for entry in entries {
        if entry.get("isSidechain").and_then(Value::as_bool).unwrap_or(false)
            || entry.get("isMeta").and_then(Value::as_bool).unwrap_or(false)
        {
            continue;
        }

        let entry_type = entry.get("type").and_then(Value::as_str).unwrap_or("");
        let message = entry.get("message").cloned().unwrap_or(Value::Null);
        let role = message.get("role").and_then(Value::as_str).unwrap_or("");
        let timestamp = extract_entry_timestamp(entry);

        if entry_type == "user" && role == "user" {
            if is_tool_result_only_user_entry(&message) {
                continue;
            }
            // user entries define assistant-turn boundaries even when the
            // normalized text turns out empty.
            flush(&mut pending_assistant, &mut events);

            let Some(timestamp) = timestamp else { continue };
            let text = normalize_claude_user_text(&extract_claude_user_text(message.get("content")));
            if text.trim().is_empty() {
                continue;
            }
            events.push(RoomEvent {
                timestamp,
                source: EventSource::User(Agent::Claude),
                body: text,
            });
            continue;
        }

        if entry_type != "assistant" || role != "assistant" {
            continue;
        }
        let Some(timestamp) = timestamp else { continue };
        let Some(content) = message.get("content").and_then(Value::as_array) else {
            continue;
        };

        let mut text_fragments = Vec::new();
        for block in content {
            if block.get("type").and_then(Value::as_str) != Some("text") {
                continue;
            }
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                text_fragments.push(text.to_string());
            }
        }
        let frame_text = text_fragments.join("\n");
        if !frame_text.trim().is_empty() {
            // final non-empty assistant frame in each turn wins
            pending_assistant = Some(RoomEvent {
                timestamp,
                source: EventSource::Agent(Agent::Claude),
                body: frame_text,
            });
        }
    }

    flush(&mut pending_assistant, &mut events);
    events
}

fn extract_claude_user_text(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn is_tool_result_only_user_entry(message: &Value) -> bool {
    let Some(content) = message.get("content").and_then(Value::as_array) else {
        return false;
    };
    if content.is_empty() {
        return false;
    }
    content
        .iter()
        .all(|block| block.get("type").and_then(Value::as_str) == Some("tool_result"))
}

/// Unwrap Claude skill-wrapper command tags (`<command-message>`,
/// `<command-name>`, `<command-args>`) into plain user-facing text, only
/// when the message consists ENTIRELY of those tags (no surrounding prose).
fn normalize_claude_user_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let pattern = command_tag_pattern();
    let matches: Vec<_> = pattern.captures_iter(text).collect();
    if matches.is_empty() {
        return strip_group_chat_prefix(text);
    }

    let outside = pattern.replace_all(text, "");
    if !outside.trim().is_empty() {
        return strip_group_chat_prefix(text);
    }

    let mut command_args = None;
    let mut command_name = None;
    let mut command_message = None;
    for capture in matches {
        let tag = &capture[1];
        let body = capture[2].trim();
        if body.is_empty() {
            continue;
        }
        match tag {
            "command-args" => command_args = Some(body.to_string()),
            "command-name" => command_name = Some(body.to_string()),
            "command-message" => command_message = Some(body.to_string()),
            _ => {}
        }
    }

    if let Some(body) = command_args {
        return strip_group_chat_prefix(&body);
    }
    if let Some(body) = command_name {
        return strip_group_chat_prefix(&body);
    }
    if let Some(body) = command_message {
        return strip_group_chat_prefix(&body);
    }
    strip_group_chat_prefix(text)
}

/// Select the most recent assistant text in `entries`, but only if the tail
/// of the window doesn't show a tool call awaiting its post-tool-result
/// assistant frame.
///
/// Scanning newest to oldest, the first substantive row determines the
/// verdict: a bare assistant text block means the extracted "last frame
/// wins" text is genuinely final; a tool-result-only user row means the
/// agent has just received tool output and hasn't written a follow-up
/// frame yet, so there is nothing acceptable to return. Used by the
/// debug-log Stop watcher fallback, which (unlike the `turn_duration`
/// marker) has no explicit end-of-turn boundary to anchor on.
pub fn latest_assistant_text_respecting_tool_chain(entries: &[Value]) -> Option<String> {
    for entry in entries.iter().rev() {
        if entry.get("isSidechain").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        let entry_type = entry.get("type").and_then(Value::as_str).unwrap_or("");
        let message = entry.get("message").cloned().unwrap_or(Value::Null);
        let role = message.get("role").and_then(Value::as_str).unwrap_or("");

        if entry_type == "assistant" && role == "assistant" {
            break;
        }

        if entry_type == "user" && role == "user" {
            if entry.get("isMeta").and_then(Value::as_bool).unwrap_or(false) {
                continue;
            }
            if is_tool_result_only_user_entry(&message) {
                return None;
            }
            break;
        }
    }

    let events = extract_claude_room_events(entries);
    events
        .into_iter()
        .rev()
        .find(|event| matches!(event.source, EventSource::Agent(_)))
        .map(|event| event.body)
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
