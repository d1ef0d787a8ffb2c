// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detects a human typing directly into a pane while we're waiting for that
//! pane's assistant to finish responding to a routed message. Claude-only:
//! Codex's session log doesn't carry enough of a user-entry trail to make
//! this reliable.

use serde_json::Value;

const META_USER_PATTERNS: [&str; 7] = [
    "<command-name>",
    "<command-message>",
    "<local-command-caveat>",
    "<local-command-stdout>",
    "<task-notification>",
    "This session is being continued",
    "<system-reminder>",
];

const SNIPPET_LEN: usize = 120;

fn is_meta_user_text(text: &str) -> bool {
    let trimmed = text.trim();
    META_USER_PATTERNS.iter().any(|pattern| trimmed.starts_with(pattern))
}

fn normalize_for_anchor(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_tool_result_only_entry(message: &Value) -> bool {
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

fn extract_user_text(message: &Value) -> String {
    match message.get("content") {
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

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}

/// Scan a Claude session window for a human pane keystroke that interrupted
/// our routed message. `anchor` is the message body we most recently sent;
/// once a user row matching it (allowing either-direction whitespace-
/// normalized substring containment) is seen, the next genuine user row
/// that doesn't also match the anchor is interference.
pub fn detect_interference(entries: &[Value], anchor: &str) -> Option<String> {
    let normalized_anchor = normalize_for_anchor(anchor);
    let mut anchor_confirmed = false;

    for entry in entries {
        if entry.get("isSidechain").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        if entry.get("type").and_then(Value::as_str) != Some("user") {
            continue;
        }
        if entry.get("isMeta").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        let message = entry.get("message").cloned().unwrap_or(Value::Null);
        if message.get("role").and_then(Value::as_str) != Some("user") {
            continue;
        }
        if is_tool_result_only_entry(&message) {
            continue;
        }

        let text = extract_user_text(&message);
        if is_meta_user_text(&text) {
            continue;
        }

        // Any non-meta user row seen after the anchor has already been
        // confirmed is out-of-band interference, regardless of its text.
        if anchor_confirmed {
            return Some(snippet(&text));
        }

        // This is the first non-meta user row: it must be the echo of what
        // we just injected, or the wait has already been interfered with.
        let normalized = normalize_for_anchor(&text);
        let matches_anchor = normalized == normalized_anchor
            || normalized_anchor.contains(&normalized)
            || normalized.contains(&normalized_anchor);

        if matches_anchor {
            anchor_confirmed = true;
            continue;
        }

        return Some(snippet(&text));
    }

    None
}

#[cfg(test)]
#[path = "interference_tests.rs"]
mod tests;
