// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers shared by both native-log dialects.

use serde_json::Value;

use regex::Regex;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn utc_rfc3339_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z$")
            .expect("static timestamp regex is valid")
    })
}

/// Return a valid UTC RFC3339 timestamp string from a JSONL entry, or
/// `None` if the `timestamp` field is missing, non-string, or malformed.
pub fn extract_entry_timestamp(entry: &Value) -> Option<String> {
    let timestamp = entry.get("timestamp")?.as_str()?;
    if !utc_rfc3339_pattern().is_match(timestamp) {
        return None;
    }
    Some(timestamp.to_string())
}

const GROUP_CHAT_USER_PREFIXES: [&str; 4] = ["/group-chat", "$group-chat", "/group", "$group"];

/// Strip a leading group-chat command prefix from user text.
///
/// An exact-match prefix collapses to an empty string; a prefix followed by
/// a space strips the prefix and leading whitespace; anything else returns
/// the original text unstripped.
pub fn strip_group_chat_prefix(text: &str) -> String {
    let stripped = text.trim_start();
    for prefix in GROUP_CHAT_USER_PREFIXES {
        if stripped == prefix {
            return String::new();
        }
        if let Some(rest) = stripped.strip_prefix(&format!("{prefix} ")) {
            return rest.trim_start().to_string();
        }
    }
    text.to_string()
}

#[cfg(test)]
#[path = "common_tests.rs"]
mod tests;
