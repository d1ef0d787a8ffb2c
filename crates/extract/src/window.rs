// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-pass parse-then-classify extraction over one JSONL delta window.
//!
//! The first pass classifies every line as parsed-JSON-object or not and
//! finds the last relative line that parsed successfully. The second pass
//! turns parse failures before that point into warnings (a transient
//! malformed row surrounded by good ones) and a parse failure at or after
//! that point into the new cursor boundary — we never advance the read
//! cursor past a line we couldn't parse, in case it's a write still in
//! flight.

use claodex_core::{Agent, EventSource, RoomEvent};
use serde_json::Value;

use crate::claude::extract_claude_room_events;
use crate::codex::extract_codex_room_events;
use crate::protocol::strip_injected_context;

pub struct WindowExtraction {
    pub events: Vec<RoomEvent>,
    pub last_success_line: u64,
    pub warnings: Vec<String>,
}

enum ParsedRow {
    Ok { relative_line: u64, value: Value },
    Err { relative_line: u64, absolute_line: u64, message: String },
}

/// Extract normalized room events from one source-log delta window.
///
/// `start_line` is the last absolute line processed before this window;
/// `delta_lines` are the raw lines strictly after it, in source order.
pub fn extract_room_events_from_window(
    source: Agent,
    delta_lines: &[String],
    start_line: u64,
) -> WindowExtraction {
    let mut rows = Vec::with_capacity(delta_lines.len());
    for (offset, raw_line) in delta_lines.iter().enumerate() {
        let relative_line = offset as u64 + 1;
        let absolute_line = start_line + relative_line;
        if raw_line.trim().is_empty() {
            rows.push(ParsedRow::Err {
                relative_line,
                absolute_line,
                message: "empty line".to_string(),
            });
            continue;
        }
        match serde_json::from_str::<Value>(raw_line) {
            Ok(value) if value.is_object() => rows.push(ParsedRow::Ok { relative_line, value }),
            Ok(_) => rows.push(ParsedRow::Err {
                relative_line,
                absolute_line,
                message: "expected JSON object".to_string(),
            }),
            Err(err) => rows.push(ParsedRow::Err {
                relative_line,
                absolute_line,
                message: err.to_string(),
            }),
        }
    }

    let last_success_relative_line = rows
        .iter()
        .filter_map(|row| match row {
            ParsedRow::Ok { relative_line, .. } => Some(*relative_line),
            ParsedRow::Err { .. } => None,
        })
        .max()
        .unwrap_or(0);

    let mut warnings = Vec::new();
    let mut valid_entries = Vec::new();
    for row in &rows {
        match row {
            ParsedRow::Err {
                relative_line,
                absolute_line,
                message,
            } => {
                if *relative_line < last_success_relative_line {
                    tracing::warn!(source = %source, line = absolute_line, %message, "malformed native log entry");
                    warnings.push(format!(
                        "warning: malformed native log entry at line {absolute_line}: {message}"
                    ));
                    continue;
                }
                tracing::warn!(source = %source, line = absolute_line, %message, "malformed native log tail entry, holding cursor");
                warnings.push(format!(
                    "warning: malformed native log tail entry at line {absolute_line}: {message}"
                ));
                break;
            }
            ParsedRow::Ok { relative_line, value } => {
                if *relative_line > last_success_relative_line {
                    break;
                }
                valid_entries.push(value.clone());
            }
        }
    }

    let events = match source {
        Agent::Claude => extract_claude_room_events(&valid_entries),
        Agent::Codex => {
            let (events, codex_warnings) = extract_codex_room_events(&valid_entries);
            warnings.extend(codex_warnings);
            events
        }
    };
    let events = strip_injected_context_from_user_events(events);

    WindowExtraction {
        events,
        last_success_line: start_line + last_success_relative_line,
        warnings,
    }
}

/// Post-processing for `user-*` rows: collapse any nested `--- source ---`
/// framing back down to the most recent `user` block (so a routed message
/// echoed into a pane and later read back by the peer's own extractor
/// doesn't carry the framing as literal text), then drop anything that
/// trims to empty.
fn strip_injected_context_from_user_events(events: Vec<RoomEvent>) -> Vec<RoomEvent> {
    events
        .into_iter()
        .filter_map(|mut event| {
            if matches!(event.source, EventSource::User(_)) {
                event.body = strip_injected_context(&event.body).trim().to_string();
            }
            if event.body.trim().is_empty() {
                return None;
            }
            Some(event)
        })
        .collect()
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
