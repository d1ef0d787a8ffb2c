// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turn-end marker scanning: each dialect signals "the assistant is done
//! responding" a different way, so routing waits for a dialect-specific
//! marker rather than a fixed quiet period.

use claodex_core::Agent;
use serde_json::Value;

/// Result of scanning one delta window for a turn-end marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnEndScan {
    /// Absolute line number of the marker, if one was found in-window.
    pub marker_line: Option<u64>,
    /// Human label for the marker kind (`"turn_duration"`, `"task_complete"`),
    /// present whenever `marker_line` is.
    pub label: Option<String>,
    /// Codex only: whether a `task_started` lifecycle event was seen in this
    /// window without (yet) a matching `task_complete` after it.
    pub saw_codex_task_started: bool,
}

impl TurnEndScan {
    fn none() -> Self {
        TurnEndScan { marker_line: None, label: None, saw_codex_task_started: false }
    }
}

/// Scan one delta window, given as `(absolute_line, parsed_entry)` pairs in
/// source order, for this dialect's turn-end marker.
pub fn scan_turn_end_marker(source: Agent, entries: &[(u64, Value)]) -> TurnEndScan {
    match source {
        Agent::Claude => scan_claude_turn_end_marker(entries),
        Agent::Codex => scan_codex_turn_end_marker(entries),
    }
}

fn scan_claude_turn_end_marker(entries: &[(u64, Value)]) -> TurnEndScan {
    for (line, entry) in entries {
        if entry.get("type").and_then(Value::as_str) != Some("system") {
            continue;
        }
        if entry.get("subtype").and_then(Value::as_str) != Some("turn_duration") {
            continue;
        }
        // the first marker in-window wins; later ones belong to turns we've
        // already consumed in a prior poll.
        return TurnEndScan {
            marker_line: Some(*line),
            label: Some("turn_duration".to_string()),
            saw_codex_task_started: false,
        };
    }
    TurnEndScan::none()
}

fn scan_codex_turn_end_marker(entries: &[(u64, Value)]) -> TurnEndScan {
    let mut saw_started = false;
    let mut first_complete_without_started: Option<u64> = None;

    for (line, entry) in entries {
        if entry.get("type").and_then(Value::as_str) != Some("event_msg") {
            continue;
        }
        let payload_type = entry
            .get("payload")
            .and_then(|payload| payload.get("type"))
            .and_then(Value::as_str);
        match payload_type {
            Some("task_started") => saw_started = true,
            Some("task_complete") => {
                if saw_started {
                    // first post-start complete wins; a later one in this
                    // window belongs to a turn we haven't been asked about yet.
                    return TurnEndScan {
                        marker_line: Some(*line),
                        label: Some("task_complete".to_string()),
                        saw_codex_task_started: true,
                    };
                }
                first_complete_without_started.get_or_insert(*line);
            }
            _ => {}
        }
    }

    if saw_started {
        // a task_started with no post-start complete yet: the turn hasn't
        // ended, even if a stale pre-start complete was seen earlier.
        return TurnEndScan { marker_line: None, label: None, saw_codex_task_started: true };
    }

    match first_complete_without_started {
        Some(complete) => TurnEndScan {
            marker_line: Some(complete),
            label: Some("task_complete".to_string()),
            saw_codex_task_started: false,
        },
        None => TurnEndScan::none(),
    }
}

#[cfg(test)]
#[path = "turn_end_tests.rs"]
mod tests;
