// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fallback turn-end detection for Claude Code: when a `turn_duration`
//! system row never lands in the session transcript (it can be suppressed
//! by some skill configurations), fall back to watching the Claude Code
//! debug log for its Stop hook dispatch line.

use std::fs;
use std::sync::OnceLock;

use chrono::{DateTime, SubsecRound, Utc};
use regex::Regex;

use claodex_core::constants::CLAUDE_STOP_EVENT_PATTERN;

use crate::pane::debug_log_path;

#[allow(clippy::expect_used)]
fn stop_event_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(CLAUDE_STOP_EVENT_PATTERN).expect("static stop-event regex is valid"))
}

/// Tracks the read offset into one Claude Code debug log across repeated
/// polls, so a long-running wait doesn't re-scan the whole file each time.
pub struct DebugLogWatch {
    offset: u64,
}

impl Default for DebugLogWatch {
    fn default() -> Self {
        Self { offset: 0 }
    }
}

impl DebugLogWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan newly appended debug-log bytes for a Stop hook dispatch whose
    /// timestamp is at or after `send_time` (floored to millisecond
    /// precision, matching the log's own resolution).
    pub fn scan(&mut self, session_id: &str, send_time: DateTime<Utc>) -> bool {
        let path = debug_log_path(session_id);
        let Ok(contents) = fs::read(&path) else {
            return false;
        };

        if (contents.len() as u64) < self.offset {
            // log was rotated or truncated; start over.
            self.offset = 0;
        }

        let new_bytes = &contents[self.offset as usize..];
        self.offset = contents.len() as u64;

        let text = String::from_utf8_lossy(new_bytes);
        let floored_send_time = send_time.trunc_subsecs(3);

        for line in text.lines() {
            let Some(captures) = stop_event_pattern().captures(line) else {
                continue;
            };
            let Some(timestamp) = captures.get(1) else { continue };
            let Ok(event_time) = DateTime::parse_from_rfc3339(timestamp.as_str()) else {
                continue;
            };
            if event_time.with_timezone(&Utc) >= floored_send_time {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
#[path = "stop_watch_tests.rs"]
mod tests;
