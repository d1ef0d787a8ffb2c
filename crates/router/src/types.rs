// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Value types passed between the router and its caller across one send/wait
//! cycle.

use chrono::{DateTime, Utc};
use claodex_core::Agent;

/// One rendered `(source, body)` block making up a composed payload, kept
/// around so the exchange log never has to reparse the sent text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub source: String,
    pub body: String,
}

/// Metadata for one message sent to an agent, returned by `send_user_message`
/// / `send_routed_message` and consumed by `wait_for_response` /
/// `poll_for_response`.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub target_agent: Agent,
    pub before_cursor: u64,
    pub sent_text: String,
    pub blocks: Vec<RenderedBlock>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// One completed response turn from an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTurn {
    pub agent: Agent,
    pub text: String,
    pub source_cursor: u64,
    pub received_at: Option<DateTime<Utc>>,
}

/// Tracks repeated parse stalls on one read cursor so `refresh_source` can
/// force a skip past a persistently malformed line. Keyed on the router's
/// `Clock` (not wall-clock `Instant`) so the `STUCK_SKIP_SECONDS` path is
/// exercisable under a `FakeClock`.
#[derive(Debug, Clone, Copy)]
pub struct StuckCursorState {
    pub line: u64,
    pub attempts: u32,
    pub started_at: DateTime<Utc>,
}

/// Per-wait bookkeeping the router keeps between polls of one `PendingSend`,
/// keyed by `(target_agent, before_cursor)`. Lets `poll_for_response` resume
/// exactly where a previous call (or the blocking `wait_for_response` loop)
/// left off instead of re-scanning the whole delta each tick.
#[derive(Debug, Clone)]
pub struct WaitProgress {
    /// Absolute line up to which the turn-end scanner has already looked.
    pub marker_scan_cursor: u64,
    /// Codex only: a `task_started` event has been seen in this wait.
    pub saw_task_started: bool,
    /// Either dialect: at least one assistant event has been observed since
    /// `before_cursor`, even though no marker has (yet) closed the turn.
    pub saw_any_assistant: bool,
    /// Claude only: the debug-log Stop watcher has fired for this wait.
    pub stop_latched: bool,
}

impl WaitProgress {
    pub fn new(before_cursor: u64) -> Self {
        Self {
            marker_scan_cursor: before_cursor,
            saw_task_started: false,
            saw_any_assistant: false,
            stop_latched: false,
        }
    }
}
