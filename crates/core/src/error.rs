// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the claodex routing engine.

use std::path::PathBuf;
use thiserror::Error;

use crate::agent::Agent;

/// Errors raised across cursor storage, extraction, and routing.
///
/// `SmokeSignal` is deliberately never downgraded to a successful
/// `ResponseTurn` anywhere in this crate family: when a turn-end marker is
/// missing or a marker arrives with no extractable text, the caller must see
/// a hard error rather than a heuristic guess at the agent's response.
#[derive(Debug, Error)]
pub enum ClaodexError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("corrupt cursor: {0}")]
    CorruptCursor(PathBuf),

    #[error("participant missing: {0}")]
    ParticipantMissing(PathBuf),

    #[error("participant session file missing: {0}")]
    ParticipantSessionMissing(PathBuf),

    #[error("read cursor {cursor} exceeds {agent} session length {line_count}")]
    CursorExceedsLength {
        agent: Agent,
        cursor: u64,
        line_count: u64,
    },

    #[error("read cursor cannot move backward")]
    CursorBackward,

    #[error("delivery cursor {delivery_cursor} exceeds peer read cursor {peer_cursor} for {target}")]
    DeliveryExceedsPeer {
        target: Agent,
        delivery_cursor: u64,
        peer_cursor: u64,
    },

    #[error("target pane is not alive: {agent} ({pane})")]
    TargetPaneDead { agent: Agent, pane: String },

    #[error("interference detected in {agent} session: unexpected user input while waiting for collab response. snippet: {snippet:?}")]
    Interference { agent: Agent, snippet: String },

    /// A turn-end marker was observed but no assistant text could be
    /// extracted from the window it closes. Never downgraded to a guess.
    #[error("SMOKE SIGNAL: turn marker for {agent} at line {marker_line} closed with no extractable assistant text")]
    TurnMarkerWithoutText { agent: Agent, marker_line: u64 },

    /// Timeout-class failures, tagged with the spec's short kind string:
    /// `codex-started-no-complete`, `assistant-without-marker`, or
    /// `marker-missing`.
    #[error("SMOKE SIGNAL ({kind}): {agent} produced no completed turn within the timeout")]
    SmokeSignal { agent: Agent, kind: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
