// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized room events produced by the extractor and consumed by the router.

use std::fmt;

use crate::agent::Agent;

/// Who produced one extracted room event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// Assistant turn from this agent.
    Agent(Agent),
    /// Human input typed directly into this agent's pane.
    User(Agent),
}

impl EventSource {
    /// The wire label used in session JSONL sender bookkeeping
    /// (`claude`, `codex`, `user-claude`, `user-codex`).
    pub fn wire_label(self) -> String {
        match self {
            EventSource::Agent(agent) => agent.to_string(),
            EventSource::User(agent) => format!("user-{agent}"),
        }
    }

    pub fn is_user(self) -> bool {
        matches!(self, EventSource::User(_))
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_label())
    }
}

/// One normalized turn extracted from a native JSONL window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEvent {
    pub timestamp: String,
    pub source: EventSource,
    pub body: String,
}
