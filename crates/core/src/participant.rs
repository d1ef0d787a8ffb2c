// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Participant metadata registered by each agent-side registration skill.
//!
//! claodex never registers agents itself — a participant file is written by
//! an external skill once a tmux pane and native session are up, and the
//! router only ever reads it.

use std::path::PathBuf;

use crate::agent::Agent;
use crate::error::ClaodexError;

/// Metadata for one registered agent participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub agent: Agent,
    /// Absolute path to the native JSONL session log.
    pub session_file: PathBuf,
    /// Source-native session identifier.
    pub session_id: String,
    /// tmux pane id, e.g. `%3`.
    pub tmux_pane: String,
    /// Absolute workspace path from the agent process.
    pub cwd: PathBuf,
    /// ISO 8601 timestamp with a UTC offset.
    pub registered_at: String,
}

/// Both participants for one claodex session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParticipants {
    pub claude: Participant,
    pub codex: Participant,
}

impl SessionParticipants {
    pub fn for_agent(&self, agent: Agent) -> &Participant {
        match agent {
            Agent::Claude => &self.claude,
            Agent::Codex => &self.codex,
        }
    }
}

impl Participant {
    /// Validate that this participant's `agent` field matches the file it
    /// was loaded from, mirroring the original skill-side schema check.
    pub fn validate_agent_matches(&self, expected: Agent) -> Result<(), ClaodexError> {
        if self.agent != expected {
            return Err(ClaodexError::Validation(format!(
                "participant agent mismatch: expected {expected}, got {}",
                self.agent
            )));
        }
        Ok(())
    }
}
