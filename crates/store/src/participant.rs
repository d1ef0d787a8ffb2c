// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Participant file loading and schema validation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use claodex_core::{Agent, ClaodexError, Participant, SessionParticipants};
use serde_json::Value;

use crate::layout::participant_file;

fn read_json(path: &Path) -> Result<Value, ClaodexError> {
    let contents = fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&contents)
        .map_err(|_| ClaodexError::Validation(format!("malformed json: {}", path.display())))?;
    if !payload.is_object() {
        return Err(ClaodexError::Validation(format!(
            "malformed json object: {}",
            path.display()
        )));
    }
    Ok(payload)
}

fn require_str<'a>(payload: &'a Value, field: &str, path: &Path) -> Result<&'a str, ClaodexError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ClaodexError::Validation(format!(
                "participant {field} missing in {}",
                path.display()
            ))
        })
}

fn require_absolute_path(payload: &Value, field: &str, path: &Path) -> Result<PathBuf, ClaodexError> {
    let value = require_str(payload, field, path)?;
    let candidate = PathBuf::from(value);
    if !candidate.is_absolute() {
        return Err(ClaodexError::Validation(format!(
            "participant {field} must be absolute in {}",
            path.display()
        )));
    }
    Ok(candidate)
}

fn validate_timestamp_with_timezone(value: &str, path: &Path) -> Result<(), ClaodexError> {
    let parsed = DateTime::parse_from_rfc3339(value).map_err(|_| {
        ClaodexError::Validation(format!(
            "participant registered_at invalid in {}",
            path.display()
        ))
    })?;
    // DateTime::parse_from_rfc3339 always carries an offset; an explicit
    // "missing timezone" case (as in the original's tzinfo check) can't arise
    // once parsing succeeds, but we keep the check named for parity with the
    // payload's other field-level errors.
    let _ = parsed;
    Ok(())
}

/// Validate the participant JSON payload against the wire schema.
pub fn validate_participant_payload(
    payload: &Value,
    expected_agent: Agent,
    source_path: &Path,
) -> Result<(), ClaodexError> {
    let agent = require_str(payload, "agent", source_path)?;
    if agent != expected_agent.as_str() {
        return Err(ClaodexError::Validation(format!(
            "participant agent mismatch in {}",
            source_path.display()
        )));
    }

    require_absolute_path(payload, "session_file", source_path)?;
    require_str(payload, "session_id", source_path)?;
    require_str(payload, "tmux_pane", source_path)?;
    require_absolute_path(payload, "cwd", source_path)?;

    let registered_at = require_str(payload, "registered_at", source_path)?;
    validate_timestamp_with_timezone(registered_at, source_path)?;
    Ok(())
}

/// Load and validate one participant file.
pub fn load_participant(workspace_root: &Path, agent: Agent) -> Result<Participant, ClaodexError> {
    let path = participant_file(workspace_root, agent);
    if !path.exists() {
        return Err(ClaodexError::ParticipantMissing(path));
    }

    let payload = read_json(&path)?;
    validate_participant_payload(&payload, agent, &path)?;

    let session_file = PathBuf::from(payload["session_file"].as_str().unwrap_or_default())
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from(payload["session_file"].as_str().unwrap_or_default()));
    if !session_file.exists() {
        return Err(ClaodexError::ParticipantSessionMissing(session_file));
    }

    let cwd = PathBuf::from(payload["cwd"].as_str().unwrap_or_default());
    let cwd = cwd.canonicalize().unwrap_or(cwd);

    Ok(Participant {
        agent,
        session_file,
        session_id: payload["session_id"].as_str().unwrap_or_default().to_string(),
        tmux_pane: payload["tmux_pane"].as_str().unwrap_or_default().to_string(),
        cwd,
        registered_at: payload["registered_at"].as_str().unwrap_or_default().to_string(),
    })
}

/// Load both participants from disk.
pub fn load_participants(workspace_root: &Path) -> Result<SessionParticipants, ClaodexError> {
    Ok(SessionParticipants {
        claude: load_participant(workspace_root, Agent::Claude)?,
        codex: load_participant(workspace_root, Agent::Codex)?,
    })
}

#[cfg(test)]
#[path = "participant_tests.rs"]
mod tests;
