// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read and delivery cursor persistence.
//!
//! Cursor files hold a single non-negative decimal line number terminated by
//! `\n`. Writes go through a temp-file-then-rename so a crash mid-write never
//! leaves a cursor half-written (no fsync — cursors are cheap to rebuild from
//! line counts if a write is ever lost, unlike the WAL/snapshot pair this
//! pattern is borrowed from).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use claodex_core::{Agent, ClaodexError, SessionParticipants};

use crate::layout::{delivery_cursor_file, read_cursor_file};
use crate::window::count_lines;

/// Read one cursor file, creating it as `0` if absent.
pub fn read_cursor(path: &Path) -> Result<u64, ClaodexError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        write_cursor(path, 0)?;
        return Ok(0);
    }

    let content = fs::read_to_string(path)?;
    if !content.ends_with('\n') {
        return Err(ClaodexError::CorruptCursor(path.to_path_buf()));
    }
    let trimmed = content.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ClaodexError::CorruptCursor(path.to_path_buf()));
    }
    trimmed
        .parse()
        .map_err(|_| ClaodexError::CorruptCursor(path.to_path_buf()))
}

/// Write one cursor value atomically.
pub fn write_cursor(path: &Path, value: u64) -> Result<(), ClaodexError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, format!("{value}\n"))?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn read_read_cursor(workspace_root: &Path, source_agent: Agent) -> Result<u64, ClaodexError> {
    read_cursor(&read_cursor_file(workspace_root, source_agent))
}

pub fn write_read_cursor(
    workspace_root: &Path,
    source_agent: Agent,
    value: u64,
) -> Result<(), ClaodexError> {
    write_cursor(&read_cursor_file(workspace_root, source_agent), value)
}

pub fn read_delivery_cursor(workspace_root: &Path, target_agent: Agent) -> Result<u64, ClaodexError> {
    read_cursor(&delivery_cursor_file(workspace_root, target_agent))
}

pub fn write_delivery_cursor(
    workspace_root: &Path,
    target_agent: Agent,
    value: u64,
) -> Result<(), ClaodexError> {
    write_cursor(&delivery_cursor_file(workspace_root, target_agent), value)
}

/// Seed all four cursors to the current line counts of both session logs, so
/// a freshly registered pair starts with no backlog of undelivered history.
pub fn initialize_cursors_from_line_counts(
    workspace_root: &Path,
    participants: &SessionParticipants,
) -> Result<(), ClaodexError> {
    let claude_lines = count_lines(&participants.claude.session_file)?;
    let codex_lines = count_lines(&participants.codex.session_file)?;

    write_read_cursor(workspace_root, Agent::Claude, claude_lines)?;
    write_read_cursor(workspace_root, Agent::Codex, codex_lines)?;
    write_delivery_cursor(workspace_root, Agent::Claude, codex_lines)?;
    write_delivery_cursor(workspace_root, Agent::Codex, claude_lines)?;
    Ok(())
}

/// Snapshot of all four cursors, keyed the way status output expects
/// (`read-claude`, `read-codex`, `to-claude`, `to-codex`).
pub fn cursor_snapshot(workspace_root: &Path) -> Result<HashMap<String, u64>, ClaodexError> {
    let mut snapshot = HashMap::new();
    for agent in Agent::ALL {
        snapshot.insert(format!("read-{agent}"), read_read_cursor(workspace_root, agent)?);
    }
    for agent in Agent::ALL {
        snapshot.insert(format!("to-{agent}"), read_delivery_cursor(workspace_root, agent)?);
    }
    Ok(snapshot)
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
