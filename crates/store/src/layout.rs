// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-relative paths for claodex's `.claodex/` state directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use claodex_core::{Agent, ClaodexError};

pub const STATE_DIR: &str = ".claodex";
const PARTICIPANTS_DIR: &str = "participants";
const CURSORS_DIR: &str = "cursors";
const DELIVERY_DIR: &str = "delivery";
const EXCHANGES_DIR: &str = "exchanges";
const INBOX_DIR: &str = "inbox";

pub fn state_root(workspace_root: &Path) -> PathBuf {
    workspace_root.join(STATE_DIR)
}

pub fn participants_dir(workspace_root: &Path) -> PathBuf {
    state_root(workspace_root).join(PARTICIPANTS_DIR)
}

pub fn participant_file(workspace_root: &Path, agent: Agent) -> PathBuf {
    participants_dir(workspace_root).join(format!("{agent}.json"))
}

pub fn read_cursor_file(workspace_root: &Path, source_agent: Agent) -> PathBuf {
    state_root(workspace_root)
        .join(CURSORS_DIR)
        .join(format!("read-{source_agent}.cursor"))
}

pub fn delivery_cursor_file(workspace_root: &Path, target_agent: Agent) -> PathBuf {
    state_root(workspace_root)
        .join(DELIVERY_DIR)
        .join(format!("to-{target_agent}.cursor"))
}

pub fn exchanges_dir(workspace_root: &Path) -> PathBuf {
    state_root(workspace_root).join(EXCHANGES_DIR)
}

const UI_DIR: &str = "ui";

pub fn ui_dir(workspace_root: &Path) -> PathBuf {
    state_root(workspace_root).join(UI_DIR)
}

pub fn ui_events_file(workspace_root: &Path) -> PathBuf {
    ui_dir(workspace_root).join("events.jsonl")
}

pub fn ui_metrics_file(workspace_root: &Path) -> PathBuf {
    ui_dir(workspace_root).join("metrics.json")
}

/// Fallback delivery directory for a target whose pane cannot currently
/// accept a paste (dead pane, detached session). Not wired into the router
/// yet — reserved for the re-registration watcher's recovery path.
pub fn inbox_dir(workspace_root: &Path) -> PathBuf {
    state_root(workspace_root).join(INBOX_DIR)
}

/// Create every runtime state directory claodex needs, idempotently.
pub fn ensure_state_layout(workspace_root: &Path) -> Result<(), ClaodexError> {
    for dir in [
        state_root(workspace_root),
        participants_dir(workspace_root),
        state_root(workspace_root).join(CURSORS_DIR),
        state_root(workspace_root).join(DELIVERY_DIR),
        exchanges_dir(workspace_root),
        inbox_dir(workspace_root),
        ui_dir(workspace_root),
    ] {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Create `.claodex/.gitignore` with `"*\n"` so nothing under the state
/// root is ever accidentally tracked, without touching the workspace's own
/// root-level `.gitignore`. Idempotent: an existing file (even with custom
/// contents) is left alone.
pub fn ensure_claodex_gitignore(workspace_root: &Path) -> Result<(), ClaodexError> {
    let gitignore = state_root(workspace_root).join(".gitignore");
    if gitignore.exists() {
        return Ok(());
    }
    if let Some(parent) = gitignore.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&gitignore, "*\n")?;
    Ok(())
}

/// Append `.claodex/` to the workspace-root `.gitignore`, creating the file
/// if absent and leaving it untouched if the entry is already present.
pub fn ensure_gitignore_entry(workspace_root: &Path) -> Result<(), ClaodexError> {
    let entry = format!("{STATE_DIR}/");
    let gitignore = workspace_root.join(".gitignore");

    if !gitignore.exists() {
        fs::write(&gitignore, format!("{entry}\n"))?;
        return Ok(());
    }

    let contents = fs::read_to_string(&gitignore)?;
    let lines: Vec<&str> = contents.lines().collect();
    if lines.iter().any(|line| *line == entry) {
        return Ok(());
    }

    let mut handle = fs::OpenOptions::new().append(true).open(&gitignore)?;
    if lines.last().is_some_and(|last| !last.is_empty()) {
        handle.write_all(b"\n")?;
    }
    handle.write_all(format!("{entry}\n").as_bytes())?;
    Ok(())
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
