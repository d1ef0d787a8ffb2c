// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keystroke injection into a tmux pane. claodex never types into a pane
//! character-by-character the way a human does: it pastes the whole
//! rendered block via `tmux load-buffer`/`paste-buffer` and then sends a
//! trailing Enter, with a settling delay in between so the target's input
//! handler isn't overwhelmed by the pane resize/redraw that a large paste
//! can trigger.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum PaneError {
    #[error("pane not found: {0}")]
    NotFound(String),
    #[error("paste failed: {0}")]
    PasteFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Injects rendered message payloads into an agent's interactive pane and
/// reports whether that pane's process is still alive.
#[async_trait]
pub trait PaneInjector: Send + Sync + 'static {
    /// Paste `payload` into `pane`, followed by Enter once input has settled.
    async fn paste(&self, pane: &str, payload: &str) -> Result<(), PaneError>;

    /// Whether the target pane still exists and its process hasn't exited.
    async fn is_alive(&self, pane: &str) -> Result<bool, PaneError>;
}

/// The settling delay between a paste and the trailing Enter: a 300ms base,
/// plus 100ms per 1000 characters beyond the first 2000, capped at 2s so a
/// huge delta never stalls routing.
pub fn settle_delay(payload_len: usize) -> Duration {
    const BASE_MS: u64 = 300;
    const THRESHOLD: usize = 2_000;
    const STEP_CHARS: usize = 1_000;
    const STEP_MS: u64 = 100;
    const CAP_MS: u64 = 2_000;

    let extra_chars = payload_len.saturating_sub(THRESHOLD) as u64;
    let extra_millis = (extra_chars * STEP_MS) / STEP_CHARS as u64;
    let millis = (BASE_MS + extra_millis).min(CAP_MS);
    Duration::from_millis(millis)
}

/// Real tmux-backed pane injector.
#[derive(Clone, Copy, Default)]
pub struct TmuxPaneInjector;

impl TmuxPaneInjector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaneInjector for TmuxPaneInjector {
    async fn paste(&self, pane: &str, payload: &str) -> Result<(), PaneError> {
        let buffer_name = format!("claodex-{pane}");
        let mut load = Command::new("tmux")
            .args(["load-buffer", "-b", &buffer_name, "-"])
            .stdin(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| PaneError::CommandFailed(e.to_string()))?;
        if let Some(mut stdin) = load.stdin.take() {
            use tokio::io::AsyncWriteExt;
            stdin
                .write_all(payload.as_bytes())
                .await
                .map_err(|e| PaneError::PasteFailed(e.to_string()))?;
        }
        let status = load
            .wait()
            .await
            .map_err(|e| PaneError::CommandFailed(e.to_string()))?;
        if !status.success() {
            return Err(PaneError::PasteFailed(format!("tmux load-buffer failed for {pane}")));
        }

        let output = Command::new("tmux")
            .args(["paste-buffer", "-b", &buffer_name, "-t", pane, "-d"])
            .output()
            .await
            .map_err(|e| PaneError::CommandFailed(e.to_string()))?;
        if !output.status.success() {
            return Err(PaneError::PasteFailed(format!(
                "tmux paste-buffer failed for {pane}: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        tokio::time::sleep(settle_delay(payload.len())).await;

        let output = Command::new("tmux")
            .args(["send-keys", "-t", pane, "Enter"])
            .output()
            .await
            .map_err(|e| PaneError::CommandFailed(e.to_string()))?;
        if !output.status.success() {
            return Err(PaneError::NotFound(pane.to_string()));
        }
        Ok(())
    }

    async fn is_alive(&self, pane: &str) -> Result<bool, PaneError> {
        let output = Command::new("tmux")
            .args(["has-session", "-t", pane])
            .output()
            .await
            .map_err(|e| PaneError::CommandFailed(e.to_string()))?;
        Ok(output.status.success())
    }
}

/// Pane injector that does nothing, for minimal deployments or dry runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpPaneInjector;

#[async_trait]
impl PaneInjector for NoOpPaneInjector {
    async fn paste(&self, _pane: &str, _payload: &str) -> Result<(), PaneError> {
        Ok(())
    }

    async fn is_alive(&self, _pane: &str) -> Result<bool, PaneError> {
        Ok(false)
    }
}

pub fn debug_log_path(session_id: &str) -> std::path::PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| Path::new("/").to_path_buf());
    home.join(".claude")
        .join("debug")
        .join(format!("{session_id}.txt"))
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePaneInjector, PaneCall};

#[cfg(test)]
#[path = "pane_tests.rs"]
mod tests;
