// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routing signals an agent can emit on its last non-empty line to steer the
//! collab orchestrator: `[CONVERGED]` to request a natural stop, `[COLLAB]`
//! to volunteer a collaboration with the peer.

const CONVERGED: &str = "[CONVERGED]";
const COLLAB: &str = "[COLLAB]";

/// The last non-empty line of `text`, or `None` if `text` is all blank.
fn last_non_empty_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rev().find(|line| !line.is_empty())
}

/// True if `text` ends, on its last non-empty line, with the literal
/// `[CONVERGED]` signal (whitespace-stripped). A mid-message mention on an
/// earlier line followed by more text does not count.
pub fn ends_with_converged(text: &str) -> bool {
    last_non_empty_line(text) == Some(CONVERGED)
}

/// True if `text` ends, on its last non-empty line, with the literal
/// `[COLLAB]` signal.
pub fn ends_with_collab(text: &str) -> bool {
    last_non_empty_line(text) == Some(COLLAB)
}

/// Strip a trailing `[COLLAB]` signal line from `text`, returning the text
/// with that line (and the blank lines around it) removed. Returns `None` if
/// the text does not end with the signal, or if stripping it leaves nothing.
pub fn strip_trailing_collab(text: &str) -> Option<String> {
    if !ends_with_collab(text) {
        return None;
    }
    let stripped = strip_last_non_empty_line(text);
    let stripped = stripped.trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Remove the last non-empty line (and any trailing blank lines after it)
/// from `text`.
fn strip_last_non_empty_line(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let last_content_idx = lines.iter().rposition(|line| !line.trim().is_empty());
    match last_content_idx {
        Some(idx) => lines[..idx].join("\n"),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
