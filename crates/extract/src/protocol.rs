// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `--- source ---` wire framing used when relaying one pane's turn
//! into another's keystroke stream, and the inverse operation that strips
//! that framing back off when relaying a reply to its human author.

use std::sync::OnceLock;

use claodex_core::ClaodexError;
use regex::Regex;

#[allow(clippy::expect_used)]
fn header_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^---\s*(claude|codex|user)\s*---\s*$").expect("static header regex is valid")
    })
}

/// Frame `body` under a `--- source ---` header. Fails if `body` is empty or
/// all whitespace — there is nothing useful to relay.
pub fn render_block(source: &str, body: &str) -> Result<String, ClaodexError> {
    if body.trim().is_empty() {
        return Err(ClaodexError::Validation("cannot render an empty message block".to_string()));
    }
    Ok(format!("--- {source} ---\n{body}"))
}

/// Strip the last `--- user ---` framed block out of a message that may
/// carry one or more relayed `--- source ---` blocks, returning just that
/// block's body. Walks the message line by line, so any line that sits
/// outside a header+body block (including stray text before the first
/// header) falls back to returning the original message untouched.
pub fn strip_injected_context(message: &str) -> String {
    let text = message.trim();
    if !text.starts_with("---") {
        return message.to_string();
    }

    let pattern = header_line_pattern();
    let mut blocks: Vec<(String, Vec<&str>)> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(caps) = pattern.captures(line.trim()) {
            if let Some(finished) = current.take() {
                blocks.push(finished);
            }
            current = Some((caps[1].to_string(), Vec::new()));
            continue;
        }

        match current.as_mut() {
            Some((_, body_lines)) => body_lines.push(line),
            // a non-header line before any header means the text isn't
            // purely claodex block framing.
            None => return message.to_string(),
        }
    }

    match current.take() {
        Some(finished) => blocks.push(finished),
        None => return message.to_string(),
    }

    for (source, body_lines) in blocks.iter().rev() {
        if source != "user" {
            continue;
        }
        let body = body_lines.join("\n").trim().to_string();
        if !body.is_empty() {
            return body;
        }
    }

    message.to_string()
}

/// Whitespace word count, used for collab-loop progress logging.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
