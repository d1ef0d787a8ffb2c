// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw JSONL line-window access: counting physical lines and reading a
//! 1-indexed slice between two cursors.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use claodex_core::ClaodexError;

/// Count physical lines in a text file. Returns 0 if the file doesn't exist
/// yet (a session log may not have been created the instant a participant
/// registers).
pub fn count_lines(path: &Path) -> Result<u64, ClaodexError> {
    if !path.exists() {
        return Ok(0);
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut count = 0u64;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    Ok(count)
}

/// Read lines strictly after `start_line` (1-indexed, exclusive) and up to
/// `end_line` (inclusive). `end_line == start_line` returns an empty vec.
pub fn read_lines_between(
    path: &Path,
    start_line: u64,
    end_line: u64,
) -> Result<Vec<String>, ClaodexError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx as u64 + 1;
        if line_number <= start_line {
            continue;
        }
        if line_number > end_line {
            break;
        }
        lines.push(line?);
    }
    Ok(lines)
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
