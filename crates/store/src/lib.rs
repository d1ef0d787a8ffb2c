// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! claodex-store: on-disk workspace state — participant registry, cursor
//! files, and the JSONL window reader the router and extractor build on.

pub mod cursor;
pub mod layout;
pub mod participant;
pub mod window;

pub use cursor::{
    cursor_snapshot, initialize_cursors_from_line_counts, read_delivery_cursor, read_read_cursor,
    write_delivery_cursor, write_read_cursor,
};
pub use layout::{ensure_claodex_gitignore, ensure_gitignore_entry, ensure_state_layout};
pub use participant::{load_participant, load_participants};
pub use window::{count_lines, read_lines_between};
