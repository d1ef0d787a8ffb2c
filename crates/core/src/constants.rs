// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-wide tuning values and protocol signals shared by the router and
//! collab crates. Filesystem layout constants live in `claodex-store`
//! instead, next to the path helpers that use them.

/// tmux session name claodex registers its panes under.
pub const SESSION_NAME: &str = "claodex";

/// Default poll interval for the router's wait/refresh loops, in seconds.
pub const DEFAULT_POLL_SECONDS: f64 = 0.5;

/// Default number of turns a collab run will execute before stopping itself.
pub const DEFAULT_COLLAB_TURNS: u32 = 500;

/// Suffix an agent appends to a turn to signal it believes collaboration has
/// converged. Two consecutive turns carrying this from both agents end the
/// collab loop.
pub const CONVERGE_SIGNAL: &str = "[CONVERGED]";

/// Prefix recognized by the CLI to start a collab run from a normal-mode send.
pub const COLLAB_SIGNAL: &str = "[COLLAB]";

/// Default ceiling on how long the router waits for one response turn.
pub const DEFAULT_TURN_TIMEOUT_SECONDS: u64 = 18_000;

/// Consecutive no-progress `refresh_source` attempts before a read cursor is
/// force-skipped past a line that won't parse.
pub const STUCK_SKIP_ATTEMPTS: u32 = 3;

/// Elapsed wall-clock seconds of no-progress before the same force-skip
/// applies, regardless of attempt count.
pub const STUCK_SKIP_SECONDS: f64 = 10.0;

/// `strftime`-style path template for a Claude Code debug log, keyed by
/// session id. Used by the Stop-event fallback when `turn_duration` never
/// appears in the session transcript.
pub const CLAUDE_DEBUG_LOG_PATTERN: &str = "~/.claude/debug/{session_id}.txt";

/// Regex for the Stop hook dispatch line in a Claude Code debug log.
/// Anchored on an ISO timestamp prefix so it doesn't match echoes appearing
/// inside tool output.
pub const CLAUDE_STOP_EVENT_PATTERN: &str =
    r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z)\s+\[DEBUG\]\s+Getting matching hook commands for Stop";
