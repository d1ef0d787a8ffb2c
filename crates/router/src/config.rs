// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the router crate.

use claodex_core::constants::{DEFAULT_POLL_SECONDS, DEFAULT_TURN_TIMEOUT_SECONDS};

/// Runtime tuning values for router behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingConfig {
    pub poll_seconds: f64,
    pub turn_timeout_seconds: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            poll_seconds: DEFAULT_POLL_SECONDS,
            turn_timeout_seconds: DEFAULT_TURN_TIMEOUT_SECONDS,
        }
    }
}

impl RoutingConfig {
    /// Build from `CLAODEX_POLL_SECONDS` / `CLAODEX_TURN_TIMEOUT_SECONDS`,
    /// falling back to the compiled-in defaults for anything unset or
    /// unparseable.
    pub fn from_env() -> Self {
        Self {
            poll_seconds: poll_seconds(),
            turn_timeout_seconds: turn_timeout_seconds(),
        }
    }
}

fn poll_seconds() -> f64 {
    std::env::var("CLAODEX_POLL_SECONDS")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| *v > 0.0)
        .unwrap_or(DEFAULT_POLL_SECONDS)
}

fn turn_timeout_seconds() -> u64 {
    std::env::var("CLAODEX_TURN_TIMEOUT_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TURN_TIMEOUT_SECONDS)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
