// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status-sidebar sink contract. claodex's curses sidebar (out of scope for
//! this crate per spec.md §1) consumes `ui/events.jsonl` and `ui/metrics.json`;
//! the router only needs a narrow trait to push into that boundary.

use async_trait::async_trait;
use claodex_core::Agent;
use serde_json::Value;

/// Event kind recognized by the status sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Sent,
    Recv,
    Collab,
    Watch,
    Error,
    System,
    Status,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Sent => "sent",
            EventKind::Recv => "recv",
            EventKind::Collab => "collab",
            EventKind::Watch => "watch",
            EventKind::Error => "error",
            EventKind::System => "system",
            EventKind::Status => "status",
        }
    }
}

/// Sink for router/collab progress, consumed by the (external) curses
/// sidebar. Never read from by the core itself — write-only.
#[async_trait]
pub trait EventBus: Send + Sync + 'static {
    async fn log(
        &self,
        kind: EventKind,
        message: &str,
        agent: Option<Agent>,
        target: Option<Agent>,
        meta: Option<Value>,
    );

    /// Atomically replace the sidebar's metrics snapshot with `partial`
    /// merged over whatever was previously recorded.
    async fn update_metrics(&self, partial: Value);
}

/// Event bus that discards everything. Useful for headless routing (tests,
/// a CLI invocation with no sidebar attached).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpEventBus;

#[async_trait]
impl EventBus for NoOpEventBus {
    async fn log(
        &self,
        _kind: EventKind,
        _message: &str,
        _agent: Option<Agent>,
        _target: Option<Agent>,
        _meta: Option<Value>,
    ) {
    }

    async fn update_metrics(&self, _partial: Value) {}
}

mod file;
pub use file::JsonlEventBus;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeEventBus;

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
