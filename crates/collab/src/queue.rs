// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Halt / interjection channel between the editor's background "halt
//! listener" thread and the collab orchestrator loop.
//!
//! The editor itself is an external collaborator (spec'd, not built here);
//! this module only defines the narrow queue contract the orchestrator polls
//! each turn, grounded on the shutdown/event channel shape the agent watcher
//! uses for its own background thread.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// One message pushed onto the queue while a collab is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltSignal {
    /// The `/halt` sentinel: stop the collab at the next turn boundary.
    Halt,
    /// Free text the human wants appended to the next routed message.
    Interjection(String),
}

/// Non-blocking queue the orchestrator drains between turns. Implementations
/// must never block the caller — `drain` returns whatever is already queued.
#[async_trait]
pub trait HaltQueue: Send + Sync + 'static {
    /// Remove and return every signal queued so far, oldest first.
    fn drain(&self) -> Vec<HaltSignal>;

    /// Push one signal onto the queue. Used by the editor's halt-listener
    /// thread (or, in tests, directly).
    fn push(&self, signal: HaltSignal);
}

/// Queue that never holds anything. Used when a collab runs with no
/// halt-listener attached (e.g. a headless/programmatic collab).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHaltQueue;

impl HaltQueue for NoOpHaltQueue {
    fn drain(&self) -> Vec<HaltSignal> {
        Vec::new()
    }

    fn push(&self, _signal: HaltSignal) {}
}

/// Mutex-backed queue for a single collab run, fed by an mpsc sender the
/// halt-listener thread holds.
pub struct ChannelHaltQueue {
    buffer: Mutex<VecDeque<HaltSignal>>,
    receiver: Mutex<mpsc::UnboundedReceiver<HaltSignal>>,
}

impl ChannelHaltQueue {
    /// Build a queue paired with the sender the halt-listener thread should
    /// hold and push onto.
    pub fn new() -> (Self, mpsc::UnboundedSender<HaltSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                buffer: Mutex::new(VecDeque::new()),
                receiver: Mutex::new(rx),
            },
            tx,
        )
    }
}

impl HaltQueue for ChannelHaltQueue {
    fn drain(&self) -> Vec<HaltSignal> {
        let mut receiver = self.receiver.lock();
        let mut buffer = self.buffer.lock();
        while let Ok(signal) = receiver.try_recv() {
            buffer.push_back(signal);
        }
        buffer.drain(..).collect()
    }

    fn push(&self, signal: HaltSignal) {
        self.buffer.lock().push_back(signal);
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
