// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake pane injector for testing router behavior without a real tmux.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{PaneError, PaneInjector};

/// Recorded pane call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneCall {
    Paste { pane: String, payload: String },
    IsAlive { pane: String },
}

struct FakePaneState {
    alive: HashMap<String, bool>,
    calls: Vec<PaneCall>,
    pastes: HashMap<String, Vec<String>>,
}

/// Fake pane injector for testing. Every pane is alive by default; call
/// `set_alive` to simulate a crashed or detached pane.
#[derive(Clone)]
pub struct FakePaneInjector {
    inner: Arc<Mutex<FakePaneState>>,
}

impl Default for FakePaneInjector {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakePaneState {
                alive: HashMap::new(),
                calls: Vec::new(),
                pastes: HashMap::new(),
            })),
        }
    }
}

impl FakePaneInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PaneCall> {
        self.inner.lock().calls.clone()
    }

    pub fn pastes_for(&self, pane: &str) -> Vec<String> {
        self.inner.lock().pastes.get(pane).cloned().unwrap_or_default()
    }

    pub fn set_alive(&self, pane: &str, alive: bool) {
        self.inner.lock().alive.insert(pane.to_string(), alive);
    }
}

#[async_trait]
impl PaneInjector for FakePaneInjector {
    async fn paste(&self, pane: &str, payload: &str) -> Result<(), PaneError> {
        let mut inner = self.inner.lock();
        inner.calls.push(PaneCall::Paste { pane: pane.to_string(), payload: payload.to_string() });
        inner.pastes.entry(pane.to_string()).or_default().push(payload.to_string());
        if !inner.alive.get(pane).copied().unwrap_or(true) {
            return Err(PaneError::NotFound(pane.to_string()));
        }
        Ok(())
    }

    async fn is_alive(&self, pane: &str) -> Result<bool, PaneError> {
        let mut inner = self.inner.lock();
        inner.calls.push(PaneCall::IsAlive { pane: pane.to_string() });
        Ok(inner.alive.get(pane).copied().unwrap_or(true))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
