// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake event bus for router/collab tests: records calls in memory instead
//! of writing `ui/events.jsonl` / `ui/metrics.json`.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;

use async_trait::async_trait;
use claodex_core::Agent;
use parking_lot::Mutex;
use serde_json::Value;

use super::{EventBus, EventKind};

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEvent {
    pub kind: EventKind,
    pub message: String,
    pub agent: Option<Agent>,
    pub target: Option<Agent>,
    pub meta: Option<Value>,
}

#[derive(Clone, Default)]
pub struct FakeEventBus {
    events: Arc<Mutex<Vec<LoggedEvent>>>,
    metrics: Arc<Mutex<Value>>,
}

impl FakeEventBus {
    pub fn new() -> Self {
        Self { events: Arc::new(Mutex::new(Vec::new())), metrics: Arc::new(Mutex::new(Value::Null)) }
    }

    pub fn events(&self) -> Vec<LoggedEvent> {
        self.events.lock().clone()
    }

    pub fn metrics(&self) -> Value {
        self.metrics.lock().clone()
    }
}

#[async_trait]
impl EventBus for FakeEventBus {
    async fn log(
        &self,
        kind: EventKind,
        message: &str,
        agent: Option<Agent>,
        target: Option<Agent>,
        meta: Option<Value>,
    ) {
        self.events.lock().push(LoggedEvent {
            kind,
            message: message.to_string(),
            agent,
            target,
            meta,
        });
    }

    async fn update_metrics(&self, partial: Value) {
        let mut metrics = self.metrics.lock();
        if let (Value::Object(existing), Value::Object(incoming)) = (&mut *metrics, &partial) {
            for (key, value) in incoming {
                existing.insert(key.clone(), value.clone());
            }
        } else {
            *metrics = partial;
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
