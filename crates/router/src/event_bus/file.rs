// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk `EventBus`: appends JSONL rows to `.claodex/ui/events.jsonl` and
//! atomically replaces `.claodex/ui/metrics.json` on every update, per the
//! event bus contract in spec.md §6. This is the in-tree stand-in for the
//! curses status sidebar's data source, not the sidebar itself.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use claodex_core::Agent;
use claodex_store::layout::{ui_events_file, ui_metrics_file};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use super::{EventBus, EventKind};

pub struct JsonlEventBus {
    events_path: PathBuf,
    metrics_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlEventBus {
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            events_path: ui_events_file(workspace_root),
            metrics_path: ui_metrics_file(workspace_root),
            write_lock: Mutex::new(()),
        }
    }

    fn append_event_line(&self, line: &str) -> std::io::Result<()> {
        let _guard = self.write_lock.lock();
        if let Some(parent) = self.events_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut handle = OpenOptions::new().create(true).append(true).open(&self.events_path)?;
        writeln!(handle, "{line}")
    }

    fn replace_metrics(&self, merged: &Value) -> std::io::Result<()> {
        let _guard = self.write_lock.lock();
        if let Some(parent) = self.metrics_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.metrics_path.with_extension("tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(merged).unwrap_or_default())?;
        fs::rename(&tmp_path, &self.metrics_path)
    }

    fn read_metrics(&self) -> Value {
        fs::read_to_string(&self.metrics_path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or(Value::Object(Map::new()))
    }
}

#[async_trait]
impl EventBus for JsonlEventBus {
    async fn log(
        &self,
        kind: EventKind,
        message: &str,
        agent: Option<Agent>,
        target: Option<Agent>,
        meta: Option<Value>,
    ) {
        let row = json!({
            "kind": kind.as_str(),
            "message": message,
            "agent": agent.map(|a| a.as_str()),
            "target": target.map(|a| a.as_str()),
            "meta": meta,
        });
        if let Err(err) = self.append_event_line(&row.to_string()) {
            tracing::warn!(%err, "failed to append to ui/events.jsonl");
        }
    }

    async fn update_metrics(&self, partial: Value) {
        let mut current = self.read_metrics();
        match (&mut current, &partial) {
            (Value::Object(existing), Value::Object(incoming)) => {
                for (key, value) in incoming {
                    existing.insert(key.clone(), value.clone());
                }
            }
            _ => current = partial,
        }
        if let Err(err) = self.replace_metrics(&current) {
            tracing::warn!(%err, "failed to replace ui/metrics.json");
        }
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
