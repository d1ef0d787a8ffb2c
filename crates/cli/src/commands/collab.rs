// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use claodex_collab::{CollabOrchestrator, CollabRequest, NoOpHaltQueue};
use claodex_core::{constants::DEFAULT_COLLAB_TURNS, Agent};

pub async fn run(
    workspace_root: &Path,
    start_agent: Agent,
    text: &str,
    turns: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let router = crate::workspace::build_router(workspace_root, dry_run)?;
    let mut orchestrator = CollabOrchestrator::new(router, Arc::new(NoOpHaltQueue));

    let request = CollabRequest {
        turns: turns.unwrap_or(DEFAULT_COLLAB_TURNS),
        start_agent,
        message: text.to_string(),
    };

    let report = orchestrator.run(request).await;
    for turn in &report.transcript {
        println!("--- {} ---\n{}\n", turn.agent, turn.text);
    }
    println!(
        "stopped after {} turn(s): {}",
        report.turns_completed,
        report.stop_reason.as_str()
    );

    if matches!(report.stop_reason, claodex_collab::StopReason::Failed(_)) {
        anyhow::bail!("collab stopped with an error: {}", report.stop_reason.as_str());
    }
    Ok(())
}
