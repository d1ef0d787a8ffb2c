// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use claodex_collab::{run_idle_tick, IdleWatches};

pub async fn run(workspace_root: &Path, dry_run: bool) -> anyhow::Result<()> {
    let mut router = crate::workspace::build_router(workspace_root, dry_run)?;
    let mut watches = IdleWatches::new();

    let report = run_idle_tick(&mut router, &mut watches, workspace_root).await;

    for agent in &report.reregistered {
        println!("re-registered: {agent}");
    }
    for agent in &report.expired {
        println!("watch expired: {agent}");
    }
    for turn in &report.completed {
        println!("--- {} ---\n{}", turn.agent, turn.text);
    }
    if let Some(seed) = &report.collab_initiated {
        println!("{} volunteered a collab: {}", seed.response.agent, seed.response.text);
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
