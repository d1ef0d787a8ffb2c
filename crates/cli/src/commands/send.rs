// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use claodex_core::Agent;

pub async fn run(workspace_root: &Path, agent: Agent, text: &str, dry_run: bool) -> anyhow::Result<()> {
    let mut router = crate::workspace::build_router(workspace_root, dry_run)?;

    let pending = router.send_user_message(agent, text).await?;
    println!("sent to {agent}, awaiting response...");

    let response = router.wait_for_response(&pending).await?;
    println!("--- {} ---\n{}", response.agent, response.text);
    Ok(())
}
