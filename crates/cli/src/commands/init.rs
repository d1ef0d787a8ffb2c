// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

pub fn run(workspace_root: &Path) -> anyhow::Result<()> {
    claodex_store::ensure_state_layout(workspace_root)?;
    claodex_store::ensure_gitignore_entry(workspace_root)?;
    claodex_store::ensure_claodex_gitignore(workspace_root)?;
    println!("initialized {}", claodex_store::layout::state_root(workspace_root).display());
    Ok(())
}
