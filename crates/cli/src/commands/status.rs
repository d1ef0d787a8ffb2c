// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use claodex_core::Agent;

pub fn run(workspace_root: &Path) -> anyhow::Result<()> {
    for agent in Agent::ALL {
        let read = claodex_store::read_read_cursor(workspace_root, agent)?;
        let delivery = claodex_store::read_delivery_cursor(workspace_root, agent)?;
        println!("{agent}: read={read} delivery={delivery}");
    }
    Ok(())
}
