// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for subcommands: load participants and assemble a `Router`.

use std::path::Path;
use std::sync::Arc;

use claodex_router::{JsonlEventBus, Router, RoutingConfig};

pub fn build_router(workspace_root: &Path, dry_run: bool) -> anyhow::Result<Router> {
    let participants = claodex_store::load_participants(workspace_root)?;
    let config = RoutingConfig::from_env();
    let event_bus: Arc<dyn claodex_router::EventBus> = Arc::new(JsonlEventBus::new(workspace_root));

    let router = Router::new(workspace_root.to_path_buf(), participants, config)
        .with_pane_injector(crate::pane_injector(dry_run))
        .with_event_bus(event_bus);
    Ok(router)
}
