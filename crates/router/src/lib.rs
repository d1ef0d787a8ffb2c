// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! claodex-router: cursor refresh, message composition, pane delivery, and
//! turn-completion polling (C7), built on the cursor/window primitives in
//! `claodex-store` and the dialect parsing in `claodex-extract`.

pub mod config;
pub mod event_bus;
pub mod pane;
mod router;
pub mod stop_watch;
pub mod types;

pub use config::RoutingConfig;
pub use event_bus::{EventBus, EventKind, JsonlEventBus, NoOpEventBus};
pub use pane::{NoOpPaneInjector, PaneError, PaneInjector, TmuxPaneInjector};
pub use router::Router;
pub use stop_watch::DebugLogWatch;
pub use types::{PendingSend, RenderedBlock, ResponseTurn, StuckCursorState, WaitProgress};

#[cfg(any(test, feature = "test-support"))]
pub use event_bus::FakeEventBus;

#[cfg(any(test, feature = "test-support"))]
pub use pane::{FakePaneInjector, PaneCall};
