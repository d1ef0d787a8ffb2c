// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! claodex - routes messages between two paired coding agents.
//!
//! This binary wires `claodex-store`/`claodex-router`/`claodex-collab`
//! together behind a handful of scriptable subcommands. The terminal line
//! editor, the curses status sidebar, and tmux pane/session management are
//! external collaborators (per spec.md §1) that a real deployment runs
//! alongside this binary; this crate exists so the workspace produces a
//! runnable artifact, not to reimplement that terminal UI.

mod commands;
mod workspace;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use claodex_core::Agent;

#[derive(Parser)]
#[command(name = "claodex", version, about = "Routes messages between two paired coding agents")]
struct Cli {
    /// Workspace root (defaults to the current directory).
    #[arg(short = 'C', long = "dir", global = true, value_name = "DIR")]
    workspace_root: Option<PathBuf>,

    /// Use the no-op pane injector instead of tmux (for scripting/tests).
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create `.claodex/` state directories and the workspace `.gitignore` entry.
    Init,
    /// Send a user message to one agent and wait for its response.
    Send {
        agent: Agent,
        /// Message text. Joined with spaces if given as multiple words.
        text: Vec<String>,
    },
    /// Run a bounded multi-turn collab starting with one agent.
    Collab {
        start_agent: Agent,
        /// Message text for the first turn.
        text: Vec<String>,
        /// Number of turns to run before stopping unconditionally.
        #[arg(long)]
        turns: Option<u32>,
    },
    /// Run one re-registration/expiry/poll idle tick and report what happened.
    Idle,
    /// Print the current read/delivery cursor snapshot.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let workspace_root = cli
        .workspace_root
        .map(Ok)
        .unwrap_or_else(std::env::current_dir)?;

    match cli.command {
        Commands::Init => commands::init::run(&workspace_root),
        Commands::Send { agent, text } => {
            commands::send::run(&workspace_root, agent, &text.join(" "), cli.dry_run).await
        }
        Commands::Collab { start_agent, text, turns } => {
            commands::collab::run(&workspace_root, start_agent, &text.join(" "), turns, cli.dry_run).await
        }
        Commands::Idle => commands::idle::run(&workspace_root, cli.dry_run).await,
        Commands::Status => commands::status::run(&workspace_root),
    }
}

pub(crate) fn pane_injector(dry_run: bool) -> Arc<dyn claodex_router::PaneInjector> {
    if dry_run {
        Arc::new(claodex_router::NoOpPaneInjector)
    } else {
        Arc::new(claodex_router::TmuxPaneInjector::new())
    }
}
