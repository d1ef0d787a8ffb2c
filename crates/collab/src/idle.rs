// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C9 Re-registration Watcher and Idle Poll, driven by the editor's on-idle
//! hook whenever no keystroke has arrived.

use std::collections::HashMap;

use claodex_core::{Agent, ClaodexError, Participant};
use claodex_router::{EventKind, PendingSend, ResponseTurn, Router};

use crate::orchestrator::{detect_agent_initiated_collab, CollabSeed};

/// Pending user-message watches the idle poll advances between normal-mode
/// sends. Owned by the caller (the REPL), not the `Router` — the router only
/// tracks the scan bookkeeping for whichever watches it's asked about.
#[derive(Default)]
pub struct IdleWatches {
    pending: HashMap<Agent, PendingSend>,
}

impl IdleWatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, pending: PendingSend) {
        self.pending.insert(pending.target_agent, pending);
    }

    pub fn clear(&mut self, agent: Agent) {
        self.pending.remove(&agent);
    }

    pub fn get(&self, agent: Agent) -> Option<&PendingSend> {
        self.pending.get(&agent)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Outcome of one idle tick, surfaced to the REPL for logging/UI updates.
#[derive(Debug, Default)]
pub struct IdleTickReport {
    pub reregistered: Vec<Agent>,
    pub expired: Vec<Agent>,
    pub completed: Vec<ResponseTurn>,
    pub collab_initiated: Option<CollabSeed>,
    pub warnings: Vec<String>,
}

/// Run one idle tick: re-registration check, watch expiry, then a
/// non-blocking poll of whatever watches remain.
pub async fn run_idle_tick(
    router: &mut Router,
    watches: &mut IdleWatches,
    workspace_root: &std::path::Path,
) -> IdleTickReport {
    let mut report = IdleTickReport::default();

    for agent in Agent::ALL {
        match check_reregistration(router, workspace_root, agent) {
            Ok(true) => {
                watches.clear(agent);
                report.reregistered.push(agent);
            }
            Ok(false) => {}
            Err(ClaodexError::ParticipantMissing(_)) | Err(ClaodexError::ParticipantSessionMissing(_)) => {
                // Tolerated during idle polling per the spec's MalformedParticipant
                // note: try again next tick.
            }
            Err(err) => {
                report.warnings.push(format!("re-registration check failed for {agent}: {err}"));
            }
        }
    }

    let turn_timeout = router.config().turn_timeout_seconds;
    let now = router.now();
    let expired_agents: Vec<Agent> = Agent::ALL
        .into_iter()
        .filter_map(|agent| {
            let pending = watches.get(agent)?;
            let sent_at = pending.sent_at?;
            let deadline = sent_at + chrono::Duration::seconds(turn_timeout as i64);
            (now >= deadline).then_some(agent)
        })
        .collect();
    for agent in expired_agents {
        if let Some(pending) = watches.get(agent) {
            router.clear_poll_latch(agent, pending.before_cursor);
        }
        watches.clear(agent);
        report.expired.push(agent);
        report.warnings.push(format!("watch for {agent} expired after {turn_timeout}s with no response"));
    }

    let mut resolved = Vec::new();
    for agent in Agent::ALL {
        let Some(pending) = watches.get(agent).cloned() else {
            continue;
        };
        match router.poll_for_response(&pending).await {
            Ok(Some(response)) => {
                router
                    .event_bus()
                    .log(EventKind::Recv, &response.text, Some(response.agent), None, None)
                    .await;
                if let Some(seed) = detect_agent_initiated_collab(&pending, &response) {
                    router
                        .event_bus()
                        .log(EventKind::Collab, "agent volunteered a collab", Some(response.agent), None, None)
                        .await;
                    report.collab_initiated = Some(seed);
                }
                report.completed.push(response);
                resolved.push(agent);
            }
            Ok(None) => {}
            Err(err) => {
                report.warnings.push(format!("poll for {agent} failed: {err}"));
                resolved.push(agent);
            }
        }
    }
    for agent in resolved {
        watches.clear(agent);
    }

    report
}

/// Returns `Ok(true)` if `agent`'s participant record was hot-swapped this
/// tick.
fn check_reregistration(
    router: &mut Router,
    workspace_root: &std::path::Path,
    agent: Agent,
) -> Result<bool, ClaodexError> {
    let loaded = claodex_store::load_participant(workspace_root, agent)?;
    let current = router.participants().for_agent(agent).clone();
    if loaded.session_file == current.session_file {
        return Ok(false);
    }

    let new_lines = claodex_store::count_lines(&loaded.session_file)?;
    claodex_store::write_read_cursor(workspace_root, agent, new_lines)?;
    claodex_store::write_delivery_cursor(workspace_root, agent.peer(), new_lines)?;

    let swapped = Participant {
        agent,
        session_file: loaded.session_file,
        session_id: loaded.session_id,
        cwd: loaded.cwd,
        registered_at: loaded.registered_at,
        tmux_pane: current.tmux_pane,
    };

    let mut participants = router.participants().clone();
    match agent {
        Agent::Claude => participants.claude = swapped,
        Agent::Codex => participants.codex = swapped,
    }
    router.set_participants(participants);
    router.clear_watch_state(agent);

    Ok(true)
}

#[cfg(test)]
#[path = "idle_tests.rs"]
mod tests;
