// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C8 Collab Orchestrator: drives the router through a bounded multi-turn
//! exchange between the two agents, watching for convergence and user halt.

use claodex_core::Agent;
use claodex_router::{EventKind, PendingSend, ResponseTurn, Router};
use serde_json::json;

use crate::queue::{HaltQueue, HaltSignal};
use crate::signal::ends_with_converged;

/// What to run: either a fresh user-initiated collab, or one seeded from an
/// agent volunteering via the `[COLLAB]` signal during an idle poll.
pub struct CollabRequest {
    pub turns: u32,
    pub start_agent: Agent,
    pub message: String,
}

/// A completed turn an idle-poll watch surfaced as a collab volunteer. The
/// response text still carries the trailing `[COLLAB]` signal.
pub struct CollabSeed {
    pub pending: PendingSend,
    pub response: ResponseTurn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Converged,
    UserHalt,
    TurnsReached,
    Failed(String),
}

impl StopReason {
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::Converged => "converged",
            StopReason::UserHalt => "user_halt",
            StopReason::TurnsReached => "turns_reached",
            StopReason::Failed(msg) => msg,
        }
    }
}

/// Outcome of one `run`/`run_seeded` call.
#[derive(Debug, Clone)]
pub struct CollabReport {
    pub stop_reason: StopReason,
    pub turns_completed: u32,
    pub transcript: Vec<ResponseTurn>,
}

/// Drives a `Router` through a collab loop, consuming halt/interjection
/// signals from an externally-fed `HaltQueue`.
pub struct CollabOrchestrator {
    router: Router,
    halt_queue: std::sync::Arc<dyn HaltQueue>,
    /// Set when the most recent collab stopped on `user_halt`; consumed by
    /// the caller to prefix the next normal-mode user send.
    halt_prefix_pending: bool,
}

impl CollabOrchestrator {
    pub fn new(router: Router, halt_queue: std::sync::Arc<dyn HaltQueue>) -> Self {
        Self {
            router,
            halt_queue,
            halt_prefix_pending: false,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// True exactly once after a collab stops on `user_halt`; calling this
    /// clears the flag.
    pub fn take_halt_prefix_pending(&mut self) -> bool {
        std::mem::replace(&mut self.halt_prefix_pending, false)
    }

    pub async fn run(&mut self, request: CollabRequest) -> CollabReport {
        self.mark_collab_started().await;

        let pending = match self.router.send_user_message(request.start_agent, &request.message).await {
            Ok(pending) => pending,
            Err(err) => return self.finish(StopReason::Failed(err.to_string()), Vec::new(), None).await,
        };

        self.drive(pending, Vec::new(), 0, request.turns).await
    }

    pub async fn run_seeded(&mut self, seed: CollabSeed, turns: u32) -> CollabReport {
        self.mark_collab_started().await;

        let mut transcript = vec![seed.response.clone()];
        let target = seed.response.agent.peer();
        let pending = match self
            .router
            .send_routed_message(target, seed.response.agent, &seed.response.text, &[], None)
            .await
        {
            Ok(pending) => pending,
            Err(err) => return self.finish(StopReason::Failed(err.to_string()), std::mem::take(&mut transcript), None).await,
        };

        self.drive(pending, transcript, 1, turns).await
    }

    async fn mark_collab_started(&self) {
        let started_at = self.router.now();
        self.router
            .event_bus()
            .update_metrics(json!({"mode": "collab", "started_at": started_at.to_rfc3339()}))
            .await;
    }

    async fn drive(
        &mut self,
        mut pending: PendingSend,
        mut transcript: Vec<ResponseTurn>,
        mut turns_completed: u32,
        turns: u32,
    ) -> CollabReport {
        let mut replay: Vec<String> = Vec::new();
        let mut pending_was_routed = !transcript.is_empty();

        loop {
            let response = match self.router.wait_for_response(&pending).await {
                Ok(response) => response,
                Err(err) => return self.finish(StopReason::Failed(err.to_string()), transcript, None).await,
            };

            turns_completed += 1;
            self.router
                .event_bus()
                .log(EventKind::Recv, &response.text, Some(response.agent), None, None)
                .await;
            transcript.push(response.clone());

            if transcript.len() >= 2 {
                let last = &transcript[transcript.len() - 1];
                let prev = &transcript[transcript.len() - 2];
                if ends_with_converged(&last.text) && ends_with_converged(&prev.text) {
                    return self.finish(StopReason::Converged, transcript, Some(response.agent)).await;
                }
            }

            // One drain covers both the halt check and the interjections this
            // turn picks up: nothing else reads the queue between them, and a
            // halt signal present in the same batch discards any interjections
            // queued alongside it.
            let drained = self.halt_queue.drain();
            let halted = drained.iter().any(|signal| matches!(signal, HaltSignal::Halt));
            let fresh: Vec<String> = if halted {
                Vec::new()
            } else {
                drained
                    .into_iter()
                    .filter_map(|signal| match signal {
                        HaltSignal::Interjection(text) => Some(text),
                        HaltSignal::Halt => None,
                    })
                    .collect()
            };

            if halted {
                self.halt_prefix_pending = true;
                return self.finish(StopReason::UserHalt, transcript, Some(response.agent)).await;
            }

            if turns_completed >= turns {
                return self.finish(StopReason::TurnsReached, transcript, Some(response.agent)).await;
            }

            let echoed_anchor = if pending_was_routed { Some(pending.sent_text.clone()) } else { None };
            let mut user_interjections = replay;
            user_interjections.extend(fresh.iter().cloned());

            pending = match self
                .router
                .send_routed_message(
                    response.agent.peer(),
                    response.agent,
                    &response.text,
                    &user_interjections,
                    echoed_anchor.as_deref(),
                )
                .await
            {
                Ok(pending) => pending,
                Err(err) => return self.finish(StopReason::Failed(err.to_string()), transcript, None).await,
            };
            pending_was_routed = true;
            replay = fresh;
        }
    }

    /// Sync delivery cursors, drop stray interjections, restore idle metrics
    /// mode, and assemble the report. `unrouted_response_agent` is the sender
    /// of a response that was received but never routed onward this call
    /// (i.e., every stop reason except `Failed`), and is excluded from the
    /// delivery-cursor sync so its still-pending text is not marked delivered.
    async fn finish(
        &mut self,
        stop_reason: StopReason,
        transcript: Vec<ResponseTurn>,
        unrouted_response_agent: Option<Agent>,
    ) -> CollabReport {
        let exclude = unrouted_response_agent.map(Agent::peer);
        if let Err(err) = self.router.sync_delivery_cursors(exclude) {
            tracing::warn!(error = %err, "failed to sync delivery cursors at collab shutdown");
        }

        let leftover = self.halt_queue.drain();
        if !leftover.is_empty() {
            tracing::warn!(count = leftover.len(), "dropping queued interjection(s) at collab shutdown");
            self.router
                .event_bus()
                .log(
                    EventKind::Error,
                    &format!("dropped {} queued interjection(s) at collab shutdown", leftover.len()),
                    None,
                    None,
                    None,
                )
                .await;
        }

        self.router
            .event_bus()
            .log(EventKind::Collab, stop_reason.as_str(), None, None, None)
            .await;
        self.router.event_bus().update_metrics(json!({"mode": "idle"})).await;

        let turns_completed = transcript.len() as u32;
        CollabReport {
            stop_reason,
            turns_completed,
            transcript,
        }
    }
}

/// Inspect a completed idle-poll response for an agent-initiated collab
/// volunteer. Mirrors §4.9's rule: the `[COLLAB]` signal must be the last
/// non-empty line, and the text with the signal stripped must be non-empty —
/// a bare `[COLLAB]` line is treated as a normal response, not a seed.
pub fn detect_agent_initiated_collab(pending: &PendingSend, response: &ResponseTurn) -> Option<CollabSeed> {
    if crate::signal::strip_trailing_collab(&response.text).is_none() {
        return None;
    }
    Some(CollabSeed {
        pending: pending.clone(),
        response: response.clone(),
    })
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
