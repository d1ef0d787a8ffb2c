// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C7 Router: composes and delivers messages to each agent's pane, tracks
//! in-flight sends, and decides when a turn has completed.
//!
//! This is the only component that mutates the Cursor Store (C1) at
//! runtime. Everything else either reads through it (the extractor, the
//! turn-end scanner) or calls into it (the collab orchestrator).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use claodex_core::{Agent, ClaodexError, Clock, EventSource, RoomEvent, SessionParticipants, SystemClock};
use claodex_extract::{
    detect_interference, extract_room_events_from_window, latest_assistant_text_respecting_tool_chain,
    render_block, scan_turn_end_marker,
};
use claodex_store::{
    count_lines, read_delivery_cursor, read_lines_between, read_read_cursor, write_delivery_cursor,
    write_read_cursor,
};
use serde_json::Value;

use crate::config::RoutingConfig;
use crate::event_bus::{EventBus, EventKind, NoOpEventBus};
use crate::pane::{NoOpPaneInjector, PaneInjector};
use crate::stop_watch::DebugLogWatch;
use crate::types::{PendingSend, RenderedBlock, ResponseTurn, StuckCursorState, WaitProgress};

/// Builds the raw `(absolute_line, Value)` pairs a window's lines parse to,
/// silently dropping any line that isn't a JSON object — the caller has
/// already bounded the window to `last_success_line`, so every line here is
/// expected to parse.
fn parse_window_entries(lines: &[String], start_line: u64) -> Vec<(u64, Value)> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(offset, raw)| {
            serde_json::from_str::<Value>(raw)
                .ok()
                .filter(Value::is_object)
                .map(|value| (start_line + offset as u64 + 1, value))
        })
        .collect()
}

fn parse_window_values(lines: &[String]) -> Vec<Value> {
    lines
        .iter()
        .filter_map(|raw| serde_json::from_str::<Value>(raw).ok().filter(Value::is_object))
        .collect()
}

/// Orchestrates cursor refresh, message composition, pane delivery, and
/// turn-completion polling for one claodex workspace.
pub struct Router {
    workspace_root: PathBuf,
    participants: SessionParticipants,
    config: RoutingConfig,
    clock: Arc<dyn Clock>,
    pane_injector: Arc<dyn PaneInjector>,
    event_bus: Arc<dyn EventBus>,
    stuck_state: HashMap<Agent, StuckCursorState>,
    watch_progress: HashMap<(Agent, u64), WaitProgress>,
    debug_log_watch: HashMap<Agent, DebugLogWatch>,
}

impl Router {
    pub fn new(workspace_root: PathBuf, participants: SessionParticipants, config: RoutingConfig) -> Self {
        Self {
            workspace_root,
            participants,
            config,
            clock: Arc::new(SystemClock),
            pane_injector: Arc::new(NoOpPaneInjector),
            event_bus: Arc::new(NoOpEventBus),
            stuck_state: HashMap::new(),
            watch_progress: HashMap::new(),
            debug_log_watch: HashMap::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_pane_injector(mut self, pane_injector: Arc<dyn PaneInjector>) -> Self {
        self.pane_injector = pane_injector;
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<dyn EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn workspace_root(&self) -> &std::path::Path {
        &self.workspace_root
    }

    pub fn participants(&self) -> &SessionParticipants {
        &self.participants
    }

    /// Replace the live participant records, e.g. after a re-registration
    /// hot swap (C9). Does not touch any cursor.
    pub fn set_participants(&mut self, participants: SessionParticipants) {
        self.participants = participants;
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &Arc<dyn EventBus> {
        &self.event_bus
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// C9 re-registration support: drop whatever stuck-cursor tracking and
    /// in-flight wait bookkeeping this process holds for `agent`, e.g. after
    /// its session file has been hot-swapped.
    pub fn clear_watch_state(&mut self, agent: Agent) {
        self.stuck_state.remove(&agent);
        self.watch_progress.retain(|(watched_agent, _), _| *watched_agent != agent);
        self.debug_log_watch.remove(&agent);
    }

    /// Read one agent's persisted read cursor without refreshing it.
    pub fn read_cursor(&self, agent: Agent) -> Result<u64, ClaodexError> {
        read_read_cursor(&self.workspace_root, agent)
    }

    pub fn delivery_cursor(&self, agent: Agent) -> Result<u64, ClaodexError> {
        read_delivery_cursor(&self.workspace_root, agent)
    }

    /// C1/C2/C3: advance `agent`'s own read cursor as far as the Event
    /// Extractor can parse, applying the bounded stuck-cursor skip policy.
    /// Returns the (possibly unchanged) new read cursor.
    pub fn refresh_source(&mut self, agent: Agent) -> Result<u64, ClaodexError> {
        let session_file = self.participants.for_agent(agent).session_file.clone();
        let old_cursor = read_read_cursor(&self.workspace_root, agent)?;
        let total = count_lines(&session_file)?;

        if old_cursor > total {
            return Err(ClaodexError::CursorExceedsLength { agent, cursor: old_cursor, line_count: total });
        }
        if old_cursor == total {
            self.stuck_state.remove(&agent);
            return Ok(old_cursor);
        }

        let raw_lines = read_lines_between(&session_file, old_cursor, total)?;
        let extraction = extract_room_events_from_window(agent, &raw_lines, old_cursor);
        for warning in &extraction.warnings {
            tracing::warn!(%agent, %warning, "refresh_source warning");
        }

        let mut new_cursor = extraction.last_success_line;
        if new_cursor == old_cursor {
            new_cursor = self.apply_stuck_policy(agent, old_cursor)?;
            if new_cursor == old_cursor {
                return Ok(old_cursor);
            }
        } else {
            self.stuck_state.remove(&agent);
        }

        write_read_cursor(&self.workspace_root, agent, new_cursor)?;
        Ok(new_cursor)
    }

    /// Returns `old_cursor` unless the bounded skip threshold has been hit,
    /// in which case it returns `old_cursor + 1` and clears the tracked
    /// stall. Tracks both repeated-attempt and wall-clock escape hatches.
    fn apply_stuck_policy(&mut self, agent: Agent, line: u64) -> Result<u64, ClaodexError> {
        let now = self.clock.now();
        let state = self
            .stuck_state
            .entry(agent)
            .and_modify(|state| {
                if state.line != line {
                    *state = StuckCursorState { line, attempts: 0, started_at: now };
                }
            })
            .or_insert(StuckCursorState { line, attempts: 0, started_at: now });
        state.attempts += 1;

        let elapsed_seconds = (now - state.started_at).num_milliseconds() as f64 / 1000.0;
        let should_skip = state.attempts >= claodex_core::constants::STUCK_SKIP_ATTEMPTS
            || elapsed_seconds >= claodex_core::constants::STUCK_SKIP_SECONDS;

        if !should_skip {
            return Ok(line);
        }

        self.stuck_state.remove(&agent);
        tracing::warn!(%agent, line, "stuck cursor force-skipped by one line");
        Ok(line + 1)
    }

    /// C7 delta builder: refreshes `peer(target)`'s own cursor, enforces
    /// the delivery-cursor invariant, and extracts the undelivered window.
    pub fn build_delta_for_target(&mut self, target: Agent) -> Result<(Vec<RoomEvent>, u64), ClaodexError> {
        let peer = target.peer();
        let peer_read = self.refresh_source(peer)?;
        let delivery_cursor = read_delivery_cursor(&self.workspace_root, target)?;

        if delivery_cursor > peer_read {
            return Err(ClaodexError::DeliveryExceedsPeer {
                target,
                delivery_cursor,
                peer_cursor: peer_read,
            });
        }
        if delivery_cursor == peer_read {
            return Ok((Vec::new(), peer_read));
        }

        let peer_session = self.participants.for_agent(peer).session_file.clone();
        let raw_lines = read_lines_between(&peer_session, delivery_cursor, peer_read)?;
        let extraction = extract_room_events_from_window(peer, &raw_lines, delivery_cursor);
        Ok((extraction.events, peer_read))
    }

    fn render_event_as_block(event: &RoomEvent) -> Result<RenderedBlock, ClaodexError> {
        let source = match event.source {
            EventSource::Agent(agent) => agent.to_string(),
            EventSource::User(_) => "user".to_string(),
        };
        render_block(&source, &event.body)?;
        Ok(RenderedBlock { source, body: event.body.clone() })
    }

    fn render_payload(blocks: &[RenderedBlock]) -> Result<String, ClaodexError> {
        let rendered: Result<Vec<String>, ClaodexError> =
            blocks.iter().map(|block| render_block(&block.source, &block.body)).collect();
        Ok(rendered?.join("\n\n"))
    }

    /// C7 composition: undelivered peer delta, in source order, followed by
    /// the user's own text as the final block. Returns the rendered blocks,
    /// payload, and the peer-read cursor the delta was captured against (so
    /// the caller can advance the delivery cursor to that exact value).
    pub fn compose_user_message(
        &mut self,
        target: Agent,
        user_text: &str,
    ) -> Result<(Vec<RenderedBlock>, String, u64), ClaodexError> {
        if user_text.trim().is_empty() {
            return Err(ClaodexError::Validation("user message body is empty".to_string()));
        }

        let (delta_events, peer_read) = self.build_delta_for_target(target)?;
        let mut blocks: Vec<RenderedBlock> =
            delta_events.iter().map(Self::render_event_as_block).collect::<Result<_, _>>()?;
        blocks.push(RenderedBlock { source: "user".to_string(), body: user_text.trim().to_string() });

        let payload = Self::render_payload(&blocks)?;
        Ok((blocks, payload, peer_read))
    }

    /// `send_user_message`: composes, pastes, and advances `delivery[target]`
    /// to the peer-read cursor the composition was built against.
    pub async fn send_user_message(&mut self, target: Agent, user_text: &str) -> Result<PendingSend, ClaodexError> {
        let before_cursor = self.refresh_source(target)?;
        let (blocks, payload, peer_read) = self.compose_user_message(target, user_text)?;

        let sent_at = self.clock.now();
        let pane = self.participants.for_agent(target).tmux_pane.clone();
        self.pane_injector
            .paste(&pane, &payload)
            .await
            .map_err(|_| ClaodexError::TargetPaneDead { agent: target, pane: pane.clone() })?;

        write_delivery_cursor(&self.workspace_root, target, peer_read)?;
        self.event_bus
            .log(EventKind::Sent, &format!("sent to {target}"), None, Some(target), None)
            .await;

        Ok(PendingSend { target_agent: target, before_cursor, sent_text: payload, blocks, sent_at: Some(sent_at) })
    }

    /// `send_routed_message`: relays `from`'s just-completed response to
    /// `target`, along with any undelivered peer delta (minus `from`'s own
    /// rows, which `peer_text` already carries) and queued user
    /// interjections. `echoed_anchor`, when set, drops a single undelivered
    /// user row whose normalized text equals it.
    pub async fn send_routed_message(
        &mut self,
        target: Agent,
        from: Agent,
        peer_text: &str,
        user_interjections: &[String],
        echoed_anchor: Option<&str>,
    ) -> Result<PendingSend, ClaodexError> {
        let before_cursor = self.refresh_source(target)?;
        let (delta_events, peer_read) = self.build_delta_for_target(target)?;

        let normalized_anchor = echoed_anchor.map(normalize_whitespace);
        let mut dropped_anchor = false;

        let mut blocks = Vec::new();
        for event in &delta_events {
            if matches!(event.source, EventSource::Agent(agent) if agent == from) {
                continue;
            }
            if !dropped_anchor {
                if let (EventSource::User(_), Some(anchor)) = (event.source, normalized_anchor.as_deref()) {
                    if normalize_whitespace(&event.body) == anchor {
                        dropped_anchor = true;
                        continue;
                    }
                }
            }
            blocks.push(Self::render_event_as_block(event)?);
        }

        blocks.push(RenderedBlock { source: from.to_string(), body: peer_text.trim().to_string() });
        for interjection in user_interjections {
            if interjection.trim().is_empty() {
                continue;
            }
            blocks.push(RenderedBlock { source: "user".to_string(), body: interjection.trim().to_string() });
        }

        let payload = Self::render_payload(&blocks)?;

        let sent_at = self.clock.now();
        let pane = self.participants.for_agent(target).tmux_pane.clone();
        self.pane_injector
            .paste(&pane, &payload)
            .await
            .map_err(|_| ClaodexError::TargetPaneDead { agent: target, pane: pane.clone() })?;

        write_delivery_cursor(&self.workspace_root, target, peer_read)?;
        self.event_bus
            .log(EventKind::Sent, &format!("routed {from} -> {target}"), Some(from), Some(target), None)
            .await;

        Ok(PendingSend { target_agent: target, before_cursor, sent_text: payload, blocks, sent_at: Some(sent_at) })
    }

    /// Sets `delivery_cursor[X] = read_cursor[peer(X)]` for every agent not
    /// in `exclude`, so a just-received-but-not-yet-routed response never
    /// leaks into the next normal-mode delta.
    pub fn sync_delivery_cursors(&mut self, exclude: Option<Agent>) -> Result<(), ClaodexError> {
        for agent in Agent::ALL {
            if Some(agent) == exclude {
                continue;
            }
            let peer_read = read_read_cursor(&self.workspace_root, agent.peer())?;
            write_delivery_cursor(&self.workspace_root, agent, peer_read)?;
        }
        Ok(())
    }

    /// Drops whatever wait-progress and Stop-watcher latch this process has
    /// accumulated for one `(target, before_cursor)` wait.
    pub fn clear_poll_latch(&mut self, target: Agent, before_cursor: u64) {
        self.watch_progress.remove(&(target, before_cursor));
    }

    /// One non-blocking pass of the wait loop: refreshes the target, scans
    /// for a turn-end marker, checks for Claude-only interference, and (for
    /// Claude) consults the debug-log Stop watcher. Returns `Ok(None)` if no
    /// turn has completed yet.
    pub async fn poll_for_response(&mut self, pending: &PendingSend) -> Result<Option<ResponseTurn>, ClaodexError> {
        self.poll_once(pending).await
    }

    /// Blocking wait: repeatedly calls the same single-pass logic as
    /// `poll_for_response` until a turn completes or `turn_timeout_seconds`
    /// elapses, sleeping `poll_seconds` between passes.
    pub async fn wait_for_response(&mut self, pending: &PendingSend) -> Result<ResponseTurn, ClaodexError> {
        let target = pending.target_agent;
        let pane = self.participants.for_agent(target).tmux_pane.clone();
        if !self
            .pane_injector
            .is_alive(&pane)
            .await
            .map_err(|_| ClaodexError::TargetPaneDead { agent: target, pane: pane.clone() })?
        {
            return Err(ClaodexError::TargetPaneDead { agent: target, pane });
        }

        let sent_at = pending
            .sent_at
            .ok_or_else(|| ClaodexError::Validation("pending send has no sent_at timestamp".to_string()))?;
        let deadline = sent_at + chrono::Duration::seconds(self.config.turn_timeout_seconds as i64);

        loop {
            if let Some(turn) = self.poll_once(pending).await? {
                return Ok(turn);
            }

            if self.clock.now() >= deadline {
                break;
            }
            let sleep_millis = (self.config.poll_seconds * 1000.0).max(1.0) as u64;
            tokio::time::sleep(std::time::Duration::from_millis(sleep_millis)).await;
        }

        let progress = self.watch_progress.remove(&(target, pending.before_cursor));
        let kind = match (target, progress) {
            (Agent::Codex, Some(progress)) if progress.saw_task_started => "codex-started-no-complete",
            (_, Some(progress)) if progress.saw_any_assistant => "assistant-without-marker",
            _ => "marker-missing",
        };
        Err(ClaodexError::SmokeSignal { agent: target, kind })
    }

    async fn poll_once(&mut self, pending: &PendingSend) -> Result<Option<ResponseTurn>, ClaodexError> {
        let target = pending.target_agent;
        let before_cursor = pending.before_cursor;
        let cur = self.refresh_source(target)?;

        let mut progress = self
            .watch_progress
            .remove(&(target, before_cursor))
            .unwrap_or_else(|| WaitProgress::new(before_cursor));

        if cur > progress.marker_scan_cursor {
            let session_file = self.participants.for_agent(target).session_file.clone();
            let incremental_lines = read_lines_between(&session_file, progress.marker_scan_cursor, cur)?;
            let incremental_entries = parse_window_entries(&incremental_lines, progress.marker_scan_cursor);

            let scan = scan_turn_end_marker(target, &incremental_entries);
            if scan.saw_codex_task_started {
                progress.saw_task_started = true;
            }

            let incremental_extraction =
                extract_room_events_from_window(target, &incremental_lines, progress.marker_scan_cursor);
            if incremental_extraction.events.iter().any(|event| matches!(event.source, EventSource::Agent(_))) {
                progress.saw_any_assistant = true;
            }

            progress.marker_scan_cursor = cur;

            if let Some(marker_line) = scan.marker_line {
                let full_lines = read_lines_between(&session_file, before_cursor, marker_line)?;
                let extraction = extract_room_events_from_window(target, &full_lines, before_cursor);
                let assistant_text = extraction
                    .events
                    .into_iter()
                    .rev()
                    .find(|event| matches!(event.source, EventSource::Agent(_)))
                    .map(|event| event.body);

                return match assistant_text {
                    Some(text) => {
                        self.event_bus
                            .log(EventKind::Recv, &format!("{target} completed a turn"), Some(target), None, None)
                            .await;
                        Ok(Some(ResponseTurn {
                            agent: target,
                            text,
                            source_cursor: marker_line,
                            received_at: Some(self.clock.now()),
                        }))
                    }
                    None => Err(ClaodexError::TurnMarkerWithoutText { agent: target, marker_line }),
                };
            }
        }

        if target == Agent::Claude && cur > before_cursor {
            let session_file = self.participants.for_agent(target).session_file.clone();
            let raw_lines = read_lines_between(&session_file, before_cursor, cur)?;
            let entries = parse_window_values(&raw_lines);
            if let Some(snippet) = detect_interference(&entries, &pending.sent_text) {
                self.watch_progress.remove(&(target, before_cursor));
                return Err(ClaodexError::Interference { agent: target, snippet });
            }
        }

        if target == Agent::Claude {
            let session_id = self.participants.for_agent(target).session_id.clone();
            let send_time = pending.sent_at.unwrap_or_else(|| self.clock.now());
            let stop_hit = self
                .debug_log_watch
                .entry(target)
                .or_insert_with(DebugLogWatch::new)
                .scan(&session_id, send_time);
            if stop_hit {
                progress.stop_latched = true;
            }

            if progress.stop_latched {
                let session_file = self.participants.for_agent(target).session_file.clone();
                let raw_lines = read_lines_between(&session_file, before_cursor, cur)?;
                let entries = parse_window_values(&raw_lines);
                if let Some(text) = latest_assistant_text_respecting_tool_chain(&entries) {
                    self.event_bus
                        .log(EventKind::Watch, &format!("{target} Stop hook fired"), Some(target), None, None)
                        .await;
                    return Ok(Some(ResponseTurn {
                        agent: target,
                        text,
                        source_cursor: cur,
                        received_at: Some(self.clock.now()),
                    }));
                }
            }
        }

        self.watch_progress.insert((target, before_cursor), progress);
        Ok(None)
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
