use std::fs;
use std::io::Write as _;
use std::sync::Arc;

use chrono::Utc;
use claodex_core::{Agent, ClaodexError, FakeClock, Participant, SessionParticipants};
use tempfile::TempDir;

use super::Router;
use crate::config::RoutingConfig;
use crate::event_bus::FakeEventBus;
use crate::pane::FakePaneInjector;

struct Harness {
    _workspace: TempDir,
    workspace_root: std::path::PathBuf,
    claude_log: std::path::PathBuf,
    codex_log: std::path::PathBuf,
    panes: FakePaneInjector,
    events: FakeEventBus,
    clock: FakeClock,
}

fn participant(agent: Agent, session_file: &std::path::Path) -> Participant {
    Participant {
        agent,
        session_file: session_file.to_path_buf(),
        session_id: format!("{agent}-session"),
        tmux_pane: format!("%{agent}"),
        cwd: session_file.parent().unwrap().to_path_buf(),
        registered_at: "2026-01-01T00:00:00+00:00".to_string(),
    }
}

fn append_lines(path: &std::path::Path, lines: &[&str]) {
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

fn claude_user(text: &str) -> String {
    serde_json::json!({
        "type": "user",
        "timestamp": "2026-01-01T00:00:00Z",
        "message": {"role": "user", "content": text},
    })
    .to_string()
}

fn claude_assistant(text: &str) -> String {
    serde_json::json!({
        "type": "assistant",
        "timestamp": "2026-01-01T00:00:01Z",
        "message": {"role": "assistant", "content": [{"type": "text", "text": text}]},
    })
    .to_string()
}

fn claude_turn_duration() -> String {
    serde_json::json!({
        "type": "system",
        "subtype": "turn_duration",
        "timestamp": "2026-01-01T00:00:02Z",
    })
    .to_string()
}

fn codex_task_started() -> String {
    serde_json::json!({
        "type": "event_msg",
        "timestamp": "2026-01-01T00:00:00Z",
        "payload": {"type": "task_started"},
    })
    .to_string()
}

fn codex_task_complete() -> String {
    serde_json::json!({
        "type": "event_msg",
        "timestamp": "2026-01-01T00:00:01Z",
        "payload": {"type": "task_complete"},
    })
    .to_string()
}

fn codex_assistant(text: &str) -> String {
    serde_json::json!({
        "type": "response_item",
        "timestamp": "2026-01-01T00:00:01Z",
        "payload": {"type": "message", "role": "assistant", "content": [{"type": "output_text", "text": text}]},
    })
    .to_string()
}

impl Harness {
    fn new() -> Self {
        let workspace = TempDir::new().unwrap();
        let workspace_root = workspace.path().to_path_buf();
        claodex_store::ensure_state_layout(&workspace_root).unwrap();

        let claude_log = workspace_root.join("claude.jsonl");
        let codex_log = workspace_root.join("codex.jsonl");
        fs::write(&claude_log, "").unwrap();
        fs::write(&codex_log, "").unwrap();

        Self {
            _workspace: workspace,
            workspace_root,
            claude_log,
            codex_log,
            panes: FakePaneInjector::new(),
            events: FakeEventBus::new(),
            clock: FakeClock::new(Utc::now()),
        }
    }

    fn router(&self) -> Router {
        let participants = SessionParticipants {
            claude: participant(Agent::Claude, &self.claude_log),
            codex: participant(Agent::Codex, &self.codex_log),
        };
        Router::new(self.workspace_root.clone(), participants, RoutingConfig::default())
            .with_clock(Arc::new(self.clock.clone()))
            .with_pane_injector(Arc::new(self.panes.clone()))
            .with_event_bus(Arc::new(self.events.clone()))
    }
}

#[test]
fn refresh_source_advances_cursor_past_parseable_lines() {
    let harness = Harness::new();
    append_lines(&harness.claude_log, &[&claude_user("hello"), &claude_assistant("hi")]);
    let mut router = harness.router();

    let cursor = router.refresh_source(Agent::Claude).unwrap();
    assert_eq!(cursor, 2);
}

#[test]
fn refresh_source_holds_cursor_on_a_malformed_tail_line() {
    let harness = Harness::new();
    append_lines(&harness.claude_log, &[&claude_user("hello"), "not json"]);
    let mut router = harness.router();

    let cursor = router.refresh_source(Agent::Claude).unwrap();
    assert_eq!(cursor, 1);
}

#[test]
fn refresh_source_force_skips_a_persistently_stuck_cursor() {
    let harness = Harness::new();
    append_lines(&harness.claude_log, &["not json"]);
    let mut router = harness.router();

    assert_eq!(router.refresh_source(Agent::Claude).unwrap(), 0);
    assert_eq!(router.refresh_source(Agent::Claude).unwrap(), 0);
    let cursor = router.refresh_source(Agent::Claude).unwrap();
    assert_eq!(cursor, 1, "third attempt force-skips past the unparseable line");
}

#[test]
fn refresh_source_force_skips_after_the_elapsed_time_threshold() {
    let harness = Harness::new();
    append_lines(&harness.claude_log, &["not json"]);
    let mut router = harness.router();

    assert_eq!(router.refresh_source(Agent::Claude).unwrap(), 0);
    harness.clock.advance(chrono::Duration::seconds(11));
    let cursor = router.refresh_source(Agent::Claude).unwrap();
    assert_eq!(cursor, 1);
}

#[test]
fn build_delta_for_target_rejects_when_delivery_exceeds_peer_cursor() {
    let harness = Harness::new();
    append_lines(&harness.codex_log, &[&codex_task_started(), &codex_task_complete()]);
    let mut router = harness.router();

    claodex_store::write_delivery_cursor(&harness.workspace_root, Agent::Claude, 5).unwrap();
    let result = router.build_delta_for_target(Agent::Claude);
    assert!(matches!(result, Err(ClaodexError::DeliveryExceedsPeer { .. })));
}

#[tokio::test]
async fn send_user_message_pastes_and_advances_delivery_cursor() {
    let harness = Harness::new();
    append_lines(&harness.codex_log, &[&codex_task_started(), &codex_task_complete()]);
    let mut router = harness.router();

    let pending = router.send_user_message(Agent::Claude, "please review").await.unwrap();
    assert_eq!(pending.target_agent, Agent::Claude);

    let pastes = harness.panes.pastes_for("%claude");
    assert_eq!(pastes.len(), 1);
    assert!(pastes[0].contains("--- user ---\nplease review"));

    let delivery = claodex_store::read_delivery_cursor(&harness.workspace_root, Agent::Claude).unwrap();
    assert_eq!(delivery, 2);
}

#[tokio::test]
async fn send_user_message_rejects_empty_text() {
    let harness = Harness::new();
    let mut router = harness.router();
    let result = router.send_user_message(Agent::Claude, "   ").await;
    assert!(matches!(result, Err(ClaodexError::Validation(_))));
}

#[tokio::test]
async fn poll_for_response_returns_none_until_the_turn_duration_marker_appears() {
    let harness = Harness::new();
    let mut router = harness.router();
    let pending = router.send_user_message(Agent::Claude, "go").await.unwrap();

    assert!(router.poll_for_response(&pending).await.unwrap().is_none());

    append_lines(&harness.claude_log, &[&claude_assistant("draft"), &claude_turn_duration()]);
    let turn = router.poll_for_response(&pending).await.unwrap();
    let turn = turn.expect("turn_duration marker should close the turn");
    assert_eq!(turn.agent, Agent::Claude);
    assert_eq!(turn.text, "draft");
}

#[tokio::test]
async fn poll_for_response_ignores_a_stale_codex_task_complete() {
    let harness = Harness::new();
    let mut router = harness.router();
    let pending = router.send_user_message(Agent::Codex, "go").await.unwrap();

    // all three rows land in the same poll window, with the task_complete
    // preceding this wait's task_started: it belongs to a turn already
    // consumed, not this one.
    append_lines(
        &harness.codex_log,
        &[&codex_task_complete(), &codex_task_started(), &codex_assistant("still working")],
    );
    let result = router.poll_for_response(&pending).await.unwrap();
    assert!(result.is_none(), "a task_complete preceding this wait's task_started must not close the turn");
}

#[tokio::test]
async fn poll_for_response_closes_on_a_fresh_codex_task_complete() {
    let harness = Harness::new();
    let mut router = harness.router();
    let pending = router.send_user_message(Agent::Codex, "go").await.unwrap();

    append_lines(
        &harness.codex_log,
        &[&codex_task_started(), &codex_assistant("done"), &codex_task_complete()],
    );
    let turn = router.poll_for_response(&pending).await.unwrap().expect("fresh task_complete closes the turn");
    assert_eq!(turn.agent, Agent::Codex);
    assert_eq!(turn.text, "done");
}

#[tokio::test]
async fn wait_for_response_times_out_with_a_smoke_signal_when_the_pane_never_answers() {
    let harness = Harness::new();
    let mut router = harness.router();
    let mut pending = router.send_user_message(Agent::Claude, "go").await.unwrap();
    pending.sent_at = Some(harness.clock.now());

    let config = RoutingConfig { poll_seconds: 0.01, turn_timeout_seconds: 0 };
    let mut router = Router::new(
        harness.workspace_root.clone(),
        SessionParticipants {
            claude: participant(Agent::Claude, &harness.claude_log),
            codex: participant(Agent::Codex, &harness.codex_log),
        },
        config,
    )
    .with_clock(Arc::new(harness.clock.clone()))
    .with_pane_injector(Arc::new(harness.panes.clone()))
    .with_event_bus(Arc::new(harness.events.clone()));

    let result = router.wait_for_response(&pending).await;
    assert!(matches!(result, Err(ClaodexError::SmokeSignal { agent: Agent::Claude, kind: "marker-missing" })));
}

#[tokio::test]
async fn wait_for_response_fails_when_the_target_pane_is_dead() {
    let harness = Harness::new();
    let mut router = harness.router();
    let pending = router.send_user_message(Agent::Claude, "go").await.unwrap();

    harness.panes.set_alive("%claude", false);
    let result = router.wait_for_response(&pending).await;
    assert!(matches!(result, Err(ClaodexError::TargetPaneDead { agent: Agent::Claude, .. })));
}

#[tokio::test]
async fn send_routed_message_drops_the_echoed_anchor_and_the_sender_own_rows() {
    let harness = Harness::new();
    let mut router = harness.router();

    // delivery[codex] starts at 0, so this delta carries both the human's
    // original anchor row and claude's own response row.
    append_lines(&harness.claude_log, &[&claude_user("please review the diff"), &claude_assistant("looks fine")]);

    let pending = router
        .send_routed_message(Agent::Codex, Agent::Claude, "looks fine", &[], Some("please review the diff"))
        .await
        .unwrap();

    let pastes = harness.panes.pastes_for("%codex");
    let payload = pastes.last().unwrap();
    assert!(!payload.contains("please review the diff"));
    assert!(payload.contains("--- claude ---\nlooks fine"));
    assert_eq!(pending.target_agent, Agent::Codex);
}

#[tokio::test]
async fn poll_for_response_reports_interference_on_claude_when_an_unexpected_row_appears() {
    let harness = Harness::new();
    let mut router = harness.router();
    let pending = router.send_user_message(Agent::Claude, "please review").await.unwrap();

    append_lines(&harness.claude_log, &[&claude_user("something unrelated typed mid-wait")]);
    let result = router.poll_for_response(&pending).await;
    assert!(matches!(result, Err(ClaodexError::Interference { agent: Agent::Claude, .. })));
}
