//! Workspace-level acceptance tests exercising `claodex-store`,
//! `claodex-extract`, `claodex-router`, and `claodex-collab` together,
//! against the literal end-to-end scenarios in spec.md §8.

use std::fs;
use std::io::Write as _;
use std::sync::Arc;

use claodex_core::{Agent, Participant, SessionParticipants};
use claodex_router::{FakeEventBus, FakePaneInjector, Router, RoutingConfig};
use tempfile::TempDir;

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

fn append_lines(path: &std::path::Path, lines: &[String]) {
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

fn codex_session_meta() -> String {
    serde_json::json!({"type": "session_meta", "timestamp": "2026-01-01T00:00:00Z"}).to_string()
}

fn codex_user(text: &str) -> String {
    serde_json::json!({
        "type": "event_msg",
        "timestamp": "2026-01-01T00:00:01Z",
        "payload": {"type": "user_message", "message": text},
    })
    .to_string()
}

fn codex_assistant(text: &str) -> String {
    serde_json::json!({
        "type": "response_item",
        "timestamp": "2026-01-01T00:00:02Z",
        "payload": {"type": "message", "role": "assistant", "content": [{"type": "output_text", "text": text}]},
    })
    .to_string()
}

/// S1: a normal send with an undelivered peer delta pastes the peer's
/// backlog ahead of the user's own text, verbatim block order, and advances
/// the delivery cursor to exactly the peer's read cursor.
#[tokio::test]
async fn s1_normal_send_composes_the_peer_delta_ahead_of_the_user_text() {
    let workspace = TempDir::new().unwrap();
    let workspace_root = workspace.path().to_path_buf();
    claodex_store::ensure_state_layout(&workspace_root).unwrap();
    claodex_store::ensure_gitignore_entry(&workspace_root).unwrap();

    let claude_log = workspace_root.join("claude.jsonl");
    let codex_log = workspace_root.join("codex.jsonl");
    append_lines(&claude_log, &[claude_user("task"), claude_assistant("done")]);
    append_lines(&codex_log, &[codex_session_meta(), codex_user("ack"), codex_assistant("ack")]);

    let participants =
        SessionParticipants { claude: participant(Agent::Claude, &claude_log), codex: participant(Agent::Codex, &codex_log) };
    claodex_store::initialize_cursors_from_line_counts(&workspace_root, &participants).unwrap();

    // Preconditions from spec.md S1: read[A]=0 (claude not yet refreshed),
    // read[B]=3, delivery[to-B]=0, delivery[to-A]=3.
    claodex_store::write_read_cursor(&workspace_root, Agent::Claude, 0).unwrap();
    claodex_store::write_delivery_cursor(&workspace_root, Agent::Codex, 0).unwrap();
    claodex_store::write_delivery_cursor(&workspace_root, Agent::Claude, 3).unwrap();
    assert_eq!(claodex_store::read_read_cursor(&workspace_root, Agent::Codex).unwrap(), 3);

    let panes = FakePaneInjector::new();
    let mut router = Router::new(workspace_root.clone(), participants, RoutingConfig::default())
        .with_pane_injector(Arc::new(panes.clone()))
        .with_event_bus(Arc::new(FakeEventBus::new()));

    router.send_user_message(Agent::Codex, "please review").await.unwrap();

    let pastes = panes.pastes_for("%codex");
    assert_eq!(pastes.len(), 1);
    assert_eq!(
        pastes[0],
        "--- user ---\ntask\n\n--- claude ---\ndone\n\n--- user ---\nplease review"
    );

    let delivery_to_codex = claodex_store::read_delivery_cursor(&workspace_root, Agent::Codex).unwrap();
    let read_claude = claodex_store::read_read_cursor(&workspace_root, Agent::Claude).unwrap();
    assert_eq!(delivery_to_codex, read_claude);
    assert_eq!(read_claude, 2);
}

/// S2: routing a completed turn from B to A appends B's response followed
/// by any queued user interjections, with no additional peer delta when
/// nothing new has arrived since the last delivery.
#[tokio::test]
async fn s2_routed_message_appends_response_then_interjections() {
    let workspace = TempDir::new().unwrap();
    let workspace_root = workspace.path().to_path_buf();
    claodex_store::ensure_state_layout(&workspace_root).unwrap();

    let claude_log = workspace_root.join("claude.jsonl");
    let codex_log = workspace_root.join("codex.jsonl");
    fs::write(&claude_log, "").unwrap();
    fs::write(&codex_log, "").unwrap();

    let participants =
        SessionParticipants { claude: participant(Agent::Claude, &claude_log), codex: participant(Agent::Codex, &codex_log) };

    let panes = FakePaneInjector::new();
    let mut router = Router::new(workspace_root.clone(), participants, RoutingConfig::default())
        .with_pane_injector(Arc::new(panes.clone()))
        .with_event_bus(Arc::new(FakeEventBus::new()));

    // Nothing new has landed in either session file since the last delivery,
    // so the routed message carries only B's response and the interjection.
    router
        .send_routed_message(Agent::Claude, Agent::Codex, "noted", &["also check tests".to_string()], None)
        .await
        .unwrap();

    let pastes = panes.pastes_for("%claude");
    assert_eq!(pastes.len(), 1);
    assert_eq!(pastes[0], "--- codex ---\nnoted\n\n--- user ---\nalso check tests");
}
