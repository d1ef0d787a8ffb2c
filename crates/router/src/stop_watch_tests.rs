use super::*;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn with_home<F: FnOnce(&std::path::Path)>(f: F) {
    let dir = TempDir::new().unwrap();
    std::env::set_var("HOME", dir.path());
    f(dir.path());
    std::env::remove_var("HOME");
}

fn write_debug_log(home: &std::path::Path, session_id: &str, contents: &str) {
    let debug_dir = home.join(".claude").join("debug");
    fs::create_dir_all(&debug_dir).unwrap();
    fs::write(debug_dir.join(format!("{session_id}.txt")), contents).unwrap();
}

#[test]
#[serial]
fn finds_stop_event_at_or_after_send_time() {
    with_home(|home| {
        write_debug_log(
            home,
            "sess-1",
            "2026-01-01T00:00:00.500Z [DEBUG] Getting matching hook commands for Stop\n",
        );
        let send_time = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.000Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut watch = DebugLogWatch::new();
        assert!(watch.scan("sess-1", send_time));
    });
}

#[test]
#[serial]
fn ignores_stop_event_before_send_time() {
    with_home(|home| {
        write_debug_log(
            home,
            "sess-2",
            "2026-01-01T00:00:00.000Z [DEBUG] Getting matching hook commands for Stop\n",
        );
        let send_time = DateTime::parse_from_rfc3339("2026-01-01T00:00:05.000Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut watch = DebugLogWatch::new();
        assert!(!watch.scan("sess-2", send_time));
    });
}

#[test]
#[serial]
fn missing_log_file_is_not_an_error() {
    with_home(|_home| {
        let mut watch = DebugLogWatch::new();
        assert!(!watch.scan("no-such-session", Utc::now()));
    });
}

#[test]
#[serial]
fn offset_advances_so_repeat_scans_do_not_rematch_old_lines() {
    with_home(|home| {
        write_debug_log(
            home,
            "sess-3",
            "2026-01-01T00:00:00.000Z [DEBUG] Getting matching hook commands for Stop\n",
        );
        let send_time = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.000Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut watch = DebugLogWatch::new();
        assert!(watch.scan("sess-3", send_time));
        // second scan sees no new bytes
        assert!(!watch.scan("sess-3", send_time));
    });
}

#[test]
#[serial]
fn truncated_log_resets_offset_and_rescans_from_start() {
    with_home(|home| {
        write_debug_log(home, "sess-4", "irrelevant line one\nirrelevant line two\n");
        let mut watch = DebugLogWatch::new();
        assert!(!watch.scan("sess-4", Utc::now()));

        write_debug_log(
            home,
            "sess-4",
            "2026-01-01T00:00:00.000Z [DEBUG] Getting matching hook commands for Stop\n",
        );
        let send_time = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.000Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(watch.scan("sess-4", send_time));
    });
}
