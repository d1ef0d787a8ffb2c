use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn count_lines_returns_zero_for_missing_file() {
    let dir = TempDir::new().unwrap();
    assert_eq!(count_lines(&dir.path().join("nope")).unwrap(), 0);
}

#[test]
fn count_lines_counts_each_newline_terminated_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(&path, "a\nb\nc\n").unwrap();
    assert_eq!(count_lines(&path).unwrap(), 3);
}

#[test]
fn read_lines_between_is_exclusive_start_inclusive_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(&path, "one\ntwo\nthree\nfour\n").unwrap();

    let lines = read_lines_between(&path, 1, 3).unwrap();
    assert_eq!(lines, vec!["two", "three"]);
}

#[test]
fn read_lines_between_empty_window_when_cursors_equal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(&path, "one\ntwo\n").unwrap();

    let lines = read_lines_between(&path, 2, 2).unwrap();
    assert!(lines.is_empty());
}
