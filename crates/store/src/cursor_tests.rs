use super::*;
use tempfile::TempDir;

#[test]
fn read_cursor_creates_zero_when_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cursors/read-claude.cursor");
    assert_eq!(read_cursor(&path).unwrap(), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "0\n");
}

#[test]
fn write_then_read_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cursor");
    write_cursor(&path, 42).unwrap();
    assert_eq!(read_cursor(&path).unwrap(), 42);
}

#[test]
fn read_cursor_rejects_missing_trailing_newline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cursor");
    fs::write(&path, "12").unwrap();
    let err = read_cursor(&path).unwrap_err();
    assert!(matches!(err, ClaodexError::CorruptCursor(_)));
}

#[test]
fn read_cursor_rejects_non_digit_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cursor");
    fs::write(&path, "abc\n").unwrap();
    let err = read_cursor(&path).unwrap_err();
    assert!(matches!(err, ClaodexError::CorruptCursor(_)));
}

#[test]
fn write_cursor_replaces_via_rename_not_truncation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cursor");
    write_cursor(&path, 5).unwrap();
    write_cursor(&path, 2).unwrap();
    assert_eq!(read_cursor(&path).unwrap(), 2);
    assert!(!path.with_extension("tmp").exists());
}
