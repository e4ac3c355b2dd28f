//! Integration tests for HistoryWindow.

use calma_window::{HistoryEntry, HistoryWindow, Role};

#[test]
fn test_push_and_snapshot_in_order() {
    let mut w = HistoryWindow::new(10);
    w.push(HistoryEntry::user("hola"));
    w.push(HistoryEntry::assistant("hola, ¿cómo estás?"));
    let history = w.snapshot();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "hola");
    assert_eq!(history[1].role, Role::Assistant);
}

#[test]
fn test_capacity_evicts_oldest_first() {
    let mut w = HistoryWindow::new(2);
    assert_eq!(w.push(HistoryEntry::user("e1")), 0);
    assert_eq!(w.push(HistoryEntry::user("e2")), 0);
    assert_eq!(w.push(HistoryEntry::user("e3")), 1);

    let contents: Vec<_> = w.iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["e2", "e3"]);
    assert_eq!(w.evicted_total(), 1);
}

#[test]
fn test_extend_never_exceeds_capacity() {
    let mut w = HistoryWindow::new(3);
    let evicted = w.extend((0..7).map(|i| HistoryEntry::user(i.to_string())));
    assert_eq!(evicted, 4);
    assert_eq!(w.len(), 3);
    assert_eq!(w.snapshot()[0].content, "4");
}

#[test]
fn test_zero_capacity_is_clamped_to_one() {
    let mut w = HistoryWindow::new(0);
    assert_eq!(w.capacity(), 1);
    w.push(HistoryEntry::user("a"));
    w.push(HistoryEntry::user("b"));
    assert_eq!(w.len(), 1);
    assert_eq!(w.snapshot()[0].content, "b");
}

#[test]
fn test_snapshot_is_detached_copy() {
    let mut w = HistoryWindow::new(4);
    w.push(HistoryEntry::user("a"));
    let mut copy = w.snapshot();
    copy.push(HistoryEntry::user("b"));
    assert_eq!(w.len(), 1);
}

#[test]
fn test_role_serializes_lowercase() {
    let json = serde_json::to_string(&HistoryEntry::assistant("ok")).unwrap_or_default();
    assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    assert_eq!(Role::User.to_string(), "user");
}
