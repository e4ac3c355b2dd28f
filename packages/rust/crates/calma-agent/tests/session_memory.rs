#![allow(missing_docs)]

use std::time::Duration;

use calma_agent::{HistoryEntry, SessionMemory};

fn contents(history: &[HistoryEntry]) -> Vec<&str> {
    history.iter().map(|entry| entry.content.as_str()).collect()
}

#[test]
fn capacity_drops_oldest_entries_first() {
    let memory = SessionMemory::new(2, Duration::from_secs(60));
    memory.append("s1", HistoryEntry::user("E1"));
    memory.append("s1", HistoryEntry::assistant("E2"));
    memory.append("s1", HistoryEntry::user("E3"));

    assert_eq!(contents(&memory.get("s1")), vec!["E2", "E3"]);
}

#[test]
fn sessions_are_isolated() {
    let memory = SessionMemory::new(4, Duration::from_secs(60));
    memory.append("a", HistoryEntry::user("hola"));
    memory.append("b", HistoryEntry::user("hello"));

    assert_eq!(contents(&memory.get("a")), vec!["hola"]);
    assert_eq!(contents(&memory.get("b")), vec!["hello"]);
    assert!(memory.get("c").is_empty());
}

#[test]
fn get_returns_detached_copy() {
    let memory = SessionMemory::new(4, Duration::from_secs(60));
    memory.append("s1", HistoryEntry::user("hola"));
    let mut snapshot = memory.get("s1");
    snapshot.push(HistoryEntry::user("local only"));

    assert_eq!(memory.get("s1").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn session_expires_after_ttl_without_append() {
    let memory = SessionMemory::new(4, Duration::from_secs(30));
    memory.append("s1", HistoryEntry::user("hola"));

    tokio::time::advance(Duration::from_secs(29)).await;
    assert_eq!(memory.get("s1").len(), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(memory.get("s1").is_empty());
    assert_eq!(memory.active_sessions(), 0);
}

#[tokio::test(start_paused = true)]
async fn get_does_not_extend_ttl() {
    let memory = SessionMemory::new(4, Duration::from_secs(30));
    memory.append("s1", HistoryEntry::user("hola"));

    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(memory.get("s1").len(), 1);
    }
    tokio::time::advance(Duration::from_secs(5)).await;
    assert!(memory.get("s1").is_empty());
}

#[tokio::test(start_paused = true)]
async fn append_extends_ttl() {
    let memory = SessionMemory::new(4, Duration::from_secs(30));
    memory.append("s1", HistoryEntry::user("hola"));
    tokio::time::advance(Duration::from_secs(20)).await;
    memory.append("s1", HistoryEntry::user("sigo aquí"));
    tokio::time::advance(Duration::from_secs(20)).await;

    assert_eq!(contents(&memory.get("s1")), vec!["hola", "sigo aquí"]);
}

#[tokio::test(start_paused = true)]
async fn append_after_expiry_starts_fresh_history() {
    let memory = SessionMemory::new(4, Duration::from_secs(10));
    memory.append("s1", HistoryEntry::user("old"));
    tokio::time::advance(Duration::from_secs(10)).await;
    memory.append("s1", HistoryEntry::user("new"));

    assert_eq!(contents(&memory.get("s1")), vec!["new"]);
}

#[tokio::test(start_paused = true)]
async fn expired_sessions_are_swept_on_any_access() {
    let memory = SessionMemory::new(4, Duration::from_secs(10));
    memory.append("idle", HistoryEntry::user("bye"));
    tokio::time::advance(Duration::from_secs(11)).await;
    assert_eq!(memory.active_sessions(), 1);

    memory.append("busy", HistoryEntry::user("hola"));
    assert_eq!(memory.active_sessions(), 1);
}

#[test]
fn reset_drops_session() {
    let memory = SessionMemory::new(4, Duration::from_secs(60));
    memory.append("s1", HistoryEntry::user("hola"));
    memory.reset("s1");
    memory.reset("missing");

    assert!(memory.get("s1").is_empty());
    assert_eq!(memory.active_sessions(), 0);
}
