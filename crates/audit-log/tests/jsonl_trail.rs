use std::thread;

use audit_log::{AuditEntry, AuditEventType, AuditSink, AuditSource, PolicyDecisionRecord};
use serde_json::json;

fn read_entries(path: &std::path::Path) -> Vec<AuditEntry> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn entries_are_appended_as_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("audit.jsonl");
    let sink = AuditSink::open(&path).unwrap();
    assert_eq!(sink.path(), path.as_path());

    sink.log(AuditEntry::new(
        AuditEventType::AgentStarting,
        AuditSource::new("hookwarden"),
        json!({"version": "0.1.0"}),
    ));
    sink.log(
        AuditEntry::new(
            AuditEventType::OperationBlocked,
            AuditSource::new("guards").with_hook("java.io.ObjectInputStream#resolveClass"),
            json!({"candidate": "java.lang.Runtime"}),
        )
        .with_policy_decision(PolicyDecisionRecord {
            action: "block".into(),
            matched_rule: Some("java.lang.Runtime".into()),
            reason: "matched".into(),
        }),
    );

    let entries = read_entries(&path);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].event_type, AuditEventType::AgentStarting);
    assert_eq!(entries[1].event_type, AuditEventType::OperationBlocked);
    assert_eq!(
        entries[1].policy_decision.as_ref().and_then(|d| d.matched_rule.as_deref()),
        Some("java.lang.Runtime")
    );
    assert_ne!(entries[0].id, entries[1].id);
}

#[test]
fn reopening_appends_instead_of_truncating() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");

    for round in 0..2 {
        let sink = AuditSink::open(&path).unwrap();
        sink.log(AuditEntry::new(
            AuditEventType::AgentInstalled,
            AuditSource::new("hookwarden"),
            json!({ "round": round }),
        ));
    }

    let entries = read_entries(&path);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].details["round"], 1);
}

#[test]
fn concurrent_writers_never_interleave_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let sink = AuditSink::open(&path).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let sink = sink.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    sink.log(AuditEntry::new(
                        AuditEventType::OperationBlocked,
                        AuditSource::new("guards").on_current_thread(),
                        json!({ "worker": worker, "i": i }),
                    ));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(read_entries(&path).len(), 100);
}

#[test]
fn open_fails_when_parent_is_a_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().join("audit.jsonl");
    assert!(AuditSink::open(path).is_err());
}
