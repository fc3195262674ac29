use std::io::Write;

use audit_log::{AuditEntry, AuditEventType};
use hookwarden::config::AuditConfig;
use hookwarden::{Config, InstallError, Orchestrator};

#[test]
fn bad_policy_fails_loudly_and_a_corrected_retry_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let audit_path = dir.path().join("audit.jsonl");

    let mut bad = tempfile::NamedTempFile::new().unwrap();
    writeln!(bad, "version: \"2.0\"").unwrap();

    let config = Config {
        policy_file: Some(bad.path().to_path_buf()),
        audit: AuditConfig {
            enabled: true,
            path: audit_path.clone(),
        },
        ..Config::default()
    };
    let orchestrator = Orchestrator::new(config.clone());
    let mut engine = orchestrator.engine();
    let err = orchestrator.install(&mut engine).unwrap_err();
    assert!(matches!(err, InstallError::Policy(_)));
    assert!(err.to_string().contains("unsupported policy version"));
    assert!(!engine.is_installed());
    assert!(!guards::bootstrap::is_published());

    let failed: Vec<AuditEntry> = std::fs::read_to_string(&audit_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str::<AuditEntry>(line).unwrap())
        .filter(|e| e.event_type == AuditEventType::InstallFailed)
        .collect();
    assert_eq!(failed.len(), 1);

    let mut good = tempfile::NamedTempFile::new().unwrap();
    write!(
        good,
        "version: \"1.0\"\ndeny_lists:\n  deserialization:\n    - com.example.gadgets.\n"
    )
    .unwrap();
    let retry = Orchestrator::new(Config {
        policy_file: Some(good.path().to_path_buf()),
        ..config
    });
    let mut engine = retry.engine();
    let report = retry.install(&mut engine).unwrap();
    assert!(report.apply.is_clean());
    assert!(guards::bootstrap::is_published());

    let decision = guards::bootstrap::shared()
        .policy
        .evaluate(policy_engine::Capability::Deserialization, "com.example.gadgets.Chain");
    assert!(decision.is_blocked());
}
