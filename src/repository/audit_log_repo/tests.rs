use super::AuditLogRepository;
use crate::domain::audit::AuditEntry;
use crate::domain::types::{AuditStatus, OperationType};
use crate::repository::audit_sink::AuditSink;
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn make_entry(audit_id: &str, kind: &str, op: OperationType, minute: i64) -> AuditEntry {
    let base = NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_milli_opt(8, 0, 0, 125)
        .unwrap();
    AuditEntry {
        audit_id: audit_id.to_string(),
        operation_type: op,
        entity_kind: kind.to_string(),
        actor_id: "system".to_string(),
        source_file_name: Some("cams.csv".to_string()),
        records_processed: 10,
        records_successful: 9,
        records_failed: 1,
        processing_time_ms: 42,
        status: AuditStatus::Partial,
        error_message: None,
        created_at: base + Duration::minutes(minute),
    }
}

#[tokio::test]
async fn test_write_and_find_by_id() {
    let repo = AuditLogRepository::new(setup_test_db());
    let entry = make_entry("a1", "camera", OperationType::Import, 0);

    repo.write(entry.clone()).await.unwrap();

    let found = repo.find_by_id("a1").unwrap().unwrap();
    assert_eq!(found, entry);
    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn test_list_recent_orders_newest_first() {
    let repo = AuditLogRepository::new(setup_test_db());
    repo.insert(&make_entry("a1", "camera", OperationType::Import, 0)).unwrap();
    repo.insert(&make_entry("a2", "robot", OperationType::Validation, 5)).unwrap();
    repo.insert(&make_entry("a3", "camera", OperationType::Import, 10)).unwrap();

    let recent = repo.list_recent(2).unwrap();
    let ids: Vec<&str> = recent.iter().map(|e| e.audit_id.as_str()).collect();
    assert_eq!(ids, vec!["a3", "a2"]);
}

#[test]
fn test_list_by_entity_kind_and_operation() {
    let repo = AuditLogRepository::new(setup_test_db());
    repo.insert(&make_entry("a1", "camera", OperationType::Import, 0)).unwrap();
    repo.insert(&make_entry("a2", "robot", OperationType::Validation, 5)).unwrap();
    repo.insert(&make_entry("a3", "camera", OperationType::Validation, 10)).unwrap();

    let cameras = repo.list_by_entity_kind("camera", 10).unwrap();
    assert_eq!(cameras.len(), 2);

    let validations = repo
        .list_by_operation_type(OperationType::Validation, 10)
        .unwrap();
    let ids: Vec<&str> = validations.iter().map(|e| e.audit_id.as_str()).collect();
    assert_eq!(ids, vec!["a3", "a2"]);
}

#[test]
fn test_duplicate_audit_id_rejected() {
    let repo = AuditLogRepository::new(setup_test_db());
    let entry = make_entry("a1", "camera", OperationType::Import, 0);
    repo.insert(&entry).unwrap();
    assert!(repo.insert(&entry).is_err());
}
