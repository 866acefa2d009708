// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、内存版记录存储/审计输出、测试数据生成
// ==========================================
#![allow(dead_code)]

use async_trait::async_trait;
use fleet_import::config::ImportSettings;
use fleet_import::db::{init_schema, open_sqlite_connection};
use fleet_import::domain::audit::AuditEntry;
use fleet_import::domain::entity::TypedEntity;
use fleet_import::domain::types::EntityKind;
use fleet_import::importer::ImportOrchestrator;
use fleet_import::repository::{AuditSink, RecordStore, RepositoryError, RepositoryResult};
use std::collections::HashSet;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("临时路径非 UTF-8")?.to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

// ==========================================
// MemoryRecordStore - 内存版记录存储
// ==========================================
#[derive(Default)]
pub struct MemoryRecordStore {
    existing: Mutex<HashSet<(EntityKind, String, String)>>,
    saved: Mutex<Vec<TypedEntity>>,
    batch_sizes: Mutex<Vec<usize>>,
    // 第 N 次（从 1 开始）save_batch 调用返回错误
    fail_on_batch: Option<usize>,
    // 每批最多"保存"的条数
    save_cap: Option<usize>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_batch(batch: usize) -> Self {
        Self {
            fail_on_batch: Some(batch),
            ..Self::default()
        }
    }

    pub fn capped(save_cap: usize) -> Self {
        Self {
            save_cap: Some(save_cap),
            ..Self::default()
        }
    }

    pub fn with_existing(self, kind: EntityKind, field: &str, value: &str) -> Self {
        self.existing
            .lock()
            .unwrap()
            .insert((kind, field.to_string(), value.to_string()));
        self
    }

    pub fn saved(&self) -> Vec<TypedEntity> {
        self.saved.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn exists_by_natural_key(
        &self,
        kind: EntityKind,
        key_fields: &[(&str, &str)],
    ) -> RepositoryResult<bool> {
        let existing = self.existing.lock().unwrap();
        Ok(!key_fields.is_empty()
            && key_fields.iter().all(|(field, value)| {
                existing.contains(&(kind, field.to_string(), value.to_string()))
            }))
    }

    async fn save_batch(
        &self,
        _kind: EntityKind,
        entities: Vec<TypedEntity>,
    ) -> RepositoryResult<usize> {
        let mut sizes = self.batch_sizes.lock().unwrap();
        sizes.push(entities.len());
        if self.fail_on_batch == Some(sizes.len()) {
            return Err(RepositoryError::DatabaseQueryError(
                "disk I/O error".to_string(),
            ));
        }

        let keep = self.save_cap.unwrap_or(entities.len()).min(entities.len());
        self.saved
            .lock()
            .unwrap()
            .extend(entities.into_iter().take(keep));
        Ok(keep)
    }
}

// ==========================================
// MemoryAuditSink - 内存版审计输出
// ==========================================
#[derive(Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
    fail: bool,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn write(&self, entry: AuditEntry) -> RepositoryResult<()> {
        if self.fail {
            return Err(RepositoryError::LockError(
                "audit database unavailable".to_string(),
            ));
        }
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

/// 内存协作方装配的编排器
pub fn memory_orchestrator(
    store: Arc<MemoryRecordStore>,
    sink: Arc<MemoryAuditSink>,
    settings: ImportSettings,
) -> ImportOrchestrator {
    ImportOrchestrator::new(store, sink, Arc::new(settings))
}

// ==========================================
// 测试数据生成
// ==========================================

/// n 行合法摄像头 CSV（名称与 IP 均唯一）
pub fn camera_csv(n: usize) -> String {
    let mut csv = String::from("name,type,ipAddress,location\n");
    for i in 0..n {
        csv.push_str(&format!(
            "Cam-{:04},IP,10.0.{}.{},Hall {}\n",
            i + 1,
            i / 250,
            i % 250 + 1,
            i % 7
        ));
    }
    csv
}

/// 将数据行号（从 2 开始）对应行的 type 置空
pub fn camera_csv_with_blank_type(n: usize, row_number: usize) -> String {
    let mut lines: Vec<String> = camera_csv(n).lines().map(str::to_string).collect();
    let idx = row_number - 1;
    let cols: Vec<&str> = lines[idx].split(',').collect();
    lines[idx] = format!("{},,{},{}", cols[0], cols[2], cols[3]);
    lines.join("\n")
}
