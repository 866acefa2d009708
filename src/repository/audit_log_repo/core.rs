use crate::domain::audit::AuditEntry;
use crate::repository::audit_sink::AuditSink;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// audit_log.created_at 的存储格式
pub(super) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// ==========================================
// AuditLogRepository - 审计日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct AuditLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AuditLogRepository {
    /// 创建新的审计日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入审计记录
    ///
    /// # 返回
    /// - `Ok(audit_id)`: 成功插入
    /// - `Err(...)`: 数据库错误
    pub fn insert(&self, entry: &AuditEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO audit_log (
                audit_id, operation_type, entity_kind, actor_id, source_file_name,
                records_processed, records_successful, records_failed,
                processing_time_ms, status, error_message, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                entry.audit_id,
                entry.operation_type.as_str(),
                entry.entity_kind,
                entry.actor_id,
                entry.source_file_name,
                entry.records_processed,
                entry.records_successful,
                entry.records_failed,
                entry.processing_time_ms as i64,
                entry.status.as_str(),
                entry.error_message,
                entry.created_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        Ok(entry.audit_id.clone())
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    async fn write(&self, entry: AuditEntry) -> RepositoryResult<()> {
        self.insert(&entry).map(|_| ())
    }
}
