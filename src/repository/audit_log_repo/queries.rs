use super::core::{AuditLogRepository, TS_FORMAT};
use crate::domain::audit::AuditEntry;
use crate::domain::types::{AuditStatus, OperationType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT audit_id, operation_type, entity_kind, actor_id, source_file_name,
           records_processed, records_successful, records_failed,
           processing_time_ms, status, error_message, created_at
    FROM audit_log
"#;

impl AuditLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 audit_id 查询
    pub fn find_by_id(&self, audit_id: &str) -> RepositoryResult<Option<AuditEntry>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE audit_id = ?", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![audit_id], |row| self.map_row(row)) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 最近的审计记录（按时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<AuditEntry>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY created_at DESC, rowid DESC LIMIT ?", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map(params![limit as i64], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// 指定实体类别的审计记录
    pub fn list_by_entity_kind(
        &self,
        entity_kind: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<AuditEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE entity_kind = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map(params![entity_kind, limit as i64], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// 指定操作类型的审计记录
    pub fn list_by_operation_type(
        &self,
        operation_type: OperationType,
        limit: usize,
    ) -> RepositoryResult<Vec<AuditEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE operation_type = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map(params![operation_type.as_str(), limit as i64], |row| {
                self.map_row(row)
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_row(&self, row: &Row) -> SqliteResult<AuditEntry> {
        let operation_raw: String = row.get(1)?;
        let status_raw: String = row.get(9)?;
        let created_raw: String = row.get(11)?;
        let processing_ms: i64 = row.get(8)?;

        let operation_type = OperationType::parse(&operation_raw)
            .ok_or_else(|| invalid_column(1, "operation_type", &operation_raw))?;
        let status = AuditStatus::parse(&status_raw)
            .ok_or_else(|| invalid_column(9, "status", &status_raw))?;
        let created_at = NaiveDateTime::parse_from_str(&created_raw, TS_FORMAT)
            .map_err(|_| invalid_column(11, "created_at", &created_raw))?;

        Ok(AuditEntry {
            audit_id: row.get(0)?,
            operation_type,
            entity_kind: row.get(2)?,
            actor_id: row.get(3)?,
            source_file_name: row.get(4)?,
            records_processed: row.get(5)?,
            records_successful: row.get(6)?,
            records_failed: row.get(7)?,
            processing_time_ms: processing_ms.max(0) as u64,
            status,
            error_message: row.get(10)?,
            created_at,
        })
    }
}

fn invalid_column(idx: usize, field: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("无法识别的值: {}", value),
        }),
    )
}
