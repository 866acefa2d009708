// ==========================================
// 机器人设备数据导入系统 - 导入API
// ==========================================
// 职责: 装配 SQLite 记录存储/审计/配置与导入编排器
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::audit::AuditEntry;
use crate::domain::report::{ImportReport, ImportRequest};
use crate::domain::types::{EntityKind, OperationType};
use crate::importer::ImportOrchestrator;
use crate::repository::{AuditLogRepository, SqliteRecordStore};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 导入API
pub struct ImportApi {
    orchestrator: ImportOrchestrator,
    record_store: Arc<SqliteRecordStore>,
    audit_repo: Arc<AuditLogRepository>,
    config: ConfigManager,
}

impl ImportApi {
    /// 打开（必要时创建）数据库并装配导入管道
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        info!(db_path = db_path, "数据库已打开");
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接装配（建表幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(format!("锁获取失败: {}", e)))?;
            init_schema(&guard).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        let record_store = Arc::new(SqliteRecordStore::new(conn.clone()));
        let audit_repo = Arc::new(AuditLogRepository::new(conn.clone()));
        let config = ConfigManager::from_connection(conn)?;

        let orchestrator = ImportOrchestrator::new(
            record_store.clone(),
            audit_repo.clone(),
            Arc::new(config.clone()),
        );

        Ok(Self {
            orchestrator,
            record_store,
            audit_repo,
            config,
        })
    }

    /// 导入本地文件
    ///
    /// 文件缺失或不可读时按空文件处理（返回 ERROR 报告并写审计）
    pub async fn import_file(&self, path: &Path, mut request: ImportRequest) -> ImportReport {
        if request.file_name.trim().is_empty() {
            request.file_name = path.to_string_lossy().into_owned();
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "文件读取失败");
                Vec::new()
            }
        };
        self.orchestrator.import_data(&bytes, &request).await
    }

    /// 导入内存中的文件内容
    pub async fn import_bytes(&self, bytes: &[u8], request: &ImportRequest) -> ImportReport {
        self.orchestrator.import_data(bytes, request).await
    }

    /// 并发导入多个相互独立的文件
    pub async fn import_many(&self, jobs: Vec<(Vec<u8>, ImportRequest)>) -> Vec<ImportReport> {
        self.orchestrator.import_many(jobs).await
    }

    /// 最近的审计记录
    pub fn list_audit_logs(&self, limit: usize) -> ApiResult<Vec<AuditEntry>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        Ok(self.audit_repo.list_recent(limit)?)
    }

    /// 指定实体类别的审计记录
    pub fn list_audit_logs_by_kind(
        &self,
        entity_kind: &str,
        limit: usize,
    ) -> ApiResult<Vec<AuditEntry>> {
        Ok(self.audit_repo.list_by_entity_kind(entity_kind, limit)?)
    }

    /// 指定操作类型的审计记录
    pub fn list_audit_logs_by_operation(
        &self,
        operation_type: OperationType,
        limit: usize,
    ) -> ApiResult<Vec<AuditEntry>> {
        Ok(self.audit_repo.list_by_operation_type(operation_type, limit)?)
    }

    /// 已持久化的记录数
    pub fn record_count(&self, kind: EntityKind) -> ApiResult<i64> {
        Ok(self.record_store.count(kind)?)
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }
}
