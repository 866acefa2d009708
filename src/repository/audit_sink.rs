// ==========================================
// 机器人设备数据导入系统 - 审计输出 Trait
// ==========================================
// 红线: 管道视角下"写后即忘"，失败不得掩盖管道自身结果
// ==========================================

use crate::domain::audit::AuditEntry;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// AuditSink Trait
// ==========================================
// 实现者: AuditLogRepository（使用 rusqlite）
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// 写入一条审计记录（所有权移交，写入后不再修改）
    async fn write(&self, entry: AuditEntry) -> RepositoryResult<()>;
}
