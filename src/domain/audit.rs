// ==========================================
// 机器人设备数据导入系统 - 审计记录领域模型
// ==========================================
// 红线: 每次管道调用恰好写入一条，交给 AuditSink 后不再修改
// 对齐: db.rs audit_log 表
// ==========================================

use crate::domain::types::{AuditStatus, OperationType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 未指定操作人时的默认值
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    // ===== 标识 =====
    pub audit_id: String,           // 审计ID (UUID，同时作为本次运行的 run_id)
    pub operation_type: OperationType,
    pub entity_kind: String,        // 原始请求值（可能是未知类别）
    pub actor_id: String,
    pub source_file_name: Option<String>,

    // ===== 计数 =====
    pub records_processed: i64,
    pub records_successful: i64,
    pub records_failed: i64,
    pub processing_time_ms: u64,

    // ===== 结果 =====
    pub status: AuditStatus,
    pub error_message: Option<String>,
    pub created_at: NaiveDateTime,  // 调用开始时间
}

/// 只保留路径最后一段作为审计中的源文件名
pub fn audit_file_name(file_name: &str) -> Option<String> {
    let trimmed = file_name.trim();
    if trimmed.is_empty() {
        return None;
    }
    let last = trimmed
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(trimmed);
    if last.is_empty() {
        None
    } else {
        Some(last.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_file_name() {
        assert_eq!(audit_file_name("cams.csv"), Some("cams.csv".to_string()));
        assert_eq!(
            audit_file_name("../uploads/2024/cams.csv"),
            Some("cams.csv".to_string())
        );
        assert_eq!(audit_file_name("C:\\data\\maps.json"), Some("maps.json".to_string()));
        assert_eq!(audit_file_name("  "), None);
        assert_eq!(audit_file_name("dir/"), None);
    }
}
