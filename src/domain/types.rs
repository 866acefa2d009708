// ==========================================
// 机器人设备数据导入系统 - 领域类型定义
// ==========================================
// 职责: 实体类别 / 报告状态 / 审计枚举
// 序列化格式: 与数据库及对外报告一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体类别 (Entity Kind)
// ==========================================
// 封闭集合: 决定校验规则集、转换器与持久化目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Camera, // 摄像头
    Robot,  // 机器人
    Task,   // 任务
    User,   // 用户
    Map,    // 地图
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Camera,
        EntityKind::Robot,
        EntityKind::Task,
        EntityKind::User,
        EntityKind::Map,
    ];

    /// 从请求字符串解析实体类别（大小写不敏感，去除首尾空白）
    ///
    /// # 返回
    /// - None: 未知类别
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "camera" => Some(EntityKind::Camera),
            "robot" => Some(EntityKind::Robot),
            "task" => Some(EntityKind::Task),
            "user" => Some(EntityKind::User),
            "map" => Some(EntityKind::Map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Camera => "camera",
            EntityKind::Robot => "robot",
            EntityKind::Task => "task",
            EntityKind::User => "user",
            EntityKind::Map => "map",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 导入报告状态 (Import Status)
// ==========================================
// VALID / VALIDATION_ERRORS: 仅校验模式
// SUCCESS / PARTIAL / FAILURE: 导入模式
// ERROR: 管道级异常（未进入行处理）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    Valid,
    ValidationErrors,
    Success,
    Partial,
    Failure,
    Error,
}

impl ImportStatus {
    /// 按成功/失败计数推导导入模式的最终状态
    pub fn from_counts(successful: i64, failed: i64) -> Self {
        if failed <= 0 {
            ImportStatus::Success
        } else if successful > 0 {
            ImportStatus::Partial
        } else {
            ImportStatus::Failure
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStatus::Valid => write!(f, "VALID"),
            ImportStatus::ValidationErrors => write!(f, "VALIDATION_ERRORS"),
            ImportStatus::Success => write!(f, "SUCCESS"),
            ImportStatus::Partial => write!(f, "PARTIAL"),
            ImportStatus::Failure => write!(f, "FAILURE"),
            ImportStatus::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// 审计操作类型 (Operation Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Import,
    Export,
    Validation,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Import => "IMPORT",
            OperationType::Export => "EXPORT",
            OperationType::Validation => "VALIDATION",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "IMPORT" => Some(OperationType::Import),
            "EXPORT" => Some(OperationType::Export),
            "VALIDATION" => Some(OperationType::Validation),
            _ => None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 审计状态 (Audit Status)
// ==========================================
// 审计轨迹中的状态比报告状态多一个 VALIDATION_FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Success,
    Partial,
    Failure,
    Valid,
    ValidationErrors,
    ValidationFailed,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "SUCCESS",
            AuditStatus::Partial => "PARTIAL",
            AuditStatus::Failure => "FAILURE",
            AuditStatus::Valid => "VALID",
            AuditStatus::ValidationErrors => "VALIDATION_ERRORS",
            AuditStatus::ValidationFailed => "VALIDATION_FAILED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "SUCCESS" => Some(AuditStatus::Success),
            "PARTIAL" => Some(AuditStatus::Partial),
            "FAILURE" => Some(AuditStatus::Failure),
            "VALID" => Some(AuditStatus::Valid),
            "VALIDATION_ERRORS" => Some(AuditStatus::ValidationErrors),
            "VALIDATION_FAILED" => Some(AuditStatus::ValidationFailed),
            _ => None,
        }
    }
}

impl From<ImportStatus> for AuditStatus {
    fn from(status: ImportStatus) -> Self {
        match status {
            ImportStatus::Valid => AuditStatus::Valid,
            ImportStatus::ValidationErrors => AuditStatus::ValidationErrors,
            ImportStatus::Success => AuditStatus::Success,
            ImportStatus::Partial => AuditStatus::Partial,
            ImportStatus::Failure | ImportStatus::Error => AuditStatus::Failure,
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_parse() {
        assert_eq!(EntityKind::parse("camera"), Some(EntityKind::Camera));
        assert_eq!(EntityKind::parse(" ROBOT "), Some(EntityKind::Robot));
        assert_eq!(EntityKind::parse("Map"), Some(EntityKind::Map));
        assert_eq!(EntityKind::parse("drone"), None);
        assert_eq!(EntityKind::parse(""), None);
    }

    #[test]
    fn test_import_status_from_counts() {
        assert_eq!(ImportStatus::from_counts(10, 0), ImportStatus::Success);
        assert_eq!(ImportStatus::from_counts(0, 0), ImportStatus::Success);
        assert_eq!(ImportStatus::from_counts(9, 1), ImportStatus::Partial);
        assert_eq!(ImportStatus::from_counts(0, 3), ImportStatus::Failure);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ImportStatus::ValidationErrors).unwrap();
        assert_eq!(json, "\"VALIDATION_ERRORS\"");
        let json = serde_json::to_string(&EntityKind::Camera).unwrap();
        assert_eq!(json, "\"camera\"");
        assert_eq!(AuditStatus::from(ImportStatus::Error), AuditStatus::Failure);
    }
}
