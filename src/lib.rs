// ==========================================
// 机器人设备数据导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 多格式数据导入管道（解析 → 清洗 → 校验 → 转换 → 分批落库 → 审计）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 导入管道
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 对外接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AuditStatus, EntityKind, ImportStatus, OperationType};

// 领域实体
pub use domain::{
    AuditEntry, CellValue, ErrorCode, ImportReport, ImportRequest, NormalizedRow, TypedEntity,
    ValidationError,
};

// 导入管道
pub use importer::{ImportError, ImportOrchestrator, ImportResult};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "机器人设备数据导入系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
