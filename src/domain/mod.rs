// ==========================================
// 机器人设备数据导入系统 - 领域模型层
// ==========================================
// 职责: 定义实体类别、标准化行、业务实体、报告与审计结构
// 红线: 不含数据访问逻辑，不含导入管道逻辑
// ==========================================

pub mod audit;
pub mod entity;
pub mod report;
pub mod row;
pub mod types;

// 重导出核心类型
pub use audit::{audit_file_name, AuditEntry, SYSTEM_ACTOR};
pub use entity::{Camera, MapRecord, Robot, Task, TypedEntity, User};
pub use report::{ErrorCode, ImportReport, ImportRequest, ValidationError};
pub use row::{remap_fields, CellValue, NormalizedRow};
pub use types::{AuditStatus, EntityKind, ImportStatus, OperationType};
