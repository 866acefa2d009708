// ==========================================
// 机器人设备数据导入系统 - 审计日志数据仓储
// ==========================================
// 对齐: db.rs audit_log 表
// 红线: 每次管道调用恰好写入一条
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use core::AuditLogRepository;
