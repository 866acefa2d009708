// ==========================================
// 机器人设备数据导入系统 - 记录存储 Trait
// ==========================================
// 职责: 定义已提交记录的唯一性查询与批量写入接口
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::entity::TypedEntity;
use crate::domain::types::EntityKind;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// RecordStore Trait
// ==========================================
// 用途: 导入管道唯一被修改的共享资源
// 实现者: SqliteRecordStore（使用 rusqlite）
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 是否已存在与自然键冲突的记录
    ///
    /// # 参数
    /// - kind: 实体类别
    /// - key_fields: (字段名, 值) 列表，全部相等才算冲突
    ///
    /// # 返回
    /// - Ok(true): 已存在
    /// - Err: 未知字段或数据库错误
    async fn exists_by_natural_key(
        &self,
        kind: EntityKind,
        key_fields: &[(&str, &str)],
    ) -> RepositoryResult<bool>;

    /// 批量保存实体（单次调用对应一个批次）
    ///
    /// # 返回
    /// - Ok(usize): 实际保存的记录数
    /// - Err: 数据库错误（该批次整体回滚）
    async fn save_batch(
        &self,
        kind: EntityKind,
        entities: Vec<TypedEntity>,
    ) -> RepositoryResult<usize>;
}
