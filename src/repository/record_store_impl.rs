// ==========================================
// 机器人设备数据导入系统 - 记录存储实现
// ==========================================
// 职责: 实现唯一性查询与批量写入（使用 rusqlite）
// 约束: 自然键字段走白名单映射，所有值参数化
// 粒度: 每次 save_batch 一个事务
// ==========================================

use crate::domain::entity::{Camera, MapRecord, Robot, Task, TypedEntity, User};
use crate::domain::types::EntityKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::RecordStore;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// 实体类别 → 表名
pub fn table_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Camera => "camera",
        EntityKind::Robot => "robot",
        EntityKind::Task => "task",
        EntityKind::User => "app_user",
        EntityKind::Map => "map_record",
    }
}

/// 自然键字段 → 列名（白名单）
pub fn key_column(kind: EntityKind, field: &str) -> Option<&'static str> {
    match (kind, field) {
        (EntityKind::Camera, "name") => Some("name"),
        (EntityKind::Camera, "ipAddress") => Some("ip_address"),
        (EntityKind::Robot, "name") => Some("name"),
        (EntityKind::Robot, "serialNumber") => Some("serial_number"),
        (EntityKind::Task, "name") => Some("name"),
        (EntityKind::User, "username") => Some("username"),
        (EntityKind::User, "email") => Some("email"),
        (EntityKind::Map, "name") => Some("name"),
        _ => None,
    }
}

// ==========================================
// SqliteRecordStore
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// 创建新的记录存储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 统计某类别已保存的记录数
    pub fn count(&self, kind: EntityKind) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT COUNT(*) FROM {}", table_name(kind));
        let count = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    fn now_text() -> String {
        Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn insert_camera(tx: &Transaction, camera: &Camera, created_at: &str) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO camera (
                name, camera_type, ip_address, location, description, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                camera.name,
                camera.camera_type,
                camera.ip_address,
                camera.location,
                camera.description,
                camera.is_active as i32,
                created_at,
            ],
        )?;
        Ok(())
    }

    fn insert_robot(tx: &Transaction, robot: &Robot, created_at: &str) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO robot (
                name, model, serial_number, manufacturer, description, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                robot.name,
                robot.model,
                robot.serial_number,
                robot.manufacturer,
                robot.description,
                robot.is_active as i32,
                created_at,
            ],
        )?;
        Ok(())
    }

    fn insert_task(tx: &Transaction, task: &Task, created_at: &str) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO task (
                name, task_type, priority, status, assigned_to, due_date,
                description, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                task.name,
                task.task_type,
                task.priority,
                task.status,
                task.assigned_to,
                task.due_date.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
                task.description,
                task.is_active as i32,
                created_at,
            ],
        )?;
        Ok(())
    }

    fn insert_user(tx: &Transaction, user: &User, created_at: &str) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO app_user (
                username, email, first_name, last_name, role, department, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user.username,
                user.email,
                user.first_name,
                user.last_name,
                user.role,
                user.department,
                user.is_active as i32,
                created_at,
            ],
        )?;
        Ok(())
    }

    fn insert_map(tx: &Transaction, map: &MapRecord, created_at: &str) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO map_record (
                name, map_type, resolution, width, height, origin_x, origin_y,
                description, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                map.name,
                map.map_type,
                map.resolution,
                map.width,
                map.height,
                map.origin_x,
                map.origin_y,
                map.description,
                map.is_active as i32,
                created_at,
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn exists_by_natural_key(
        &self,
        kind: EntityKind,
        key_fields: &[(&str, &str)],
    ) -> RepositoryResult<bool> {
        if key_fields.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "key_fields".to_string(),
                message: "自然键字段不能为空".to_string(),
            });
        }

        let mut conditions = Vec::with_capacity(key_fields.len());
        let mut values = Vec::with_capacity(key_fields.len());
        for (idx, (field, value)) in key_fields.iter().enumerate() {
            let column = key_column(kind, field).ok_or_else(|| RepositoryError::FieldValueError {
                field: field.to_string(),
                message: format!("{} 不是 {} 的自然键字段", field, kind),
            })?;
            conditions.push(format!("{} = ?{}", column, idx + 1));
            values.push(SqlValue::Text(value.to_string()));
        }

        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {})",
            table_name(kind),
            conditions.join(" AND ")
        );

        let conn = self.get_conn()?;
        let exists: bool = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(exists)
    }

    async fn save_batch(
        &self,
        kind: EntityKind,
        entities: Vec<TypedEntity>,
    ) -> RepositoryResult<usize> {
        if entities.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let created_at = Self::now_text();

        let mut count = 0;
        for entity in &entities {
            if entity.kind() != kind {
                // tx 未提交，drop 时回滚
                return Err(RepositoryError::EntityKindMismatch {
                    expected: kind.to_string(),
                    actual: entity.kind().to_string(),
                });
            }
            match entity {
                TypedEntity::Camera(c) => Self::insert_camera(&tx, c, &created_at)?,
                TypedEntity::Robot(r) => Self::insert_robot(&tx, r, &created_at)?,
                TypedEntity::Task(t) => Self::insert_task(&tx, t, &created_at)?,
                TypedEntity::User(u) => Self::insert_user(&tx, u, &created_at)?,
                TypedEntity::Map(m) => Self::insert_map(&tx, m, &created_at)?,
            }
            count += 1;
        }

        tx.commit()?;
        debug!(entity_kind = %kind, saved = count, "批次写入完成");
        Ok(count)
    }
}
