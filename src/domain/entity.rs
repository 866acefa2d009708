// ==========================================
// 机器人设备数据导入系统 - 业务实体
// ==========================================
// 用途: 转换器输出 / 持久化输入
// 对齐: db.rs 中各实体表结构
// ==========================================

use crate::domain::types::EntityKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Camera - 摄像头
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub name: String,                // 名称（自然键）
    pub camera_type: String,         // 类型 IP/ANALOG/PTZ/...
    pub ip_address: Option<String>,  // IPv4 地址（自然键）
    pub location: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

// ==========================================
// Robot - 机器人
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub name: String,                  // 名称（自然键）
    pub model: String,                 // 型号
    pub serial_number: Option<String>, // 序列号（自然键）
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

// ==========================================
// Task - 任务
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,                     // 名称（自然键）
    pub task_type: String,                // 类型 MAINTENANCE/INSPECTION/...
    pub priority: Option<i32>,            // 优先级 1-10
    pub status: Option<String>,           // PENDING/IN_PROGRESS/...
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub is_active: bool,
}

// ==========================================
// User - 用户
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String, // 用户名（自然键）
    pub email: String,    // 邮箱（自然键）
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
}

// ==========================================
// MapRecord - 地图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub name: String,             // 名称（自然键）
    pub map_type: String,         // FLOOR_PLAN/OCCUPANCY_GRID/...
    pub resolution: Option<f64>,  // 分辨率 (0, 10]
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub origin_x: Option<f64>,
    pub origin_y: Option<f64>,
    pub description: Option<String>,
    pub is_active: bool,
}

// ==========================================
// TypedEntity - 按实体类别区分的记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypedEntity {
    Camera(Camera),
    Robot(Robot),
    Task(Task),
    User(User),
    Map(MapRecord),
}

impl TypedEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            TypedEntity::Camera(_) => EntityKind::Camera,
            TypedEntity::Robot(_) => EntityKind::Robot,
            TypedEntity::Task(_) => EntityKind::Task,
            TypedEntity::User(_) => EntityKind::User,
            TypedEntity::Map(_) => EntityKind::Map,
        }
    }

    /// 主显示名（用户返回用户名）
    pub fn display_name(&self) -> &str {
        match self {
            TypedEntity::Camera(c) => &c.name,
            TypedEntity::Robot(r) => &r.name,
            TypedEntity::Task(t) => &t.name,
            TypedEntity::User(u) => &u.username,
            TypedEntity::Map(m) => &m.name,
        }
    }
}
