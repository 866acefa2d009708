// ==========================================
// 机器人设备数据导入系统 - 实体转换器
// ==========================================
// 职责: 标准化行 → 业务实体（尽力解析，不报告格式错误）
// 规则: 字符串去空白；布尔 true/1/yes | false/0/no，否则取默认；
//       整数/小数解析失败即 None；日期按共用格式表解析
// ==========================================

use crate::domain::entity::{Camera, MapRecord, Robot, Task, TypedEntity, User};
use crate::domain::row::NormalizedRow;
use crate::domain::types::EntityKind;
use crate::importer::date_formats::parse_datetime;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::Transformer;
use chrono::NaiveDateTime;

/// isActive 缺省值
const DEFAULT_ACTIVE: bool = true;

// ==========================================
// EntityTransformer
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityTransformer;

impl EntityTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for EntityTransformer {
    fn transform(
        &self,
        row: &NormalizedRow,
        kind: EntityKind,
        row_number: usize,
    ) -> ImportResult<TypedEntity> {
        let fields = RowFields { row, row_number };
        let entity = match kind {
            EntityKind::Camera => TypedEntity::Camera(Camera {
                name: fields.required("name")?,
                camera_type: fields.required("type")?,
                ip_address: fields.string("ipAddress"),
                location: fields.string("location"),
                description: fields.string("description"),
                is_active: fields.boolean("isActive", DEFAULT_ACTIVE),
            }),
            EntityKind::Robot => TypedEntity::Robot(Robot {
                name: fields.required("name")?,
                model: fields.required("model")?,
                serial_number: fields.string("serialNumber"),
                manufacturer: fields.string("manufacturer"),
                description: fields.string("description"),
                is_active: fields.boolean("isActive", DEFAULT_ACTIVE),
            }),
            EntityKind::Task => TypedEntity::Task(Task {
                name: fields.required("name")?,
                task_type: fields.required("type")?,
                priority: fields.integer("priority"),
                status: fields.string("status"),
                assigned_to: fields.string("assignedTo"),
                due_date: fields.datetime("dueDate"),
                description: fields.string("description"),
                is_active: fields.boolean("isActive", DEFAULT_ACTIVE),
            }),
            EntityKind::User => TypedEntity::User(User {
                username: fields.required("username")?,
                email: fields.required("email")?,
                first_name: fields.string("firstName"),
                last_name: fields.string("lastName"),
                role: fields.string("role"),
                department: fields.string("department"),
                is_active: fields.boolean("isActive", DEFAULT_ACTIVE),
            }),
            EntityKind::Map => TypedEntity::Map(MapRecord {
                name: fields.required("name")?,
                map_type: fields.required("type")?,
                resolution: fields.double("resolution"),
                width: fields.integer("width"),
                height: fields.integer("height"),
                origin_x: fields.double("originX"),
                origin_y: fields.double("originY"),
                description: fields.string("description"),
                is_active: fields.boolean("isActive", DEFAULT_ACTIVE),
            }),
        };
        Ok(entity)
    }
}

impl EntityTransformer {
    /// 按请求字符串转换；未知类别为调用方错误
    pub fn transform_str(
        &self,
        row: &NormalizedRow,
        entity_kind: &str,
        row_number: usize,
    ) -> ImportResult<TypedEntity> {
        let kind = EntityKind::parse(entity_kind)
            .ok_or_else(|| ImportError::UnsupportedEntityKind(entity_kind.to_string()))?;
        self.transform(row, kind, row_number)
    }
}

// 单行字段读取器
struct RowFields<'a> {
    row: &'a NormalizedRow,
    row_number: usize,
}

impl RowFields<'_> {
    fn string(&self, field: &str) -> Option<String> {
        self.row.get(field).and_then(|v| v.as_trimmed_text())
    }

    fn required(&self, field: &str) -> ImportResult<String> {
        self.string(field).ok_or_else(|| ImportError::MissingField {
            row: self.row_number,
            field: field.to_string(),
        })
    }

    fn boolean(&self, field: &str, default: bool) -> bool {
        match self.string(field).map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("true" | "1" | "yes") => true,
            Some("false" | "0" | "no") => false,
            _ => default,
        }
    }

    fn integer(&self, field: &str) -> Option<i32> {
        self.string(field).and_then(|s| s.parse::<i32>().ok())
    }

    fn double(&self, field: &str) -> Option<f64> {
        self.string(field)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    fn datetime(&self, field: &str) -> Option<NaiveDateTime> {
        self.string(field).as_deref().and_then(parse_datetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::CellValue;
    use chrono::NaiveDate;

    fn row(pairs: &[(&str, CellValue)]) -> NormalizedRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_camera_defaults_and_trimming() {
        let transformer = EntityTransformer::new();
        let r = row(&[
            ("name", text("  Lobby ")),
            ("type", text("PTZ")),
            ("ipAddress", CellValue::Null),
            ("isActive", text("maybe")),
        ]);

        match transformer.transform(&r, EntityKind::Camera, 2).unwrap() {
            TypedEntity::Camera(c) => {
                assert_eq!(c.name, "Lobby");
                assert_eq!(c.ip_address, None);
                assert!(c.is_active);
            }
            other => panic!("unexpected entity: {:?}", other),
        }
    }

    #[test]
    fn test_task_coercions() {
        let transformer = EntityTransformer::new();
        let r = row(&[
            ("name", text("Sweep")),
            ("type", text("CLEANING")),
            ("priority", text("high")),
            ("dueDate", text("2025-06-01")),
            ("isActive", CellValue::Int(0)),
        ]);

        match transformer.transform(&r, EntityKind::Task, 5).unwrap() {
            TypedEntity::Task(t) => {
                assert_eq!(t.priority, None);
                assert_eq!(
                    t.due_date,
                    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(0, 0, 0)
                );
                assert!(!t.is_active);
            }
            other => panic!("unexpected entity: {:?}", other),
        }
    }

    #[test]
    fn test_map_numbers() {
        let transformer = EntityTransformer::new();
        let r = row(&[
            ("name", text("Floor")),
            ("type", text("HYBRID")),
            ("resolution", CellValue::Float(0.05)),
            ("width", CellValue::Int(640)),
            ("height", CellValue::Float(480.0)),
            ("originX", text("-3.5")),
        ]);

        match transformer.transform(&r, EntityKind::Map, 2).unwrap() {
            TypedEntity::Map(m) => {
                assert_eq!(m.resolution, Some(0.05));
                assert_eq!(m.width, Some(640));
                assert_eq!(m.height, None);
                assert_eq!(m.origin_x, Some(-3.5));
                assert_eq!(m.origin_y, None);
            }
            other => panic!("unexpected entity: {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_field() {
        let transformer = EntityTransformer::new();
        let r = row(&[("username", text("alice"))]);

        let err = transformer.transform(&r, EntityKind::User, 7).unwrap_err();
        match err {
            ImportError::MissingField { row, field } => {
                assert_eq!(row, 7);
                assert_eq!(field, "email");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_is_raised() {
        let transformer = EntityTransformer::new();
        let r = row(&[("name", text("x"))]);
        assert!(matches!(
            transformer.transform_str(&r, "drone", 2),
            Err(ImportError::UnsupportedEntityKind(_))
        ));
    }
}
