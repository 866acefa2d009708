// ==========================================
// 机器人设备数据导入系统 - 校验引擎
// ==========================================
// 职责: 按实体类别的规则表逐行校验，累积字段级错误
// 顺序: 必填 → 格式/枚举 → 类型/范围/长度 → 日期 → 跨存储唯一性
// 红线: 错误从不中断其余行的校验；无内部可变状态
// ==========================================

use crate::config::settings::ImportSettings;
use crate::domain::report::{ErrorCode, ImportReport, ValidationError};
use crate::domain::row::NormalizedRow;
use crate::domain::types::EntityKind;
use crate::importer::date_formats::parse_datetime;
use crate::importer::error::ImportResult;
use crate::repository::record_store::RecordStore;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// 第一条数据行的行号（第 1 行为表头）
pub const FIRST_DATA_ROW: usize = 2;

/// 行序号（从 0 开始）→ 报告行号
pub fn row_number(index: usize) -> usize {
    index + FIRST_DATA_ROW
}

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("hard-coded regular expression to be valid")
});

static IPV4_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .expect("hard-coded regular expression to be valid")
});

static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]+$").expect("hard-coded regular expression to be valid")
});

// ==========================================
// 枚举取值表（大小写不敏感匹配）
// ==========================================
const CAMERA_TYPES: &[&str] = &["IP", "ANALOG", "PTZ", "DOME", "BULLET", "FISHEYE"];
const TASK_TYPES: &[&str] = &[
    "MAINTENANCE",
    "INSPECTION",
    "CLEANING",
    "DELIVERY",
    "PATROL",
    "CUSTOM",
];
const TASK_STATUSES: &[&str] = &["PENDING", "IN_PROGRESS", "COMPLETED", "CANCELLED", "ON_HOLD"];
const USER_ROLES: &[&str] = &["ADMIN", "MANAGER", "OPERATOR", "VIEWER", "TECHNICIAN"];
const MAP_TYPES: &[&str] = &[
    "FLOOR_PLAN",
    "OCCUPANCY_GRID",
    "TOPOLOGICAL",
    "HYBRID",
    "3D_POINT_CLOUD",
];

// ==========================================
// 规则定义
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Email,
    Ipv4,
    Identifier,
}

impl Pattern {
    fn regex(self) -> &'static Regex {
        match self {
            Pattern::Email => &EMAIL_PATTERN,
            Pattern::Ipv4 => &IPV4_PATTERN,
            Pattern::Identifier => &IDENTIFIER_PATTERN,
        }
    }

    fn code(self) -> ErrorCode {
        match self {
            Pattern::Email => ErrorCode::InvalidEmail,
            Pattern::Ipv4 => ErrorCode::InvalidIp,
            Pattern::Identifier => ErrorCode::InvalidFormat,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Pattern::Email => "邮箱格式无效",
            Pattern::Ipv4 => "IP 地址格式无效",
            Pattern::Identifier => "格式无效",
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Pattern::Email => "valid email format",
            Pattern::Ipv4 => "valid IPv4 address (e.g. 192.168.1.1)",
            Pattern::Identifier => "letters, digits, hyphens and underscores only",
        }
    }
}

/// 规则类别（决定执行顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Format,
    TypeRange,
    Date,
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Format(Pattern),
    OneOf {
        values: &'static [&'static str],
        code: ErrorCode,
    },
    Boolean,
    Integer {
        min: i64,
        max: i64,
    },
    Double {
        min: f64,
        max: f64,
        min_exclusive: bool,
    },
    Length {
        min: usize,
        max: usize,
    },
    Date,
}

impl Rule {
    fn category(&self) -> Category {
        match self {
            Rule::Format(_) | Rule::OneOf { .. } => Category::Format,
            Rule::Boolean | Rule::Integer { .. } | Rule::Double { .. } | Rule::Length { .. } => {
                Category::TypeRange
            }
            Rule::Date => Category::Date,
        }
    }
}

struct FieldRules {
    field: &'static str,
    rules: &'static [Rule],
}

struct KindRules {
    required: &'static [&'static str],
    fields: &'static [FieldRules],
    unique: &'static [(&'static str, ErrorCode)],
}

const fn max_len(max: usize) -> Rule {
    Rule::Length { min: 0, max }
}

const IS_ACTIVE: FieldRules = FieldRules {
    field: "isActive",
    rules: &[Rule::Boolean],
};

static CAMERA_RULES: KindRules = KindRules {
    required: &["name", "type"],
    fields: &[
        FieldRules {
            field: "name",
            rules: &[max_len(100)],
        },
        FieldRules {
            field: "type",
            rules: &[Rule::OneOf {
                values: CAMERA_TYPES,
                code: ErrorCode::InvalidType,
            }],
        },
        FieldRules {
            field: "ipAddress",
            rules: &[Rule::Format(Pattern::Ipv4)],
        },
        IS_ACTIVE,
    ],
    unique: &[
        ("name", ErrorCode::DuplicateName),
        ("ipAddress", ErrorCode::DuplicateIp),
    ],
};

static ROBOT_RULES: KindRules = KindRules {
    required: &["name", "model"],
    fields: &[
        FieldRules {
            field: "name",
            rules: &[max_len(100)],
        },
        FieldRules {
            field: "serialNumber",
            rules: &[
                Rule::Format(Pattern::Identifier),
                Rule::Length { min: 5, max: 50 },
            ],
        },
        FieldRules {
            field: "manufacturer",
            rules: &[max_len(100)],
        },
        IS_ACTIVE,
    ],
    unique: &[
        ("name", ErrorCode::DuplicateName),
        ("serialNumber", ErrorCode::DuplicateSerial),
    ],
};

static TASK_RULES: KindRules = KindRules {
    required: &["name", "type"],
    fields: &[
        FieldRules {
            field: "name",
            rules: &[max_len(200)],
        },
        FieldRules {
            field: "type",
            rules: &[Rule::OneOf {
                values: TASK_TYPES,
                code: ErrorCode::InvalidType,
            }],
        },
        FieldRules {
            field: "priority",
            rules: &[Rule::Integer { min: 1, max: 10 }],
        },
        FieldRules {
            field: "status",
            rules: &[Rule::OneOf {
                values: TASK_STATUSES,
                code: ErrorCode::InvalidStatus,
            }],
        },
        FieldRules {
            field: "assignedTo",
            rules: &[max_len(100)],
        },
        FieldRules {
            field: "dueDate",
            rules: &[Rule::Date],
        },
        IS_ACTIVE,
    ],
    unique: &[("name", ErrorCode::DuplicateName)],
};

static USER_RULES: KindRules = KindRules {
    required: &["username", "email"],
    fields: &[
        FieldRules {
            field: "username",
            rules: &[
                Rule::Format(Pattern::Identifier),
                Rule::Length { min: 3, max: 50 },
            ],
        },
        FieldRules {
            field: "email",
            rules: &[Rule::Format(Pattern::Email)],
        },
        FieldRules {
            field: "role",
            rules: &[Rule::OneOf {
                values: USER_ROLES,
                code: ErrorCode::InvalidRole,
            }],
        },
        FieldRules {
            field: "department",
            rules: &[max_len(100)],
        },
        IS_ACTIVE,
    ],
    unique: &[
        ("username", ErrorCode::DuplicateUsername),
        ("email", ErrorCode::DuplicateEmail),
    ],
};

static MAP_RULES: KindRules = KindRules {
    required: &["name", "type"],
    fields: &[
        FieldRules {
            field: "name",
            rules: &[max_len(100)],
        },
        FieldRules {
            field: "type",
            rules: &[Rule::OneOf {
                values: MAP_TYPES,
                code: ErrorCode::InvalidType,
            }],
        },
        FieldRules {
            field: "resolution",
            rules: &[Rule::Double {
                min: 0.0,
                max: 10.0,
                min_exclusive: true,
            }],
        },
        FieldRules {
            field: "width",
            rules: &[Rule::Integer { min: 1, max: 10_000 }],
        },
        FieldRules {
            field: "height",
            rules: &[Rule::Integer { min: 1, max: 10_000 }],
        },
        FieldRules {
            field: "originX",
            rules: &[Rule::Double {
                min: -1_000_000.0,
                max: 1_000_000.0,
                min_exclusive: false,
            }],
        },
        FieldRules {
            field: "originY",
            rules: &[Rule::Double {
                min: -1_000_000.0,
                max: 1_000_000.0,
                min_exclusive: false,
            }],
        },
        IS_ACTIVE,
    ],
    unique: &[("name", ErrorCode::DuplicateName)],
};

fn rules_for(kind: EntityKind) -> &'static KindRules {
    match kind {
        EntityKind::Camera => &CAMERA_RULES,
        EntityKind::Robot => &ROBOT_RULES,
        EntityKind::Task => &TASK_RULES,
        EntityKind::User => &USER_RULES,
        EntityKind::Map => &MAP_RULES,
    }
}

// ==========================================
// ValidationOptions - 校验开关
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// 关闭后只保留必填、可解析性与唯一性规则
    pub strict: bool,
    /// 跨存储唯一性检查
    pub check_duplicates: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            strict: true,
            check_duplicates: true,
        }
    }
}

impl From<&ImportSettings> for ValidationOptions {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            strict: settings.strict_validation,
            check_duplicates: settings.enable_duplicate_checks,
        }
    }
}

// ==========================================
// ValidationEngine
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    options: ValidationOptions,
}

impl ValidationEngine {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// 校验整个行集并生成校验模式报告
    ///
    /// # 参数
    /// - rows: 已清洗的标准化行
    /// - entity_kind: 请求中的实体类别字符串
    /// - store: 唯一性查询协作方
    ///
    /// # 返回
    /// - Ok(ImportReport): 状态仅为 VALID / VALIDATION_ERRORS
    /// - Err: 唯一性查询失败
    pub async fn validate(
        &self,
        rows: &[NormalizedRow],
        entity_kind: &str,
        store: &dyn RecordStore,
    ) -> ImportResult<ImportReport> {
        let errors = match EntityKind::parse(entity_kind) {
            Some(kind) => self.validate_rows(rows, kind, store).await?,
            None => vec![unsupported_kind_error(entity_kind)],
        };
        Ok(ImportReport::from_validation(rows.len(), errors))
    }

    /// 逐行校验，按行号顺序返回全部错误
    pub async fn validate_rows(
        &self,
        rows: &[NormalizedRow],
        kind: EntityKind,
        store: &dyn RecordStore,
    ) -> ImportResult<Vec<ValidationError>> {
        let mut errors = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let row_errors = self.validate_row(row, row_number(index), kind, store).await?;
            errors.extend(row_errors);
        }

        debug!(
            entity_kind = %kind,
            rows = rows.len(),
            errors = errors.len(),
            "行集校验完成"
        );
        Ok(errors)
    }

    /// 校验单行
    pub async fn validate_row(
        &self,
        row: &NormalizedRow,
        row_number: usize,
        kind: EntityKind,
        store: &dyn RecordStore,
    ) -> ImportResult<Vec<ValidationError>> {
        let rules = rules_for(kind);
        let mut errors = Vec::new();

        // === 步骤 1: 必填字段 ===
        for field in rules.required {
            if field_text(row, field).is_none() {
                errors.push(ValidationError::new(
                    row_number,
                    field,
                    ErrorCode::Required,
                    format!("字段 '{}' 为必填项", field),
                    row.get(*field).and_then(|v| v.as_text()),
                    Some("non-empty value".to_string()),
                ));
            }
        }

        // === 步骤 2-4: 格式/枚举 → 类型/范围/长度 → 日期 ===
        for category in [Category::Format, Category::TypeRange, Category::Date] {
            for spec in rules.fields {
                let Some(value) = field_text(row, spec.field) else {
                    continue;
                };
                for rule in spec.rules.iter().filter(|r| r.category() == category) {
                    if let Some(error) = self.check_rule(rule, spec.field, &value, row_number) {
                        errors.push(error);
                    }
                }
            }
        }

        // === 步骤 5: 跨存储唯一性（仅对照已提交数据） ===
        if self.options.check_duplicates {
            for (field, code) in rules.unique {
                let Some(value) = field_text(row, field) else {
                    continue;
                };
                // 查重不依赖前面规则的结果，错误照常累积
                if store
                    .exists_by_natural_key(kind, &[(*field, value.as_str())])
                    .await?
                {
                    errors.push(ValidationError::new(
                        row_number,
                        field,
                        *code,
                        format!("{} '{}' 已存在", field, value),
                        Some(value.clone()),
                        Some(format!("unique {}", field)),
                    ));
                }
            }
        }

        Ok(errors)
    }

    fn check_rule(
        &self,
        rule: &Rule,
        field: &str,
        value: &str,
        row_number: usize,
    ) -> Option<ValidationError> {
        let strict = self.options.strict;
        let error = |code: ErrorCode, message: String, expected: String| {
            Some(ValidationError::new(
                row_number,
                field,
                code,
                message,
                Some(value.to_string()),
                Some(expected),
            ))
        };

        match *rule {
            Rule::Format(pattern) => {
                if strict && !pattern.regex().is_match(value) {
                    return error(
                        pattern.code(),
                        format!("{}: {}", field, pattern.message()),
                        pattern.expected().to_string(),
                    );
                }
            }
            Rule::OneOf { values, code } => {
                if strict && !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
                    return error(code, format!("{} 取值无效", field), values.join(", "));
                }
            }
            Rule::Boolean => {
                let lowered = value.to_ascii_lowercase();
                if !matches!(lowered.as_str(), "true" | "false" | "1" | "0") {
                    return error(
                        ErrorCode::InvalidBoolean,
                        format!("{} 不是有效的布尔值", field),
                        "true, false, 1, or 0".to_string(),
                    );
                }
            }
            Rule::Integer { min, max } => match value.parse::<i32>() {
                Err(_) => {
                    return error(
                        ErrorCode::InvalidInteger,
                        format!("{} 不是有效的整数", field),
                        format!("integer between {}-{}", min, max),
                    );
                }
                Ok(n) => {
                    let n = i64::from(n);
                    if strict && (n < min || n > max) {
                        return error(
                            ErrorCode::InvalidRange,
                            format!("{} 超出范围", field),
                            format!("{}-{}", min, max),
                        );
                    }
                }
            },
            Rule::Double {
                min,
                max,
                min_exclusive,
            } => match value.parse::<f64>() {
                Ok(n) if n.is_finite() => {
                    let below = if min_exclusive { n <= min } else { n < min };
                    if strict && (below || n > max) {
                        let lower = if min_exclusive { "(" } else { "[" };
                        return error(
                            ErrorCode::InvalidRange,
                            format!("{} 超出范围", field),
                            format!("{}{}, {}]", lower, min, max),
                        );
                    }
                }
                _ => {
                    return error(
                        ErrorCode::InvalidDouble,
                        format!("{} 不是有效的小数", field),
                        "decimal number".to_string(),
                    );
                }
            },
            Rule::Length { min, max } => {
                let len = value.chars().count();
                if strict && (len < min || len > max) {
                    let expected = if min == 0 {
                        format!("maximum {} characters", max)
                    } else {
                        format!("{}-{} characters", min, max)
                    };
                    return error(
                        ErrorCode::InvalidLength,
                        format!("{} 长度不合法 ({} 个字符)", field, len),
                        expected,
                    );
                }
            }
            Rule::Date => {
                if parse_datetime(value).is_none() {
                    return error(
                        ErrorCode::InvalidDate,
                        format!("{} 不是可识别的日期", field),
                        "yyyy-MM-dd HH:mm:ss / yyyy-MM-ddTHH:mm:ss / yyyy-MM-dd".to_string(),
                    );
                }
            }
        }

        None
    }
}

/// 字段去空白后的非空文本
fn field_text(row: &NormalizedRow, field: &str) -> Option<String> {
    row.get(field).and_then(|v| v.as_trimmed_text())
}

fn unsupported_kind_error(entity_kind: &str) -> ValidationError {
    let supported: Vec<&str> = EntityKind::ALL.iter().map(|k| k.as_str()).collect();
    ValidationError::new(
        FIRST_DATA_ROW,
        "entityKind",
        ErrorCode::InvalidModule,
        format!("不支持的实体类别: {}", entity_kind),
        Some(entity_kind.to_string()),
        Some(supported.join(", ")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::TypedEntity;
    use crate::domain::row::CellValue;
    use crate::domain::types::ImportStatus;
    use crate::repository::error::RepositoryResult;
    use async_trait::async_trait;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FixedStore {
        existing: HashSet<(EntityKind, String, String)>,
    }

    impl FixedStore {
        fn with(kind: EntityKind, field: &str, value: &str) -> Self {
            let mut store = Self::default();
            store
                .existing
                .insert((kind, field.to_string(), value.to_string()));
            store
        }
    }

    #[async_trait]
    impl RecordStore for FixedStore {
        async fn exists_by_natural_key(
            &self,
            kind: EntityKind,
            key_fields: &[(&str, &str)],
        ) -> RepositoryResult<bool> {
            Ok(key_fields.iter().all(|(f, v)| {
                self.existing
                    .contains(&(kind, f.to_string(), v.to_string()))
            }))
        }

        async fn save_batch(
            &self,
            _kind: EntityKind,
            entities: Vec<TypedEntity>,
        ) -> RepositoryResult<usize> {
            Ok(entities.len())
        }
    }

    fn row(pairs: &[(&str, CellValue)]) -> NormalizedRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn codes(errors: &[ValidationError]) -> Vec<ErrorCode> {
        errors.iter().map(|e| e.code).collect()
    }

    #[tokio::test]
    async fn test_valid_camera_row() {
        let engine = ValidationEngine::default();
        let rows = vec![row(&[
            ("name", text("Lobby")),
            ("type", text("ptz")),
            ("ipAddress", text("192.168.1.10")),
            ("isActive", CellValue::Bool(true)),
        ])];

        let report = engine
            .validate(&rows, "camera", &FixedStore::default())
            .await
            .unwrap();
        assert_eq!(report.status, ImportStatus::Valid);
        assert_eq!(report.total_records, 1);
        assert_eq!(report.successful_records, 1);
        assert_eq!(report.failed_records, 0);
    }

    #[tokio::test]
    async fn test_invalid_ip_yields_single_error() {
        let engine = ValidationEngine::default();
        let rows = vec![row(&[
            ("name", text("Gate")),
            ("type", text("IP")),
            ("ipAddress", text("999.1.1.1")),
        ])];

        let report = engine
            .validate(&rows, "camera", &FixedStore::default())
            .await
            .unwrap();
        assert_eq!(codes(&report.errors), vec![ErrorCode::InvalidIp]);
        assert_eq!(report.errors[0].row, 2);
        assert_eq!(report.errors[0].actual_value.as_deref(), Some("999.1.1.1"));
    }

    #[tokio::test]
    async fn test_missing_required_and_bad_enum_are_separate_errors() {
        let engine = ValidationEngine::default();
        let rows = vec![row(&[("name", CellValue::Null), ("type", text("laser"))])];

        let report = engine
            .validate(&rows, "camera", &FixedStore::default())
            .await
            .unwrap();
        assert_eq!(
            codes(&report.errors),
            vec![ErrorCode::Required, ErrorCode::InvalidType]
        );
        assert_eq!(report.failed_records, 2);
        assert_eq!(report.successful_records, -1);
        assert_eq!(report.status, ImportStatus::ValidationErrors);
    }

    #[tokio::test]
    async fn test_unknown_kind_single_error() {
        let engine = ValidationEngine::default();
        let rows = vec![row(&[("name", text("a"))]), row(&[("name", text("b"))])];

        let report = engine
            .validate(&rows, "drone", &FixedStore::default())
            .await
            .unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, ErrorCode::InvalidModule);
        assert_eq!(report.errors[0].row, FIRST_DATA_ROW);
        assert_eq!(report.total_records, 2);
        assert_eq!(report.successful_records, 1);
    }

    #[tokio::test]
    async fn test_duplicate_against_store() {
        let engine = ValidationEngine::default();
        let store = FixedStore::with(EntityKind::Robot, "serialNumber", "SN-00001");
        let rows = vec![row(&[
            ("name", text("R1")),
            ("model", text("X")),
            ("serialNumber", text("SN-00001")),
        ])];

        let errors = engine
            .validate_rows(&rows, EntityKind::Robot, &store)
            .await
            .unwrap();
        assert_eq!(codes(&errors), vec![ErrorCode::DuplicateSerial]);
    }

    #[tokio::test]
    async fn test_duplicate_reported_alongside_length_error() {
        let engine = ValidationEngine::default();
        let long_name = "x".repeat(101);
        let store = FixedStore::with(EntityKind::Camera, "name", &long_name);
        let rows = vec![row(&[("name", text(&long_name)), ("type", text("IP"))])];

        let report = engine.validate(&rows, "camera", &store).await.unwrap();
        assert_eq!(
            codes(&report.errors),
            vec![ErrorCode::InvalidLength, ErrorCode::DuplicateName]
        );
        assert_eq!(report.failed_records, 2);
    }

    #[tokio::test]
    async fn test_duplicate_checks_disabled() {
        let engine = ValidationEngine::new(ValidationOptions {
            strict: true,
            check_duplicates: false,
        });
        let store = FixedStore::with(EntityKind::Map, "name", "Floor 1");
        let rows = vec![row(&[("name", text("Floor 1")), ("type", text("HYBRID"))])];

        let errors = engine
            .validate_rows(&rows, EntityKind::Map, &store)
            .await
            .unwrap();
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_serial_length_and_format_both_reported() {
        let engine = ValidationEngine::default();
        let rows = vec![row(&[
            ("name", text("R1")),
            ("model", text("X")),
            ("serialNumber", text("a b")),
        ])];

        let errors = engine
            .validate_rows(&rows, EntityKind::Robot, &FixedStore::default())
            .await
            .unwrap();
        assert_eq!(
            codes(&errors),
            vec![ErrorCode::InvalidFormat, ErrorCode::InvalidLength]
        );
    }

    #[tokio::test]
    async fn test_task_ranges_and_dates() {
        let engine = ValidationEngine::default();
        let rows = vec![row(&[
            ("name", text("Sweep")),
            ("type", text("cleaning")),
            ("priority", CellValue::Int(11)),
            ("status", text("pending")),
            ("dueDate", text("next week")),
            ("isActive", text("yes")),
        ])];

        let errors = engine
            .validate_rows(&rows, EntityKind::Task, &FixedStore::default())
            .await
            .unwrap();
        assert_eq!(
            codes(&errors),
            vec![
                ErrorCode::InvalidRange,
                ErrorCode::InvalidBoolean,
                ErrorCode::InvalidDate
            ]
        );
    }

    #[tokio::test]
    async fn test_float_priority_is_not_integer() {
        let engine = ValidationEngine::default();
        let rows = vec![row(&[
            ("name", text("Sweep")),
            ("type", text("PATROL")),
            ("priority", CellValue::Float(2.0)),
        ])];

        let errors = engine
            .validate_rows(&rows, EntityKind::Task, &FixedStore::default())
            .await
            .unwrap();
        assert_eq!(codes(&errors), vec![ErrorCode::InvalidInteger]);
    }

    #[tokio::test]
    async fn test_map_numeric_bounds() {
        let engine = ValidationEngine::default();
        let rows = vec![row(&[
            ("name", text("M")),
            ("type", text("3d_point_cloud")),
            ("resolution", CellValue::Int(0)),
            ("width", CellValue::Int(10_000)),
            ("height", text("tall")),
            ("originX", CellValue::Float(-1_000_000.0)),
            ("originY", CellValue::Float(1_000_000.5)),
        ])];

        let errors = engine
            .validate_rows(&rows, EntityKind::Map, &FixedStore::default())
            .await
            .unwrap();
        let pairs: Vec<(&str, ErrorCode)> =
            errors.iter().map(|e| (e.field.as_str(), e.code)).collect();
        assert_eq!(
            pairs,
            vec![
                ("resolution", ErrorCode::InvalidRange),
                ("height", ErrorCode::InvalidInteger),
                ("originY", ErrorCode::InvalidRange),
            ]
        );
    }

    #[tokio::test]
    async fn test_lenient_mode_keeps_parseability_only() {
        let engine = ValidationEngine::new(ValidationOptions {
            strict: false,
            check_duplicates: true,
        });
        let rows = vec![row(&[
            ("username", text("x")),
            ("email", text("not-an-email")),
            ("role", text("OWNER")),
            ("isActive", text("maybe")),
        ])];

        let errors = engine
            .validate_rows(&rows, EntityKind::User, &FixedStore::default())
            .await
            .unwrap();
        assert_eq!(codes(&errors), vec![ErrorCode::InvalidBoolean]);
    }

    #[tokio::test]
    async fn test_validation_is_deterministic() {
        let engine = ValidationEngine::default();
        let store = FixedStore::with(EntityKind::User, "email", "a@b.io");
        let rows = vec![
            row(&[("username", text("ab")), ("email", text("a@b.io"))]),
            row(&[("username", text("carol")), ("email", CellValue::Null)]),
        ];

        let first = engine.validate(&rows, "user", &store).await.unwrap();
        let second = engine.validate(&rows, "user", &store).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.failed_records, 3);
    }
}
