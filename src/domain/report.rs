// ==========================================
// 机器人设备数据导入系统 - 校验错误与导入报告
// ==========================================
// 职责: 字段级校验错误 / 导入报告 / 导入请求
// 红线: 报告计数恒满足 total = successful + failed
// ==========================================

use crate::domain::types::ImportStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// ErrorCode - 校验错误码（封闭词表）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Required,
    InvalidEmail,
    InvalidIp,
    InvalidFormat,
    InvalidType,
    InvalidStatus,
    InvalidRole,
    InvalidBoolean,
    InvalidInteger,
    InvalidDouble,
    InvalidRange,
    InvalidLength,
    InvalidDate,
    DuplicateName,
    DuplicateIp,
    DuplicateSerial,
    DuplicateUsername,
    DuplicateEmail,
    InvalidModule,
    TransformFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Required => "REQUIRED",
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::InvalidIp => "INVALID_IP",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::InvalidType => "INVALID_TYPE",
            ErrorCode::InvalidStatus => "INVALID_STATUS",
            ErrorCode::InvalidRole => "INVALID_ROLE",
            ErrorCode::InvalidBoolean => "INVALID_BOOLEAN",
            ErrorCode::InvalidInteger => "INVALID_INTEGER",
            ErrorCode::InvalidDouble => "INVALID_DOUBLE",
            ErrorCode::InvalidRange => "INVALID_RANGE",
            ErrorCode::InvalidLength => "INVALID_LENGTH",
            ErrorCode::InvalidDate => "INVALID_DATE",
            ErrorCode::DuplicateName => "DUPLICATE_NAME",
            ErrorCode::DuplicateIp => "DUPLICATE_IP",
            ErrorCode::DuplicateSerial => "DUPLICATE_SERIAL",
            ErrorCode::DuplicateUsername => "DUPLICATE_USERNAME",
            ErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ErrorCode::InvalidModule => "INVALID_MODULE",
            ErrorCode::TransformFailed => "TRANSFORM_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// ValidationError - 字段级校验错误
// ==========================================
// 行号从 2 开始（第 1 行为表头）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub row: usize,
    pub field: String,
    pub code: ErrorCode,
    pub message: String,
    pub actual_value: Option<String>,
    pub expected_value: Option<String>,
}

impl ValidationError {
    pub fn new(
        row: usize,
        field: &str,
        code: ErrorCode,
        message: impl Into<String>,
        actual_value: Option<String>,
        expected_value: Option<String>,
    ) -> Self {
        Self {
            row,
            field: field.to_string(),
            code,
            message: message.into(),
            actual_value,
            expected_value,
        }
    }
}

// ==========================================
// ImportReport - 导入/校验报告
// ==========================================
// failed_records 在校验模式下是错误条数而非出错行数，
// 因此 successful_records 可能为负
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub status: ImportStatus,
    pub message: String,
    pub total_records: i64,
    pub successful_records: i64,
    pub failed_records: i64,
    pub errors: Vec<ValidationError>,
    pub processing_time_ms: u64,
}

impl ImportReport {
    /// 由校验错误列表构建校验模式报告
    pub fn from_validation(total_records: usize, errors: Vec<ValidationError>) -> Self {
        let total = total_records as i64;
        let failed = errors.len() as i64;
        let (status, message) = if errors.is_empty() {
            (ImportStatus::Valid, "所有记录校验通过".to_string())
        } else {
            (
                ImportStatus::ValidationErrors,
                format!("校验完成，共 {} 个错误", errors.len()),
            )
        };

        Self {
            status,
            message,
            total_records: total,
            successful_records: total - failed,
            failed_records: failed,
            errors,
            processing_time_ms: 0,
        }
    }

    /// 管道级异常报告（未进入行处理）
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Error,
            message: message.into(),
            total_records: 0,
            successful_records: 0,
            failed_records: 0,
            errors: Vec::new(),
            processing_time_ms: 0,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ==========================================
// ImportRequest - 导入请求参数
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub file_name: String,
    pub entity_kind: String,
    #[serde(default)]
    pub validate_only: bool,
    /// None 时取配置默认值
    pub skip_errors: Option<bool>,
    /// None 或 0 时取配置默认批大小
    pub batch_size: Option<usize>,
    pub actor_id: Option<String>,
    /// 源列名 → 标准字段名
    #[serde(default)]
    pub field_mappings: HashMap<String, String>,
}

impl ImportRequest {
    pub fn new(file_name: impl Into<String>, entity_kind: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            entity_kind: entity_kind.into(),
            ..Default::default()
        }
    }

    pub fn validate_only(mut self) -> Self {
        self.validate_only = true;
        self
    }

    pub fn with_skip_errors(mut self, skip: bool) -> Self {
        self.skip_errors = Some(skip);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_field_mapping(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.field_mappings.insert(source.into(), target.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(row: usize) -> ValidationError {
        ValidationError::new(row, "name", ErrorCode::Required, "名称不能为空", None, None)
    }

    #[test]
    fn test_from_validation_valid() {
        let report = ImportReport::from_validation(3, Vec::new());
        assert_eq!(report.status, ImportStatus::Valid);
        assert_eq!(report.successful_records, 3);
        assert_eq!(report.failed_records, 0);
    }

    #[test]
    fn test_from_validation_counts_errors_not_rows() {
        // 同一行 3 个错误: failed 为错误条数
        let report = ImportReport::from_validation(1, vec![err(2), err(2), err(2)]);
        assert_eq!(report.status, ImportStatus::ValidationErrors);
        assert_eq!(report.failed_records, 3);
        assert_eq!(report.successful_records, -2);
        assert_eq!(
            report.total_records,
            report.successful_records + report.failed_records
        );
    }

    #[test]
    fn test_report_serialization_uses_camel_case() {
        let report = ImportReport::from_validation(1, vec![err(2)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalRecords"], 1);
        assert_eq!(json["errors"][0]["code"], "REQUIRED");
        assert!(json["errors"][0]["actualValue"].is_null());
    }
}
