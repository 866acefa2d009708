// ==========================================
// 机器人设备数据导入系统 - 导入模块错误类型
// ==========================================
// 结构性错误: 整个文件不可用，不产生任何行
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件为空或缺失: {0}")]
    EmptyFile(String),

    #[error("文件过大: {size} 字节，上限 {max} 字节")]
    FileTooLarge { size: usize, max: usize },

    #[error("文件格式不支持: {0}")]
    UnsupportedFormat(String),

    // ===== 解析错误 =====
    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("JSON 解析失败: {0}")]
    JsonParseError(String),

    #[error("文档为空: {0}")]
    EmptyDocument(String),

    #[error("表头为空 (第 {column} 列)")]
    EmptyHeader { column: usize },

    #[error("表头重复: {0}")]
    DuplicateHeader(String),

    #[error("文件中没有数据行: {0}")]
    NoDataRows(String),

    // ===== 转换错误 =====
    #[error("不支持的实体类别: {0}")]
    UnsupportedEntityKind(String),

    #[error("转换失败 (行 {row}): 必填字段 {field} 缺失")]
    MissingField { row: usize, field: String },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 协作方错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::JsonParseError(err.to_string())
    }
}

impl ImportError {
    /// 是否为结构性错误（整个文件不可用）
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ImportError::EmptyFile(_)
                | ImportError::FileTooLarge { .. }
                | ImportError::UnsupportedFormat(_)
                | ImportError::CsvParseError(_)
                | ImportError::ExcelParseError(_)
                | ImportError::JsonParseError(_)
                | ImportError::EmptyDocument(_)
                | ImportError::EmptyHeader { .. }
                | ImportError::DuplicateHeader(_)
                | ImportError::NoDataRows(_)
        )
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
