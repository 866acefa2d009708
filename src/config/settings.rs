// ==========================================
// 机器人设备数据导入系统 - 导入配置项
// ==========================================
// 职责: 上传/批处理/功能开关配置及默认值
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认单文件上限: 10 MB
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// 默认批大小
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// 批大小上限
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// 默认并行度提示
pub const DEFAULT_PARALLELISM: usize = 4;

/// 默认允许的扩展名
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 4] = ["csv", "xlsx", "xls", "json"];

// ==========================================
// ImportSettings - 一次调用所用的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    // ===== 上传限制 =====
    pub max_file_size: usize,
    pub max_request_size: usize,
    pub allowed_extensions: Vec<String>,

    // ===== 批处理 =====
    pub default_batch_size: usize,
    pub max_batch_size: usize,
    pub parallelism: usize, // 仅用于多文件并发

    // ===== 功能开关 =====
    pub strict_validation: bool,
    pub skip_errors_default: bool,
    pub enable_input_sanitization: bool,
    pub enable_duplicate_checks: bool,
    pub enable_audit_logging: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_request_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_batch_size: DEFAULT_BATCH_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            parallelism: DEFAULT_PARALLELISM,
            strict_validation: true,
            skip_errors_default: false,
            enable_input_sanitization: true,
            enable_duplicate_checks: true,
            enable_audit_logging: true,
        }
    }
}

impl ImportSettings {
    /// 单个上传文件允许的最大字节数
    pub fn max_upload_bytes(&self) -> usize {
        self.max_file_size.min(self.max_request_size)
    }

    /// 实际批大小: 请求值 > 0 时采用，否则取默认；始终不超过上限
    pub fn effective_batch_size(&self, requested: Option<usize>) -> usize {
        let size = match requested {
            Some(n) if n > 0 => n,
            _ => self.default_batch_size.max(1),
        };
        size.min(self.max_batch_size.max(1))
    }

    /// 扩展名是否在白名单内（大小写不敏感）
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}
