// ==========================================
// 机器人设备数据导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::settings::ImportSettings;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 上传/配置协作方
// 实现者: ConfigManager（从 config_kv 表读取）, ImportSettings（固定配置）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 上传限制 =====

    /// 单文件最大字节数
    ///
    /// # 默认值
    /// - 10485760 (10 MB)
    async fn get_max_file_size(&self) -> ImportResult<usize>;

    /// 单次请求最大字节数
    ///
    /// # 默认值
    /// - 10485760 (10 MB)
    async fn get_max_request_size(&self) -> ImportResult<usize>;

    /// 允许的扩展名（小写，不含点）
    ///
    /// # 默认值
    /// - ["csv", "xlsx", "xls", "json"]
    async fn get_allowed_extensions(&self) -> ImportResult<Vec<String>>;

    // ===== 批处理 =====

    /// 默认批大小
    ///
    /// # 默认值
    /// - 100
    async fn get_default_batch_size(&self) -> ImportResult<usize>;

    /// 批大小上限
    ///
    /// # 默认值
    /// - 1000
    async fn get_max_batch_size(&self) -> ImportResult<usize>;

    /// 并行度提示（多文件并发上限）
    ///
    /// # 默认值
    /// - 4
    async fn get_parallelism(&self) -> ImportResult<usize>;

    // ===== 功能开关 =====

    /// 严格校验（关闭后跳过枚举/格式/长度/范围规则）
    ///
    /// # 默认值
    /// - true
    async fn is_strict_validation(&self) -> ImportResult<bool>;

    /// 未显式指定时是否跳过错误行
    ///
    /// # 默认值
    /// - false
    async fn get_skip_errors_default(&self) -> ImportResult<bool>;

    /// 输入清洗开关
    ///
    /// # 默认值
    /// - true
    async fn is_input_sanitization_enabled(&self) -> ImportResult<bool>;

    /// 跨存储唯一性检查开关
    ///
    /// # 默认值
    /// - true
    async fn is_duplicate_check_enabled(&self) -> ImportResult<bool>;

    /// 审计写入开关
    ///
    /// # 默认值
    /// - true
    async fn is_audit_logging_enabled(&self) -> ImportResult<bool>;

    /// 汇总为一次调用使用的配置快照
    async fn load_settings(&self) -> ImportResult<ImportSettings> {
        Ok(ImportSettings {
            max_file_size: self.get_max_file_size().await?,
            max_request_size: self.get_max_request_size().await?,
            allowed_extensions: self.get_allowed_extensions().await?,
            default_batch_size: self.get_default_batch_size().await?,
            max_batch_size: self.get_max_batch_size().await?,
            parallelism: self.get_parallelism().await?,
            strict_validation: self.is_strict_validation().await?,
            skip_errors_default: self.get_skip_errors_default().await?,
            enable_input_sanitization: self.is_input_sanitization_enabled().await?,
            enable_duplicate_checks: self.is_duplicate_check_enabled().await?,
            enable_audit_logging: self.is_audit_logging_enabled().await?,
        })
    }
}

// ImportSettings 本身即一份固定配置
#[async_trait]
impl ImportConfigReader for ImportSettings {
    async fn get_max_file_size(&self) -> ImportResult<usize> {
        Ok(self.max_file_size)
    }

    async fn get_max_request_size(&self) -> ImportResult<usize> {
        Ok(self.max_request_size)
    }

    async fn get_allowed_extensions(&self) -> ImportResult<Vec<String>> {
        Ok(self.allowed_extensions.clone())
    }

    async fn get_default_batch_size(&self) -> ImportResult<usize> {
        Ok(self.default_batch_size)
    }

    async fn get_max_batch_size(&self) -> ImportResult<usize> {
        Ok(self.max_batch_size)
    }

    async fn get_parallelism(&self) -> ImportResult<usize> {
        Ok(self.parallelism)
    }

    async fn is_strict_validation(&self) -> ImportResult<bool> {
        Ok(self.strict_validation)
    }

    async fn get_skip_errors_default(&self) -> ImportResult<bool> {
        Ok(self.skip_errors_default)
    }

    async fn is_input_sanitization_enabled(&self) -> ImportResult<bool> {
        Ok(self.enable_input_sanitization)
    }

    async fn is_duplicate_check_enabled(&self) -> ImportResult<bool> {
        Ok(self.enable_duplicate_checks)
    }

    async fn is_audit_logging_enabled(&self) -> ImportResult<bool> {
        Ok(self.enable_audit_logging)
    }

    async fn load_settings(&self) -> ImportResult<ImportSettings> {
        Ok(self.clone())
    }
}
