// ==========================================
// 机器人设备数据导入系统 - 配置管理器
// ==========================================
// 职责: 导入配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::settings::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_BATCH_SIZE, DEFAULT_MAX_BATCH_SIZE,
    DEFAULT_MAX_FILE_SIZE, DEFAULT_PARALLELISM,
};
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Clone)]
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let guard = lock(&conn, "*")?;
            configure_sqlite_connection(&guard).map_err(|e| ImportError::ConfigReadError {
                key: "*".to_string(),
                message: e.to_string(),
            })?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = lock(&self.conn, key)?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 写入/覆写 global scope 配置值
    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = lock(&self.conn, key)?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        debug!(key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 获取 global scope 所有配置的快照（JSON，键有序）
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        let conn = lock(&self.conn, "*")?;
        let read_err = |e: rusqlite::Error| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")
            .map_err(read_err)?;
        let rows = stmt
            .query_map(params![GLOBAL_SCOPE], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(read_err)?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row.map_err(read_err)?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&config_map).map_err(ImportError::from)
    }

    // ===== 类型化读取 =====

    fn get_usize_or_default(&self, key: &str, default: usize) -> ImportResult<usize> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| value_error(key, &raw, e.to_string())),
        }
    }

    fn get_bool_or_default(&self, key: &str, default: bool) -> ImportResult<bool> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(value_error(key, &raw, "期望 true/false/1/0".to_string())),
            },
        }
    }
}

fn lock<'a>(conn: &'a Arc<Mutex<Connection>>, key: &str) -> ImportResult<MutexGuard<'a, Connection>> {
    conn.lock().map_err(|e| ImportError::ConfigReadError {
        key: key.to_string(),
        message: format!("锁获取失败: {}", e),
    })
}

fn value_error(key: &str, raw: &str, message: String) -> ImportError {
    ImportError::ConfigValueError {
        key: key.to_string(),
        value: raw.to_string(),
        message,
    }
}

/// 扩展名列表: 支持 JSON 数组或逗号分隔；统一小写并去掉前导点
fn parse_extension_list(key: &str, raw: &str) -> ImportResult<Vec<String>> {
    let trimmed = raw.trim();
    let items: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<String>>(trimmed)
            .map_err(|e| value_error(key, raw, e.to_string()))?
    } else {
        trimmed.split(',').map(|s| s.to_string()).collect()
    };

    let normalized: Vec<String> = items
        .iter()
        .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if normalized.is_empty() {
        return Err(value_error(key, raw, "扩展名列表为空".to_string()));
    }
    Ok(normalized)
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_max_file_size(&self) -> ImportResult<usize> {
        self.get_usize_or_default(config_keys::MAX_FILE_SIZE, DEFAULT_MAX_FILE_SIZE)
    }

    async fn get_max_request_size(&self) -> ImportResult<usize> {
        self.get_usize_or_default(config_keys::MAX_REQUEST_SIZE, DEFAULT_MAX_FILE_SIZE)
    }

    async fn get_allowed_extensions(&self) -> ImportResult<Vec<String>> {
        match self.get_config_value(config_keys::ALLOWED_EXTENSIONS)? {
            Some(raw) => parse_extension_list(config_keys::ALLOWED_EXTENSIONS, &raw),
            None => Ok(DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect()),
        }
    }

    async fn get_default_batch_size(&self) -> ImportResult<usize> {
        self.get_usize_or_default(config_keys::DEFAULT_BATCH_SIZE, DEFAULT_BATCH_SIZE)
    }

    async fn get_max_batch_size(&self) -> ImportResult<usize> {
        self.get_usize_or_default(config_keys::MAX_BATCH_SIZE, DEFAULT_MAX_BATCH_SIZE)
    }

    async fn get_parallelism(&self) -> ImportResult<usize> {
        self.get_usize_or_default(config_keys::PARALLELISM, DEFAULT_PARALLELISM)
    }

    async fn is_strict_validation(&self) -> ImportResult<bool> {
        self.get_bool_or_default(config_keys::STRICT_VALIDATION, true)
    }

    async fn get_skip_errors_default(&self) -> ImportResult<bool> {
        self.get_bool_or_default(config_keys::SKIP_ERRORS_DEFAULT, false)
    }

    async fn is_input_sanitization_enabled(&self) -> ImportResult<bool> {
        self.get_bool_or_default(config_keys::ENABLE_INPUT_SANITIZATION, true)
    }

    async fn is_duplicate_check_enabled(&self) -> ImportResult<bool> {
        self.get_bool_or_default(config_keys::ENABLE_DUPLICATE_CHECKS, true)
    }

    async fn is_audit_logging_enabled(&self) -> ImportResult<bool> {
        self.get_bool_or_default(config_keys::ENABLE_AUDIT_LOGGING, true)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 上传限制
    pub const MAX_FILE_SIZE: &str = "import.max_file_size";
    pub const MAX_REQUEST_SIZE: &str = "import.max_request_size";
    pub const ALLOWED_EXTENSIONS: &str = "import.allowed_extensions";

    // 批处理
    pub const DEFAULT_BATCH_SIZE: &str = "import.default_batch_size";
    pub const MAX_BATCH_SIZE: &str = "import.max_batch_size";
    pub const PARALLELISM: &str = "import.parallelism";

    // 功能开关
    pub const STRICT_VALIDATION: &str = "import.strict_validation";
    pub const SKIP_ERRORS_DEFAULT: &str = "import.skip_errors_default";
    pub const ENABLE_INPUT_SANITIZATION: &str = "import.enable_input_sanitization";
    pub const ENABLE_DUPLICATE_CHECKS: &str = "import.enable_duplicate_checks";
    pub const ENABLE_AUDIT_LOGGING: &str = "import.enable_audit_logging";
}
