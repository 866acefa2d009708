// ==========================================
// 机器人设备数据导入系统 - 格式处理器注册表
// ==========================================
// 职责: 按扩展名选择 FormatProcessor（启动时装配一次）
// ==========================================

use crate::importer::csv_processor::CsvProcessor;
use crate::importer::excel_processor::ExcelProcessor;
use crate::importer::importer_trait::FormatProcessor;
use crate::importer::json_processor::JsonProcessor;
use std::path::Path;

pub struct ProcessorRegistry {
    processors: Vec<Box<dyn FormatProcessor>>,
}

impl ProcessorRegistry {
    pub fn new(processors: Vec<Box<dyn FormatProcessor>>) -> Self {
        Self { processors }
    }

    /// 分隔文本 / 电子表格 / JSON 三种内置处理器
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(CsvProcessor),
            Box::new(ExcelProcessor),
            Box::new(JsonProcessor),
        ])
    }

    /// 第一个声明支持该扩展名的处理器
    pub fn select(&self, extension: &str) -> Option<&dyn FormatProcessor> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.processors
            .iter()
            .find(|p| p.supported_extensions().contains(&extension.as_str()))
            .map(|p| p.as_ref())
    }

    /// 所有处理器支持的扩展名（去重，保持注册顺序）
    pub fn all_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = Vec::new();
        for processor in &self.processors {
            for ext in processor.supported_extensions() {
                if !extensions.contains(ext) {
                    extensions.push(ext);
                }
            }
        }
        extensions
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// 文件名的小写扩展名（不含点）
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_by_extension() {
        let registry = ProcessorRegistry::with_defaults();
        assert_eq!(registry.select("csv").map(|p| p.name()), Some("csv"));
        assert_eq!(registry.select("XLSX").map(|p| p.name()), Some("excel"));
        assert_eq!(registry.select(".json").map(|p| p.name()), Some("json"));
        assert!(registry.select("txt").is_none());
    }

    #[test]
    fn test_all_extensions() {
        let registry = ProcessorRegistry::with_defaults();
        assert_eq!(registry.all_extensions(), vec!["csv", "xlsx", "xls", "json"]);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Cams.CSV").as_deref(), Some("csv"));
        assert_eq!(file_extension("dir/robots.xlsx").as_deref(), Some("xlsx"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
    }
}
