// ==========================================
// 机器人设备数据导入系统 - 导入层
// ==========================================
// 职责: 异构文件 → 标准化行 → 清洗 → 校验 → 转换 → 分批落库
// 支持: CSV, Excel (xlsx/xls), JSON
// ==========================================

// 模块声明
pub mod csv_processor;
pub mod date_formats;
pub mod error;
pub mod excel_processor;
pub mod importer_trait;
pub mod json_processor;
pub mod orchestrator;
pub mod processor_registry;
pub mod sanitizer;
pub mod transformer;
pub mod validator;
pub mod value_inference;

// 重导出核心类型
pub use csv_processor::CsvProcessor;
pub use error::{ImportError, ImportResult};
pub use excel_processor::ExcelProcessor;
pub use json_processor::JsonProcessor;
pub use orchestrator::{ImportOrchestrator, PipelineState};
pub use processor_registry::ProcessorRegistry;
pub use sanitizer::MarkupSanitizer;
pub use transformer::EntityTransformer;
pub use validator::{ValidationEngine, ValidationOptions};

// 重导出 Trait 接口
pub use importer_trait::{FormatProcessor, Sanitizer, Transformer};
