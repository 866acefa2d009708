// ==========================================
// 机器人设备数据导入系统 - 导入管道 Trait
// ==========================================
// 职责: 定义管道各阶段接口（不包含实现）
// 阶段: 解析 → 清洗 → 校验 → 转换 → 落库
// ==========================================

use crate::domain::entity::TypedEntity;
use crate::domain::row::{CellValue, NormalizedRow};
use crate::domain::types::EntityKind;
use crate::importer::error::ImportResult;

// ==========================================
// FormatProcessor Trait
// ==========================================
// 用途: 字节流 → 标准化行序列（阶段 1）
// 实现者: CsvProcessor, ExcelProcessor, JsonProcessor
pub trait FormatProcessor: Send + Sync {
    /// 解析整个文档
    ///
    /// # 参数
    /// - bytes: 文件原始字节
    ///
    /// # 返回
    /// - Ok(Vec<NormalizedRow>): 至少一行
    /// - Err: 结构性错误（空文档、表头缺失/重复、零数据行），不返回部分结果
    fn parse(&self, bytes: &[u8]) -> ImportResult<Vec<NormalizedRow>>;

    /// 支持的扩展名（小写，不含点）
    fn supported_extensions(&self) -> &'static [&'static str];

    /// 处理器名称（日志用）
    fn name(&self) -> &'static str;
}

// ==========================================
// Sanitizer Trait
// ==========================================
// 用途: 去除字符串中的脚本/标记片段（阶段 2）
// 实现者: MarkupSanitizer
pub trait Sanitizer: Send + Sync {
    /// 清洗单个字符串（幂等）
    fn sanitize(&self, value: &str) -> String;

    /// 原地清洗所有行中的字符串单元格，非字符串值原样保留
    ///
    /// # 返回
    /// - 被改写的单元格数
    fn sanitize_rows(&self, rows: &mut [NormalizedRow]) -> usize {
        let mut changed = 0;
        for row in rows.iter_mut() {
            for value in row.values_mut() {
                if let CellValue::Text(text) = value {
                    let cleaned = self.sanitize(text);
                    if cleaned != *text {
                        *text = cleaned;
                        changed += 1;
                    }
                }
            }
        }
        changed
    }
}

// ==========================================
// Transformer Trait
// ==========================================
// 用途: 标准化行 → 业务实体（阶段 4）
// 实现者: EntityTransformer
pub trait Transformer: Send + Sync {
    /// 将一行转换为指定类别的业务实体
    ///
    /// # 参数
    /// - row: 已清洗的标准化行
    /// - kind: 实体类别
    /// - row_number: 源行号（错误定位用）
    ///
    /// # 返回
    /// - Err(MissingField): 实体必填字段缺失，无法构造记录
    fn transform(
        &self,
        row: &NormalizedRow,
        kind: EntityKind,
        row_number: usize,
    ) -> ImportResult<TypedEntity>;
}
