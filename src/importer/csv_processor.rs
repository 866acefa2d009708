// ==========================================
// 机器人设备数据导入系统 - 分隔文本处理器
// ==========================================
// 职责: 分隔符探测 + RFC-4180 解析 + 标量推断
// 支持: .csv（逗号/分号/TAB/竖线）
// ==========================================

use crate::domain::row::NormalizedRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FormatProcessor;
use crate::importer::value_inference::infer_delimited;
use csv::ReaderBuilder;
use std::collections::HashSet;
use tracing::debug;

/// 分隔符候选（声明顺序即平局时的优先顺序）
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// 分隔符探测的采样窗口（字节）
pub const DELIMITER_SAMPLE_SIZE: usize = 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub struct CsvProcessor;

impl CsvProcessor {
    /// 探测主分隔符
    ///
    /// 统计采样窗口内各候选出现次数，严格大于才替换，
    /// 因此平局时保留声明顺序靠前者；全部为 0 时为逗号
    pub fn detect_delimiter(bytes: &[u8]) -> u8 {
        let window = &bytes[..bytes.len().min(DELIMITER_SAMPLE_SIZE)];

        let mut best = DELIMITER_CANDIDATES[0];
        let mut best_count = 0usize;
        for candidate in DELIMITER_CANDIDATES {
            let count = window.iter().filter(|b| **b == candidate).count();
            if count > best_count {
                best = candidate;
                best_count = count;
            }
        }
        best
    }

    /// 校验并整理表头（去空白、非空、两两不同）
    fn normalize_headers<'a>(raw: impl Iterator<Item = &'a str>) -> ImportResult<Vec<String>> {
        let mut headers = Vec::new();
        let mut seen = HashSet::new();

        for (idx, header) in raw.enumerate() {
            let header = header.trim().to_string();
            if header.is_empty() {
                return Err(ImportError::EmptyHeader { column: idx + 1 });
            }
            if !seen.insert(header.clone()) {
                return Err(ImportError::DuplicateHeader(header));
            }
            headers.push(header);
        }

        if headers.is_empty() {
            return Err(ImportError::EmptyDocument("CSV 缺少表头".to_string()));
        }
        Ok(headers)
    }
}

impl FormatProcessor for CsvProcessor {
    fn parse(&self, bytes: &[u8]) -> ImportResult<Vec<NormalizedRow>> {
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        if content.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ImportError::EmptyDocument("CSV 文件为空".to_string()));
        }

        let delimiter = Self::detect_delimiter(content);
        debug!(delimiter = %(delimiter as char).escape_default(), "CSV 分隔符探测完成");

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(b'"')
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(content);

        let mut records = reader.records();

        // 读取表头（第一行）
        let header_record = match records.next() {
            Some(record) => record?,
            None => return Err(ImportError::EmptyDocument("CSV 文件为空".to_string())),
        };
        let headers = Self::normalize_headers(header_record.iter())?;

        // 读取数据行
        let mut rows = Vec::new();
        for result in records {
            let record = result?;

            // 跳过完全空白的行（不计入总数）
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let mut row = NormalizedRow::with_capacity(headers.len());
            for (col_idx, header) in headers.iter().enumerate() {
                // 缺失的尾部单元格按空串处理 → null
                let cell = record.get(col_idx).unwrap_or("");
                row.insert(header.clone(), infer_delimited(cell));
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(ImportError::NoDataRows("CSV".to_string()));
        }

        debug!(columns = headers.len(), rows = rows.len(), "CSV 解析完成");
        Ok(rows)
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}
