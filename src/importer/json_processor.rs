// ==========================================
// 机器人设备数据导入系统 - 结构化文档处理器
// ==========================================
// 职责: JSON 树 → 标准化行（展平嵌套对象）
// 规则:
// - 根为数组: 每个元素一行（对象展平；标量元素 → {value, index}）
// - 根为对象: 第一个非空数组字段作为行序列，否则整个对象展平为一行
// ==========================================

use crate::domain::row::{CellValue, NormalizedRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FormatProcessor;
use crate::importer::value_inference::infer_json_text;
use serde_json::{Map, Value};
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub struct JsonProcessor;

impl JsonProcessor {
    /// 数组元素 → 行序列（展平后为空的对象被跳过）
    fn rows_from_array(items: &[Value]) -> Vec<NormalizedRow> {
        let mut rows = Vec::with_capacity(items.len());

        for (idx, item) in items.iter().enumerate() {
            match item {
                Value::Object(map) => {
                    let mut row = NormalizedRow::new();
                    Self::flatten(map, "", &mut row);
                    if !row.is_empty() {
                        rows.push(row);
                    }
                }
                other => {
                    let mut row = NormalizedRow::new();
                    row.insert("value".to_string(), Self::convert(other));
                    row.insert("index".to_string(), CellValue::Int(idx as i64));
                    rows.push(row);
                }
            }
        }

        rows
    }

    /// 根对象 → 行序列
    fn rows_from_object(map: &Map<String, Value>) -> Vec<NormalizedRow> {
        // 数组字段优先于展平根对象
        for value in map.values() {
            if let Value::Array(items) = value {
                if !items.is_empty() {
                    let rows = Self::rows_from_array(items);
                    if !rows.is_empty() {
                        return rows;
                    }
                }
            }
        }

        // 没有可用数组时整个对象恰好成为一行（可能为空行）
        let mut row = NormalizedRow::new();
        Self::flatten(map, "", &mut row);
        vec![row]
    }

    /// 展平对象，嵌套键以 "." 连接
    fn flatten(map: &Map<String, Value>, prefix: &str, out: &mut NormalizedRow) {
        for (key, value) in map {
            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };

            match value {
                Value::Object(nested) if !nested.is_empty() => {
                    Self::flatten(nested, &field, out);
                }
                Value::Array(items) if !items.is_empty() => {
                    let all_scalar = items
                        .iter()
                        .all(|item| !matches!(item, Value::Object(_) | Value::Array(_)));
                    let rendered = if all_scalar {
                        items
                            .iter()
                            .map(|item| Self::convert(item).to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    } else {
                        format!("[Array with {} elements]", items.len())
                    };
                    out.insert(field, CellValue::Text(rendered));
                }
                other => {
                    out.insert(field, Self::convert(other));
                }
            }
        }
    }

    /// 标量节点 → 单元格值（空对象/空数组保留其 JSON 文本）
    fn convert(value: &Value) -> CellValue {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    CellValue::Float(f)
                } else {
                    CellValue::Text(n.to_string())
                }
            }
            Value::String(s) => infer_json_text(s),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl FormatProcessor for JsonProcessor {
    fn parse(&self, bytes: &[u8]) -> ImportResult<Vec<NormalizedRow>> {
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        if content.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ImportError::EmptyDocument("JSON 文件为空".to_string()));
        }

        let root: Value = serde_json::from_slice(content)?;
        let rows = match &root {
            Value::Array(items) => Self::rows_from_array(items),
            Value::Object(map) => Self::rows_from_object(map),
            _ => {
                return Err(ImportError::JsonParseError(
                    "JSON 根节点必须是对象或对象数组".to_string(),
                ))
            }
        };

        if rows.is_empty() {
            return Err(ImportError::NoDataRows("JSON".to_string()));
        }

        debug!(rows = rows.len(), "JSON 解析完成");
        Ok(rows)
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
