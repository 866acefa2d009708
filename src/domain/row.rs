// ==========================================
// 机器人设备数据导入系统 - 标准化行模型
// ==========================================
// 职责: 与源格式无关的有序键值行 + 弱类型标量
// 红线: 每个源行生成独立的行对象，不跨行共享
// ==========================================

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// 单元格弱类型标量
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

/// 标准化行: 字段名（去空白、保留大小写）→ 标量，保持源列顺序
pub type NormalizedRow = IndexMap<String, CellValue>;

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// null 或仅含空白的字符串
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 文本表示（null 返回 None）
    ///
    /// 浮点数即使没有小数部分也保留 ".0"，
    /// 以免 "2.0" 在整数校验中被误判为整数
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// 去除首尾空白后的非空文本
    pub fn as_trimmed_text(&self) -> Option<String> {
        self.as_text()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 按字段映射表重命名行的键（源列名 → 标准字段名）
///
/// 键顺序保持不变；映射到已存在的键时覆盖其值
pub fn remap_fields(row: NormalizedRow, mappings: &HashMap<String, String>) -> NormalizedRow {
    if mappings.is_empty() {
        return row;
    }

    let mut remapped = NormalizedRow::with_capacity(row.len());
    for (key, value) in row {
        let target = mappings.get(&key).cloned().unwrap_or(key);
        remapped.insert(target, value);
    }
    remapped
}
