// ==========================================
// 机器人设备数据导入系统 - 标量类型推断
// ==========================================
// 职责: 文本单元格 → 弱类型标量（尽力推断）
// 优先级（对外可见，不可调整）:
//   null/空 → 整数 -?\d+ → 浮点 -?\d*\.\d+ → 布尔词 → 去空白字符串
// 说明: "1" 永远是整数 1，不会成为布尔值
// ==========================================

use crate::domain::row::CellValue;
use once_cell::sync::Lazy;
use regex::Regex;

static INTEGER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+$").expect("hard-coded regular expression to be valid"));

static DECIMAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d*\.\d+$").expect("hard-coded regular expression to be valid"));

/// 分隔文本单元格推断
pub fn infer_delimited(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return CellValue::Null;
    }

    if INTEGER_PATTERN.is_match(trimmed) {
        // 超出 i64 范围的数字串保留为文本
        return match trimmed.parse::<i64>() {
            Ok(v) => CellValue::Int(v),
            Err(_) => CellValue::Text(trimmed.to_string()),
        };
    }

    if DECIMAL_PATTERN.is_match(trimmed) {
        if let Ok(v) = trimmed.parse::<f64>() {
            return CellValue::Float(v);
        }
    }

    match parse_boolean_token(trimmed) {
        Some(b) => CellValue::Bool(b),
        None => CellValue::Text(trimmed.to_string()),
    }
}

/// 结构化文档中字符串值的二次推断
///
/// 与分隔文本不同: 布尔只识别 true/false；未命中时保留原文
pub fn infer_json_text(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    if INTEGER_PATTERN.is_match(trimmed) {
        if let Ok(v) = trimmed.parse::<i64>() {
            return CellValue::Int(v);
        }
    } else if DECIMAL_PATTERN.is_match(trimmed) {
        if let Ok(v) = trimmed.parse::<f64>() {
            return CellValue::Float(v);
        }
    }

    if trimmed.eq_ignore_ascii_case("null") {
        return CellValue::Null;
    }

    CellValue::Text(raw.to_string())
}

/// 布尔词精确匹配（大小写不敏感）
pub fn parse_boolean_token(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
