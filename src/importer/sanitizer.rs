// ==========================================
// 机器人设备数据导入系统 - 输入清洗器实现
// ==========================================
// 职责: 去除脚本块 / 标记 / 脚本协议前缀 / 事件属性词
// 红线: 幂等 sanitize(sanitize(s)) == sanitize(s)
// ==========================================

use crate::importer::importer_trait::Sanitizer;
use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>")
        .expect("hard-coded regular expression to be valid")
});

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("hard-coded regular expression to be valid"));

static SCRIPT_SCHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)javascript:|vbscript:").expect("hard-coded regular expression to be valid")
});

static EVENT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)onload|onerror|onclick").expect("hard-coded regular expression to be valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupSanitizer;

impl MarkupSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// 单轮清洗（顺序: 去空白 → 脚本块 → 标记 → 协议 → 事件词）
    fn single_pass(value: &str) -> String {
        let trimmed = value.trim();
        let without_scripts = SCRIPT_BLOCK.replace_all(trimmed, "");
        let without_tags = MARKUP_TAG.replace_all(&without_scripts, "");
        let without_schemes = SCRIPT_SCHEME.replace_all(&without_tags, "");
        EVENT_TOKEN.replace_all(&without_schemes, "").into_owned()
    }
}

impl Sanitizer for MarkupSanitizer {
    /// 重复单轮清洗直至不再变化
    ///
    /// 每轮只删除字符，因此必然收敛；
    /// 删除后重新拼出的片段（如 "ononloadload"）也会被清除
    fn sanitize(&self, value: &str) -> String {
        let mut current = Self::single_pass(value);
        loop {
            let next = Self::single_pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::{CellValue, NormalizedRow};

    #[test]
    fn test_strips_script_blocks_and_tags() {
        let s = MarkupSanitizer;
        assert_eq!(s.sanitize("<script>alert(1)</script>hello"), "hello");
        assert_eq!(s.sanitize("<SCRIPT type=\"x\">\nevil()\n</SCRIPT>ok"), "ok");
        assert_eq!(s.sanitize("<b>bold</b> text"), "bold text");
        assert_eq!(s.sanitize("  plain  "), "plain");
    }

    #[test]
    fn test_strips_schemes_and_event_tokens() {
        let s = MarkupSanitizer;
        assert_eq!(s.sanitize("javascript:alert(1)"), "alert(1)");
        assert_eq!(s.sanitize("VBScript:msgbox"), "msgbox");
        assert_eq!(s.sanitize("img onerror=x"), "img =x");
        assert_eq!(s.sanitize("onclick"), "");
    }

    #[test]
    fn test_reassembled_fragments_are_removed() {
        let s = MarkupSanitizer;
        assert_eq!(s.sanitize("ononloadload"), "");
        assert_eq!(s.sanitize("javajavascript:script:x"), "x");
    }

    #[test]
    fn test_idempotent() {
        let s = MarkupSanitizer;
        for input in [
            "<scr<script>ipt>x",
            "a <i>b</i> onloadonload c",
            "  <p> javascript:void(0) </p>  ",
            "Warehouse 3, Bay 7",
        ] {
            let once = s.sanitize(input);
            assert_eq!(s.sanitize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_sanitize_rows_only_touches_text() {
        let mut row = NormalizedRow::new();
        row.insert("name".to_string(), CellValue::Text("<b>cam</b>".to_string()));
        row.insert("priority".to_string(), CellValue::Int(3));
        row.insert("note".to_string(), CellValue::Null);
        let mut rows = vec![row];

        let changed = MarkupSanitizer.sanitize_rows(&mut rows);
        assert_eq!(changed, 1);
        assert_eq!(rows[0]["name"], CellValue::Text("cam".to_string()));
        assert_eq!(rows[0]["priority"], CellValue::Int(3));
        assert_eq!(rows[0]["note"], CellValue::Null);
    }
}
