// ==========================================
// 机器人设备数据导入系统 - 日期格式
// ==========================================
// 校验与转换共用同一有序格式表，首个匹配者生效
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};

/// 带时间的格式（按优先级）
pub const DATETIME_PATTERNS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// 仅日期的格式（按优先级，解析为当日 00:00:00）
pub const DATE_PATTERNS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];

/// 按有序格式表解析日期时间
///
/// # 返回
/// - None: 空串或所有格式均不匹配
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for pattern in DATETIME_PATTERNS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Some(dt);
        }
    }

    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_patterns() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-05-17 09:30:00"), Some(expected));
        assert_eq!(parse_datetime("2024-05-17T09:30:00"), Some(expected));
        assert_eq!(parse_datetime("17/05/2024 09:30:00"), Some(expected));
        assert_eq!(parse_datetime("05/17/2024 09:30:00"), Some(expected));
        assert!(parse_datetime("2024-05-17T09:30:00.250").is_some());
    }

    #[test]
    fn test_date_only_is_midnight() {
        let midnight = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-05-17"), Some(midnight));
        assert_eq!(parse_datetime("2024/05/17"), Some(midnight));
    }

    #[test]
    fn test_first_match_wins_for_ambiguous_dates() {
        // 03/04/2024 按 dd/MM/yyyy 先匹配 → 4 月 3 日
        let dt = parse_datetime("03/04/2024").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("tomorrow"), None);
        assert_eq!(parse_datetime("2024-13-45"), None);
    }
}
