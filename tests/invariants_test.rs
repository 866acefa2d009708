// ==========================================
// 性质测试
// ==========================================
// - 清洗幂等
// - 校验报告: total = successful + failed
// ==========================================

use fleet_import::domain::row::{CellValue, NormalizedRow};
use fleet_import::importer::{MarkupSanitizer, Sanitizer, ValidationEngine, ValidationOptions};
use proptest::prelude::*;

mod test_helpers;
use test_helpers::MemoryRecordStore;

fn markup_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,12}",
        Just("<script>alert(1)</script>".to_string()),
        Just("<SCRIPT>".to_string()),
        Just("</script>".to_string()),
        Just("<b>".to_string()),
        Just("</b>".to_string()),
        Just("javascript:".to_string()),
        Just("VBScript:".to_string()),
        Just("onclick=".to_string()),
        Just("<".to_string()),
        Just(">".to_string()),
        Just("  ".to_string()),
    ]
}

fn camera_row() -> impl Strategy<Value = NormalizedRow> {
    (
        prop_oneof![Just(String::new()), "[A-Za-z0-9 -]{1,20}"],
        prop_oneof![
            Just("IP".to_string()),
            Just("PTZ".to_string()),
            Just("SATELLITE".to_string()),
            Just(String::new())
        ],
        prop_oneof![
            Just("10.0.0.1".to_string()),
            Just("300.1.1.1".to_string()),
            Just(String::new()),
            "[0-9.]{1,15}"
        ],
        prop_oneof![Just("true"), Just("no"), Just("")],
    )
        .prop_map(|(name, camera_type, ip, active)| {
            let mut row = NormalizedRow::new();
            row.insert("name".to_string(), CellValue::Text(name));
            row.insert("type".to_string(), CellValue::Text(camera_type));
            row.insert("ipAddress".to_string(), CellValue::Text(ip));
            row.insert("isActive".to_string(), CellValue::Text(active.to_string()));
            row
        })
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(parts in prop::collection::vec(markup_fragment(), 0..8)) {
        let sanitizer = MarkupSanitizer::new();
        let input = parts.concat();
        let once = sanitizer.sanitize(&input);
        let twice = sanitizer.sanitize(&once);
        prop_assert_eq!(&once, &twice);
        // 结果中不再含完整标记
        let no_tag = match once.find('<') {
            Some(i) => !once[i..].contains('>'),
            None => true,
        };
        prop_assert!(no_tag, "tag survived: {:?}", once);
    }

    #[test]
    fn validation_counts_balance(
        rows in prop::collection::vec(camera_row(), 1..20),
        strict in any::<bool>(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let store = MemoryRecordStore::new();
        let engine = ValidationEngine::new(ValidationOptions {
            strict,
            check_duplicates: true,
        });

        let report = runtime
            .block_on(engine.validate(&rows, "camera", &store))
            .unwrap();

        prop_assert_eq!(report.total_records, rows.len() as i64);
        prop_assert_eq!(
            report.total_records,
            report.successful_records + report.failed_records
        );
        prop_assert_eq!(report.failed_records, report.errors.len() as i64);
        prop_assert!(report.errors.iter().all(|e| e.row >= 2 && e.row <= rows.len() + 1));
    }
}
