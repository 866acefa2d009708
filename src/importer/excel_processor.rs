// ==========================================
// 机器人设备数据导入系统 - 电子表格处理器
// ==========================================
// 职责: 首个工作表 → 标准化行（按单元格原生类型提取）
// 支持: .xlsx / .xls
// 规则:
// - 表头 = 首个物理行；空表头单元格命名为 Column_<n>
// - 数值: 日期格式 → 日期时间；无小数部分 → 整数；否则浮点
// - 公式: 取缓存计算结果，无结果时退回公式文本
// - 错误单元格 → "#ERROR"
// - 合并区域（表头行以外）: 左上角值填充区域内为 null 的单元格
// ==========================================

use crate::domain::row::{CellValue, NormalizedRow};
use crate::importer::date_formats::parse_datetime;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FormatProcessor;
use calamine::{open_workbook_auto_from_rs, Data, Dimensions, Range, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::io::Cursor;
use tracing::{debug, warn};

/// 电子表格错误单元格的统一表示
pub const ERROR_CELL_TEXT: &str = "#ERROR";

pub struct ExcelProcessor;

impl ExcelProcessor {
    /// Excel 序列日期（1900 日期系统）→ 日期时间
    pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
        if !serial.is_finite() {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        let days = serial.trunc() as i64;
        let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
        epoch
            .checked_add_signed(Duration::days(days))?
            .checked_add_signed(Duration::seconds(seconds))
    }

    /// 单元格 → 标量
    ///
    /// # 参数
    /// - cell: 缓存值
    /// - formula: 同位置的公式文本（若有）
    pub fn cell_value(cell: &Data, formula: Option<&str>) -> CellValue {
        match cell {
            Data::String(s) => CellValue::Text(s.trim().to_string()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => Self::narrow_number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => {
                if dt.is_datetime() {
                    match Self::serial_to_datetime(dt.as_f64()) {
                        Some(value) => CellValue::DateTime(value),
                        None => Self::narrow_number(dt.as_f64()),
                    }
                } else {
                    Self::narrow_number(dt.as_f64())
                }
            }
            Data::DateTimeIso(s) => match parse_datetime(s) {
                Some(value) => CellValue::DateTime(value),
                None => CellValue::Text(s.trim().to_string()),
            },
            Data::DurationIso(s) => CellValue::Text(s.trim().to_string()),
            Data::Error(_) => CellValue::Text(ERROR_CELL_TEXT.to_string()),
            Data::Empty => match formula {
                // 公式无可用计算结果 → 退回公式文本
                Some(text) if !text.trim().is_empty() => CellValue::Text(text.trim().to_string()),
                _ => CellValue::Null,
            },
        }
    }

    /// 无小数部分的数值收窄为整数
    fn narrow_number(value: f64) -> CellValue {
        if value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value <= i64::MAX as f64
        {
            CellValue::Int(value as i64)
        } else {
            CellValue::Float(value)
        }
    }

    /// 由表头行生成字段名
    ///
    /// 尾部空单元格忽略；中间的空单元格命名为 Column_<列号>；重复则失败
    pub fn build_headers(header_cells: &[CellValue]) -> ImportResult<Vec<String>> {
        let width = header_cells
            .iter()
            .rposition(|cell| !cell.is_blank())
            .map(|idx| idx + 1)
            .unwrap_or(0);
        if width == 0 {
            return Err(ImportError::EmptyDocument("Excel 表头行为空".to_string()));
        }

        let mut headers = Vec::with_capacity(width);
        let mut seen = HashSet::new();
        for (idx, cell) in header_cells[..width].iter().enumerate() {
            let header = cell
                .as_trimmed_text()
                .unwrap_or_else(|| format!("Column_{}", idx + 1));
            if !seen.insert(header.clone()) {
                return Err(ImportError::DuplicateHeader(header));
            }
            headers.push(header);
        }
        Ok(headers)
    }

    /// 合并区域填充
    ///
    /// # 参数
    /// - grid: 相对坐标网格，第 0 行为表头
    /// - regions: 相对坐标的合并区域 ((首行, 首列), (末行, 末列))
    pub fn propagate_merged(grid: &mut [Vec<CellValue>], regions: &[((usize, usize), (usize, usize))]) {
        for &((first_row, first_col), (last_row, last_col)) in regions {
            // 起始于表头行的区域不处理
            if first_row == 0 {
                continue;
            }
            let top_left = match grid.get(first_row).and_then(|row| row.get(first_col)) {
                Some(value) if !value.is_null() => value.clone(),
                _ => continue,
            };

            for row_idx in first_row..=last_row {
                let Some(row) = grid.get_mut(row_idx) else {
                    break;
                };
                for col_idx in first_col..=last_col {
                    if let Some(cell) = row.get_mut(col_idx) {
                        if cell.is_null() {
                            *cell = top_left.clone();
                        }
                    }
                }
            }
        }
    }

    /// 读取首个工作表的合并区域（绝对坐标）
    fn merged_regions(workbook: &mut Sheets<Cursor<Vec<u8>>>, sheet: &str) -> Vec<Dimensions> {
        match workbook {
            Sheets::Xlsx(xlsx) => {
                if let Err(e) = xlsx.load_merged_regions() {
                    warn!(error = %e, "读取合并区域失败，忽略合并单元格");
                    return Vec::new();
                }
                xlsx.merged_regions_by_sheet(sheet)
                    .into_iter()
                    .map(|(_, _, dims)| dims.clone())
                    .collect()
            }
            Sheets::Xls(xls) => xls.worksheet_merge_cells(sheet).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// 区域内单元格 → 相对坐标网格（仅保留表头宽度内的列）
    fn build_grid(
        range: &Range<Data>,
        formulas: Option<&Range<String>>,
        width: usize,
    ) -> Vec<Vec<CellValue>> {
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        range
            .rows()
            .enumerate()
            .map(|(row_idx, cells)| {
                (0..width)
                    .map(|col_idx| {
                        let cell = cells.get(col_idx).unwrap_or(&Data::Empty);
                        let position = (start_row + row_idx as u32, start_col + col_idx as u32);
                        let formula = formulas
                            .and_then(|f| f.get_value(position))
                            .map(|s| s.as_str());
                        Self::cell_value(cell, formula)
                    })
                    .collect()
            })
            .collect()
    }
}

impl FormatProcessor for ExcelProcessor {
    fn parse(&self, bytes: &[u8]) -> ImportResult<Vec<NormalizedRow>> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyDocument("Excel 文件为空".to_string()));
        }

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        if range.is_empty() {
            return Err(ImportError::EmptyDocument(format!(
                "工作表 {} 为空",
                sheet_name
            )));
        }
        let formulas = workbook.worksheet_formula(&sheet_name).ok();

        // 提取表头（第一行）
        let header_cells: Vec<CellValue> = range
            .rows()
            .next()
            .map(|cells| cells.iter().map(|c| Self::cell_value(c, None)).collect())
            .unwrap_or_default();
        let headers = Self::build_headers(&header_cells)?;

        let mut grid = Self::build_grid(&range, formulas.as_ref(), headers.len());

        // 空行判断基于合并填充之前的原始值
        let empty_rows: Vec<bool> = grid
            .iter()
            .map(|row| row.iter().all(CellValue::is_blank))
            .collect();

        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let regions: Vec<((usize, usize), (usize, usize))> =
            Self::merged_regions(&mut workbook, &sheet_name)
                .into_iter()
                .filter(|dims| dims.start.0 >= start_row && dims.start.1 >= start_col)
                .map(|dims| {
                    (
                        (
                            (dims.start.0 - start_row) as usize,
                            (dims.start.1 - start_col) as usize,
                        ),
                        (
                            (dims.end.0.saturating_sub(start_row)) as usize,
                            (dims.end.1.saturating_sub(start_col)) as usize,
                        ),
                    )
                })
                .collect();
        Self::propagate_merged(&mut grid, &regions);

        // 读取数据行
        let mut rows = Vec::new();
        for (row_idx, cells) in grid.into_iter().enumerate().skip(1) {
            if empty_rows[row_idx] {
                continue;
            }
            let row: NormalizedRow = headers.iter().cloned().zip(cells).collect();
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(ImportError::NoDataRows(format!("Excel 工作表 {}", sheet_name)));
        }

        debug!(
            sheet = %sheet_name,
            columns = headers.len(),
            rows = rows.len(),
            merged_regions = regions.len(),
            "Excel 解析完成"
        );
        Ok(rows)
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xls"]
    }

    fn name(&self) -> &'static str {
        "excel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_serial_to_datetime() {
        // 45292.5 = 2024-01-01 12:00:00
        let dt = ExcelProcessor::serial_to_datetime(45292.5).unwrap();
        assert_eq!(dt.to_string(), "2024-01-01 12:00:00");
        assert!(ExcelProcessor::serial_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_cell_value_typing() {
        assert_eq!(ExcelProcessor::cell_value(&Data::Float(3.0), None), CellValue::Int(3));
        assert_eq!(ExcelProcessor::cell_value(&Data::Float(0.25), None), CellValue::Float(0.25));
        assert_eq!(ExcelProcessor::cell_value(&Data::Int(7), None), CellValue::Int(7));
        assert_eq!(
            ExcelProcessor::cell_value(&Data::String("  PTZ ".to_string()), None),
            text("PTZ")
        );
        assert_eq!(ExcelProcessor::cell_value(&Data::Bool(false), None), CellValue::Bool(false));
        assert_eq!(
            ExcelProcessor::cell_value(&Data::Error(calamine::CellErrorType::Div0), None),
            text("#ERROR")
        );
        assert_eq!(ExcelProcessor::cell_value(&Data::Empty, None), CellValue::Null);
    }

    #[test]
    fn test_formula_without_cached_value_falls_back_to_text() {
        assert_eq!(
            ExcelProcessor::cell_value(&Data::Empty, Some("SUM(A1:A3)")),
            text("SUM(A1:A3)")
        );
        // 有缓存值时使用计算结果
        assert_eq!(
            ExcelProcessor::cell_value(&Data::Float(6.0), Some("SUM(A1:A3)")),
            CellValue::Int(6)
        );
    }

    #[test]
    fn test_build_headers() {
        let headers = ExcelProcessor::build_headers(&[
            text("name"),
            CellValue::Null,
            text(" type "),
            CellValue::Null,
        ])
        .unwrap();
        assert_eq!(headers, vec!["name", "Column_2", "type"]);

        assert!(matches!(
            ExcelProcessor::build_headers(&[text("a"), text("a")]),
            Err(ImportError::DuplicateHeader(_))
        ));
        assert!(matches!(
            ExcelProcessor::build_headers(&[CellValue::Null]),
            Err(ImportError::EmptyDocument(_))
        ));
    }

    #[test]
    fn test_propagate_merged_fills_only_nulls() {
        let mut grid = vec![
            vec![text("name"), text("location")],
            vec![text("cam-1"), text("Hall A")],
            vec![text("cam-2"), CellValue::Null],
            vec![text("cam-3"), text("Hall B")],
        ];
        ExcelProcessor::propagate_merged(&mut grid, &[((1, 1), (3, 1))]);
        assert_eq!(grid[2][1], text("Hall A"));
        // 非 null 值不被覆盖
        assert_eq!(grid[3][1], text("Hall B"));
    }

    #[test]
    fn test_propagate_merged_skips_header_regions() {
        let mut grid = vec![
            vec![text("name"), CellValue::Null],
            vec![CellValue::Null, CellValue::Null],
        ];
        ExcelProcessor::propagate_merged(&mut grid, &[((0, 0), (1, 1))]);
        assert_eq!(grid[0][1], CellValue::Null);
        assert_eq!(grid[1][0], CellValue::Null);
    }

    #[test]
    fn test_parse_rejects_invalid_bytes() {
        assert!(matches!(
            ExcelProcessor.parse(b""),
            Err(ImportError::EmptyDocument(_))
        ));
        assert!(matches!(
            ExcelProcessor.parse(b"definitely not a workbook"),
            Err(ImportError::ExcelParseError(_))
        ));
    }
}
