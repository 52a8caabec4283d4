// ==========================================
// 饮食计划表格导入 - 表格结构校验器实现
// ==========================================
// 阶段 1: 逐行校验（餐名 / 制作方法 / 配料必填，营养值可选）
// 职责: 行级错误收集 + 汇总计数 + 进度上报
// ==========================================

use crate::domain::meal::ValidationError;
use crate::importer::importer_trait::SheetValidator;
use crate::importer::workbook::{SheetColumn, Workbook};
use tracing::debug;

/// 缺少餐名
pub const MISSING_MEAL_NAME: &str = "brak nazwy posiłku";
/// 缺少制作方法
pub const MISSING_PREPARATION: &str = "brak sposobu przygotowania";
/// 缺少配料（购物清单）
pub const MISSING_INGREDIENTS: &str = "brak listy zakupów";

/// 默认进度上报间隔（行）
pub const DEFAULT_PROGRESS_INTERVAL_ROWS: usize = 1000;

/// 校验阶段输出
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetValidation {
    /// 非空数据行数
    pub total_rows: usize,
    pub is_valid: bool,
    /// 任一数据行配料列非空即为 true（表级标志）
    pub has_shopping_list: bool,
    pub errors: Vec<ValidationError>,
    /// 最后一个非空行的索引（0 起）；无数据行时为 None
    pub last_row: Option<usize>,
}

pub struct DietSheetValidator {
    progress_interval_rows: usize,
}

impl DietSheetValidator {
    pub fn new(progress_interval_rows: usize) -> Self {
        Self {
            progress_interval_rows: progress_interval_rows.max(1),
        }
    }

    /// 计算进度百分比（四舍五入，钳制到 0-100）
    fn progress_percent(scanned: usize, declared_rows: usize) -> u8 {
        if declared_rows == 0 {
            return 100;
        }
        let percent = (scanned as f64 / declared_rows as f64 * 100.0).round();
        percent.clamp(0.0, 100.0) as u8
    }
}

impl Default for DietSheetValidator {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL_ROWS)
    }
}

impl SheetValidator for DietSheetValidator {
    fn validate(&self, workbook: &Workbook, on_progress: &mut dyn FnMut(u8)) -> SheetValidation {
        let Some(range) = workbook.declared_range() else {
            return SheetValidation {
                is_valid: true,
                ..SheetValidation::default()
            };
        };

        // 第 0 行为表头，数据行从 1 开始
        let declared_rows = range.last_row;
        let mut result = SheetValidation::default();

        for index in 1..=range.last_row {
            let row = workbook.row(index);

            // 已扫描行数 == 当前行索引（表头不计）
            let scanned = index;
            if scanned % self.progress_interval_rows == 0 {
                on_progress(Self::progress_percent(scanned, declared_rows));
            }

            if row.is_empty() {
                continue;
            }

            result.total_rows += 1;
            result.last_row = Some(index);

            if !row.is_blank(SheetColumn::Ingredients) {
                result.has_shopping_list = true;
            }

            let mut reasons = Vec::new();
            if row.is_blank(SheetColumn::MealName) {
                reasons.push(MISSING_MEAL_NAME.to_string());
            }
            if row.is_blank(SheetColumn::Instructions) {
                reasons.push(MISSING_PREPARATION.to_string());
            }
            if row.is_blank(SheetColumn::Ingredients) {
                reasons.push(MISSING_INGREDIENTS.to_string());
            }

            if !reasons.is_empty() {
                debug!(row = row.spreadsheet_row(), reasons = ?reasons, "行校验失败");
                result.errors.push(ValidationError {
                    row: row.spreadsheet_row(),
                    errors: reasons,
                });
            }
        }

        result.is_valid = result.errors.is_empty();
        result
    }
}
