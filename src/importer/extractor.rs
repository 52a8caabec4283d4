// ==========================================
// 饮食计划表格导入 - 餐次提取器实现
// ==========================================
// 阶段 2: 重新扫描数据行 → 餐次列表 + 购物清单
// 说明:
// - 接受条件（餐名或制作方法非空）比校验器宽松，已被校验器标错的行仍会产出餐次
// - 两遍扫描只共享"空行"判定与 last_row 边界
// ==========================================

use crate::domain::meal::ParsedMeal;
use crate::domain::types::MealSlots;
use crate::importer::importer_trait::MealExtractor;
use crate::importer::nutrition::parse_nutritional_values;
use crate::importer::workbook::{SheetColumn, Workbook};
use std::collections::BTreeSet;

/// 提取阶段输出
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractionOutcome {
    pub meals: Vec<ParsedMeal>,
    /// 去重购物清单（BTreeSet 排序，保证结果稳定）
    pub shopping_list: Vec<String>,
    /// 本阶段考察过的非空行数（应与校验阶段 total_rows 一致）
    pub rows_considered: usize,
}

/// 拆分配料列: 按逗号切分、TRIM、丢弃空项，保持原顺序
pub fn split_ingredients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct DietMealExtractor;

impl MealExtractor for DietMealExtractor {
    fn extract(
        &self,
        workbook: &Workbook,
        last_row: Option<usize>,
        slots: &MealSlots,
    ) -> ExtractionOutcome {
        let Some(last_row) = last_row else {
            return ExtractionOutcome::default();
        };

        let mut meals = Vec::new();
        let mut shopping: BTreeSet<String> = BTreeSet::new();
        let mut rows_considered = 0;

        for index in 1..=last_row {
            let row = workbook.row(index);
            if row.is_empty() {
                continue;
            }
            rows_considered += 1;

            let name = row.text(SheetColumn::MealName);
            let instructions = row.text(SheetColumn::Instructions);
            let ingredients = split_ingredients(&row.text(SheetColumn::Ingredients));
            let nutrition_raw = row.text(SheetColumn::Nutrition);

            shopping.extend(ingredients.iter().cloned());

            if name.is_empty() && instructions.is_empty() {
                continue;
            }

            let meal_type = slots.slot_at(meals.len());
            meals.push(ParsedMeal {
                name,
                instructions,
                ingredients,
                nutritional_values: parse_nutritional_values(Some(&nutrition_raw)),
                meal_type,
                time: meal_type.default_time().to_string(),
            });
        }

        ExtractionOutcome {
            meals,
            shopping_list: shopping.into_iter().collect(),
            rows_considered,
        }
    }
}
