// ==========================================
// 饮食计划表格导入 - 饮食计划领域模型
// ==========================================
// 职责: 将 ParsedDietData 映射为下游文档结构（Diet / Recipe / ShoppingList）
// 红线: 只做结构映射，不含存储逻辑
// ==========================================

use crate::domain::meal::{NutritionalValues, ParsedDietData, ParsedMeal};
use crate::domain::types::MealType;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ==========================================
// Recipe - 菜谱
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub instructions: String,
    pub ingredients: Vec<String>,
    pub nutritional_values: Option<NutritionalValues>,
}

impl From<&ParsedMeal> for Recipe {
    fn from(meal: &ParsedMeal) -> Self {
        Self {
            name: meal.name.clone(),
            instructions: meal.instructions.clone(),
            ingredients: meal.ingredients.clone(),
            nutritional_values: meal.nutritional_values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietMeal {
    pub meal_type: MealType,
    pub time: String,
    pub recipe: Recipe,
}

// ==========================================
// DietDay - 单日计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietDay {
    /// 第几天（从 1 开始）
    pub day_number: usize,
    pub date: NaiveDate,
    pub meals: Vec<DietMeal>,
    /// 当日营养合计（仅统计带营养值的餐次；无任何营养值时为 None）
    pub totals: Option<NutritionalValues>,
}

// ==========================================
// ShoppingList - 购物清单
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    pub name: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    pub fn from_names(names: &[String]) -> Self {
        Self {
            items: names
                .iter()
                .map(|name| ShoppingListItem {
                    name: name.clone(),
                    checked: false,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 创建饮食计划的输入参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietDraft {
    pub name: String,
    pub start_date: NaiveDate,
}

// ==========================================
// Diet - 多日饮食计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diet {
    pub diet_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DietDay>,
    pub shopping_list: ShoppingList,
}

/// 饮食计划构建错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DietError {
    #[error("Data dnia {day_number} wykracza poza obsługiwany zakres (start: {start_date})")]
    DateOutOfRange {
        start_date: NaiveDate,
        day_number: usize,
    },
}

impl Diet {
    /// 由解析结果构建饮食计划
    ///
    /// # 规则
    /// - 天的边界由解析时分配的餐次决定: 餐次顺序不晚于上一餐时开始新的一天
    /// - 第 N 天日期 = start_date + (N - 1)
    /// - 购物清单仅在表格包含配料列时生成
    ///
    /// # 返回
    /// - Err(DietError::DateOutOfRange): 某一天的日期超出 chrono 日期范围
    pub fn from_parsed(parsed: &ParsedDietData, draft: DietDraft) -> Result<Self, DietError> {
        let mut days: Vec<DietDay> = Vec::new();

        for chunk in split_into_days(&parsed.meals) {
            let day_number = days.len() + 1;
            let date = draft
                .start_date
                .checked_add_signed(Duration::days(days.len() as i64))
                .ok_or(DietError::DateOutOfRange {
                    start_date: draft.start_date,
                    day_number,
                })?;

            let meals: Vec<DietMeal> = chunk
                .iter()
                .map(|meal| DietMeal {
                    meal_type: meal.meal_type,
                    time: meal.time.clone(),
                    recipe: Recipe::from(meal),
                })
                .collect();

            days.push(DietDay {
                day_number,
                date,
                totals: daily_totals(chunk),
                meals,
            });
        }

        let end_date = days.last().map(|d| d.date).unwrap_or(draft.start_date);

        let shopping_list = if parsed.has_shopping_list {
            ShoppingList::from_names(&parsed.shopping_list)
        } else {
            ShoppingList::default()
        };

        Ok(Self {
            diet_id: Uuid::new_v4().to_string(),
            name: draft.name,
            start_date: draft.start_date,
            end_date,
            days,
            shopping_list,
        })
    }

    pub fn meal_count(&self) -> usize {
        self.days.iter().map(|d| d.meals.len()).sum()
    }
}

/// 按餐次顺序切分天（MealType 声明顺序即一天内的顺序）
fn split_into_days(meals: &[ParsedMeal]) -> Vec<&[ParsedMeal]> {
    let mut days = Vec::new();
    let mut day_start = 0;

    for i in 1..meals.len() {
        if meals[i].meal_type <= meals[i - 1].meal_type {
            days.push(&meals[day_start..i]);
            day_start = i;
        }
    }
    if day_start < meals.len() {
        days.push(&meals[day_start..]);
    }
    days
}

fn daily_totals(meals: &[ParsedMeal]) -> Option<NutritionalValues> {
    meals
        .iter()
        .filter_map(|m| m.nutritional_values.as_ref())
        .fold(None, |acc: Option<NutritionalValues>, nv| {
            Some(acc.unwrap_or_else(NutritionalValues::zero).add(nv))
        })
}
