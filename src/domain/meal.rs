// ==========================================
// 饮食计划表格导入 - 解析结果领域模型
// ==========================================
// 职责: 导入管道的中间产物与最终结果
// 序列化: camelCase（与前端约定一致）
// ==========================================

use crate::domain::types::MealType;
use serde::{Deserialize, Serialize};

// ==========================================
// NutritionalValues - 营养值
// ==========================================
// 字段顺序即表格简写顺序: calories,protein,fat,carbs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalValues {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl NutritionalValues {
    pub fn zero() -> Self {
        Self {
            calories: 0.0,
            protein: 0.0,
            fat: 0.0,
            carbs: 0.0,
        }
    }

    /// 逐项累加
    pub fn add(&self, other: &NutritionalValues) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            carbs: self.carbs + other.carbs,
        }
    }
}

// ==========================================
// ParsedMeal - 解析后的单个餐次
// ==========================================
// 生命周期: 提取阶段每个有效行构造一次，之后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMeal {
    pub name: String,
    pub instructions: String,
    pub ingredients: Vec<String>,
    pub nutritional_values: Option<NutritionalValues>,
    pub meal_type: MealType,
    pub time: String,
}

// ==========================================
// ValidationError - 行级结构错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// 表格行号（从 1 开始，与表格软件显示一致）
    pub row: usize,
    /// 错误原因（按检查顺序）
    pub errors: Vec<String>,
}

// ==========================================
// PreliminaryValidationData - 预校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreliminaryValidationData {
    pub total_rows: usize,
    pub is_valid: bool,
    pub has_shopping_list: bool,
    pub errors: Vec<ValidationError>,
}

// ==========================================
// ParsedDietData - 完整解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDietData {
    pub total_rows: usize,
    pub is_valid: bool,
    pub has_shopping_list: bool,
    pub errors: Vec<ValidationError>,
    pub meals: Vec<ParsedMeal>,
    /// 去重后的购物清单（排序稳定）
    pub shopping_list: Vec<String>,
}

impl ParsedDietData {
    /// 取出预校验部分
    pub fn preliminary(&self) -> PreliminaryValidationData {
        PreliminaryValidationData {
            total_rows: self.total_rows,
            is_valid: self.is_valid,
            has_shopping_list: self.has_shopping_list,
            errors: self.errors.clone(),
        }
    }
}
