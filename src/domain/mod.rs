// ==========================================
// 饮食计划表格导入 - 领域模型层
// ==========================================
// 职责: 定义餐次类型、解析结果与饮食计划结构
// 红线: 不含数据访问逻辑,不含解析逻辑
// ==========================================

pub mod diet;
pub mod meal;
pub mod types;

// 重导出核心类型
pub use diet::{
    Diet, DietDay, DietDraft, DietError, DietMeal, Recipe, ShoppingList, ShoppingListItem,
};
pub use meal::{
    NutritionalValues, ParsedDietData, ParsedMeal, PreliminaryValidationData, ValidationError,
};
pub use types::{MealSlots, MealType, MAX_MEALS_PER_DAY};
