// ==========================================
// 饮食计划表格导入 - 领域类型定义
// ==========================================
// 职责: 餐次类型 / 每日餐次模板
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 餐次类型 (Meal Type)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与前端/文档库一致)
// 声明顺序即固定优先级顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Breakfast,       // 早餐
    SecondBreakfast, // 第二早餐
    Lunch,           // 午餐
    Snack,           // 加餐
    Dinner,          // 晚餐
}

impl MealType {
    /// 全部餐次（固定优先级顺序）
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::SecondBreakfast,
        MealType::Lunch,
        MealType::Snack,
        MealType::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "BREAKFAST",
            MealType::SecondBreakfast => "SECOND_BREAKFAST",
            MealType::Lunch => "LUNCH",
            MealType::Snack => "SNACK",
            MealType::Dinner => "DINNER",
        }
    }

    /// 餐次默认时间（HH:MM）
    pub fn default_time(&self) -> &'static str {
        match self {
            MealType::Breakfast => "07:00",
            MealType::SecondBreakfast => "10:00",
            MealType::Lunch => "13:00",
            MealType::Snack => "16:00",
            MealType::Dinner => "19:00",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 每日餐次数量上限
pub const MAX_MEALS_PER_DAY: usize = MealType::ALL.len();

// ==========================================
// 每日餐次模板 (Meal Slot Template)
// ==========================================
// 规则:
// - 1 → 午餐
// - 2 → 早餐 + 晚餐
// - 3 → 早餐 + 午餐 + 晚餐
// - 4 → 早餐 + 第二早餐 + 午餐 + 晚餐
// - 5 → 全部
// 超出范围的数量先钳制到 1..=5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealSlots {
    slots: Vec<MealType>,
}

impl MealSlots {
    pub fn for_meals_per_day(meals_per_day: usize) -> Self {
        use MealType::*;
        let slots = match meals_per_day.clamp(1, MAX_MEALS_PER_DAY) {
            1 => vec![Lunch],
            2 => vec![Breakfast, Dinner],
            3 => vec![Breakfast, Lunch, Dinner],
            4 => vec![Breakfast, SecondBreakfast, Lunch, Dinner],
            _ => MealType::ALL.to_vec(),
        };
        Self { slots }
    }

    /// 按文件顺序中的位置分配餐次（循环）
    pub fn slot_at(&self, position: usize) -> MealType {
        self.slots[position % self.slots.len()]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn as_slice(&self) -> &[MealType] {
        &self.slots
    }
}

impl Default for MealSlots {
    fn default() -> Self {
        Self::for_meals_per_day(MAX_MEALS_PER_DAY)
    }
}
