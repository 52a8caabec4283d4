// ==========================================
// 饮食计划表格导入 - 营养值简写解析
// ==========================================
// 格式: calories,protein,fat,carbs（恰好 4 个数值）
// 规则: 全部解析成功才返回，否则视为"无营养数据"（不是错误）
// ==========================================

use crate::domain::meal::NutritionalValues;

/// 解析营养简写
///
/// # 返回
/// - Some(NutritionalValues): 4 个数值全部合法
/// - None: 输入缺失 / 个数不为 4 / 任一非数值
pub fn parse_nutritional_values(raw: Option<&str>) -> Option<NutritionalValues> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let values: Vec<f64> = raw
        .split(',')
        .map(|token| token.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()?;

    match values.as_slice() {
        [calories, protein, fat, carbs] => Some(NutritionalValues {
            calories: *calories,
            protein: *protein,
            fat: *fat,
            carbs: *carbs,
        }),
        _ => None,
    }
}
