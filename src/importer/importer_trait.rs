// ==========================================
// 饮食计划表格导入 - 导入管道 Trait
// ==========================================
// 职责: 定义三个阶段的接口（不包含实现）
// 流程: 解码 → 校验 → 提取
// ==========================================

use crate::domain::types::MealSlots;
use crate::importer::error::ImportResult;
use crate::importer::extractor::ExtractionOutcome;
use crate::importer::file_parser::DecodeOptions;
use crate::importer::validator::SheetValidation;
use crate::importer::workbook::Workbook;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解码接口（阶段 0）
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 将上传文件解码为工作表
    ///
    /// # 参数
    /// - file_name: 原始文件名（用于格式识别）
    /// - bytes: 文件内容
    /// - options: 解码选项（工作表索引）
    ///
    /// # 返回
    /// - Ok(Workbook): 已解码的工作表
    /// - Err: 文件损坏、格式不支持
    fn decode(
        &self,
        file_name: &str,
        bytes: &[u8],
        options: &DecodeOptions,
    ) -> ImportResult<Workbook>;
}

// ==========================================
// SheetValidator Trait
// ==========================================
// 用途: 行级结构校验（阶段 1）
// 实现者: DietSheetValidator
pub trait SheetValidator: Send + Sync {
    /// 逐行校验工作表
    ///
    /// # 参数
    /// - workbook: 已解码的工作表
    /// - on_progress: 进度回调（0-100，单调不减）
    ///
    /// # 返回
    /// - SheetValidation: 汇总计数 + 行级错误 + 最后数据行
    ///
    /// # 说明
    /// - 结构错误作为数据返回，不会中断
    fn validate(&self, workbook: &Workbook, on_progress: &mut dyn FnMut(u8)) -> SheetValidation;
}

// ==========================================
// MealExtractor Trait
// ==========================================
// 用途: 餐次提取与规范化（阶段 2）
// 实现者: DietMealExtractor
pub trait MealExtractor: Send + Sync {
    /// 提取餐次与购物清单
    ///
    /// # 参数
    /// - workbook: 已解码的工作表
    /// - last_row: 校验阶段确定的最后数据行（None 表示无数据行）
    /// - slots: 每日餐次模板
    fn extract(
        &self,
        workbook: &Workbook,
        last_row: Option<usize>,
        slots: &MealSlots,
    ) -> ExtractionOutcome;
}
