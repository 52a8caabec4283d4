// ==========================================
// 饮食计划表格导入 - 工作簿与行访问器
// ==========================================
// 职责: 已解码工作表的只读视图 + 按列位置的类型化访问
// 说明: 越界/缺失单元格一律视为空白，不 panic
// ==========================================

use calamine::{Data, Range};

// ==========================================
// SheetColumn - 固定 5 列布局
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetColumn {
    Notes = 0,        // 备注（忽略）
    MealName = 1,     // 餐名
    Instructions = 2, // 制作方法
    Ingredients = 3,  // 配料（逗号分隔）
    Nutrition = 4,    // 营养简写 calories,protein,fat,carbs
}

impl SheetColumn {
    /// 判断空行时参与检查的列（0-3）
    pub const EMPTINESS_CHECK: [SheetColumn; 4] = [
        SheetColumn::Notes,
        SheetColumn::MealName,
        SheetColumn::Instructions,
        SheetColumn::Ingredients,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// 工作表声明范围（绝对坐标，0 起）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredRange {
    pub last_row: usize,
    pub last_col: usize,
}

// ==========================================
// Workbook - 已解码的单个工作表
// ==========================================
#[derive(Debug, Clone)]
pub struct Workbook {
    sheet_name: String,
    cells: Range<Data>,
}

impl Workbook {
    pub fn new(sheet_name: impl Into<String>, cells: Range<Data>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            cells,
        }
    }

    /// 由行数据构建工作表（CSV 解码与测试共用）
    ///
    /// 空字符串写为 `Data::Empty`，与 Excel 中的空单元格保持一致
    pub fn from_rows<R, S>(sheet_name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect();

        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Self::new(sheet_name, Range::empty());
        }

        let mut cells = Range::new((0, 0), ((height - 1) as u32, (width - 1) as u32));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                if !value.is_empty() {
                    cells.set_value((r as u32, c as u32), Data::String(value));
                }
            }
        }

        Self::new(sheet_name, cells)
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// 单元格查询（绝对坐标；范围外返回 None）
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Data> {
        let row = u32::try_from(row).ok()?;
        let col = u32::try_from(col).ok()?;
        self.cells.get_value((row, col))
    }

    /// 声明范围（空表返回 None）
    pub fn declared_range(&self) -> Option<DeclaredRange> {
        self.cells.end().map(|(row, col)| DeclaredRange {
            last_row: row as usize,
            last_col: col as usize,
        })
    }

    pub fn row(&self, index: usize) -> SheetRow<'_> {
        SheetRow {
            workbook: self,
            index,
        }
    }
}

// ==========================================
// SheetRow - 类型化行访问器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    workbook: &'a Workbook,
    index: usize,
}

impl<'a> SheetRow<'a> {
    /// 原始行索引（0 起）
    pub fn index(&self) -> usize {
        self.index
    }

    /// 表格行号（1 起）
    pub fn spreadsheet_row(&self) -> usize {
        self.index + 1
    }

    /// 读取单元格文本（已 TRIM；缺失单元格返回空串）
    pub fn text(&self, column: SheetColumn) -> String {
        match self.workbook.cell_at(self.index, column.index()) {
            None | Some(Data::Empty) => String::new(),
            Some(Data::String(s)) => s.trim().to_string(),
            Some(other) => other.to_string().trim().to_string(),
        }
    }

    pub fn is_blank(&self, column: SheetColumn) -> bool {
        self.text(column).is_empty()
    }

    /// 空行: 第 0-3 列全部空白
    pub fn is_empty(&self) -> bool {
        SheetColumn::EMPTINESS_CHECK
            .iter()
            .all(|&column| self.is_blank(column))
    }
}
