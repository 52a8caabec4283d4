// ==========================================
// 饮食计划表格导入 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解码
// 支持: Excel (.xlsx/.xlsm/.xls/.xlsb) / OpenDocument (.ods) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use crate::importer::workbook::Workbook;
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

/// 解码选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// 读取的工作表索引（0 起）
    pub sheet_index: usize,
}

const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 分隔符嗅探: 首行 ';' 多于 ',' 时按分号分隔
    fn sniff_delimiter(text: &str) -> u8 {
        let first_line = text.lines().next().unwrap_or("");
        let semicolons = first_line.matches(';').count();
        let commas = first_line.matches(',').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }
}

impl FileParser for CsvParser {
    fn decode(
        &self,
        file_name: &str,
        bytes: &[u8],
        _options: &DecodeOptions,
    ) -> ImportResult<Workbook> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ImportError::CsvParseError(format!("niepoprawne kodowanie UTF-8: {}", e)))?;
        let text = text.trim_start_matches('\u{feff}');

        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头作为第 0 行保留
            .flexible(true) // 允许行长度不一致
            .delimiter(Self::sniff_delimiter(text))
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<String>>());
        }

        Ok(Workbook::from_rows(file_name, rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn decode(
        &self,
        _file_name: &str,
        bytes: &[u8],
        options: &DecodeOptions,
    ) -> ImportResult<Workbook> {
        // 自动识别 xlsx / xls / xlsb / ods
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError(
                "plik nie zawiera żadnego arkusza".to_string(),
            ));
        }

        let sheet_name = sheet_names
            .get(options.sheet_index)
            .cloned()
            .ok_or(ImportError::SheetNotFound(options.sheet_index))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        Ok(Workbook::new(sheet_name, range))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn decode(
        &self,
        file_name: &str,
        bytes: &[u8],
        options: &DecodeOptions,
    ) -> ImportResult<Workbook> {
        let ext = extension_of(file_name);

        match ext.as_str() {
            "csv" => CsvParser.decode(file_name, bytes, options),
            // 无扩展名时交给 calamine 按内容识别
            "" => ExcelParser.decode(file_name, bytes, options),
            e if EXCEL_EXTENSIONS.contains(&e) => ExcelParser.decode(file_name, bytes, options),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::workbook::SheetColumn;

    #[test]
    fn test_csv_parser_keeps_header_row() {
        let csv = "Uwagi,Nazwa,Przygotowanie,Składniki\n,Owsianka,Ugotować,\"płatki, mleko\"\n";
        let wb = CsvParser
            .decode("dieta.csv", csv.as_bytes(), &DecodeOptions::default())
            .unwrap();

        assert_eq!(wb.declared_range().unwrap().last_row, 1);
        assert_eq!(wb.row(0).text(SheetColumn::MealName), "Nazwa");
        assert_eq!(wb.row(1).text(SheetColumn::Ingredients), "płatki, mleko");
    }

    #[test]
    fn test_csv_parser_semicolon_delimiter() {
        let csv = "\u{feff}Uwagi;Nazwa;Przygotowanie;Składniki;Wartości\n;Jajecznica;Usmażyć;jajka, masło;300,20,25,2\n";
        let wb = CsvParser
            .decode("dieta.csv", csv.as_bytes(), &DecodeOptions::default())
            .unwrap();

        let row = wb.row(1);
        assert_eq!(row.text(SheetColumn::Ingredients), "jajka, masło");
        assert_eq!(row.text(SheetColumn::Nutrition), "300,20,25,2");
    }

    #[test]
    fn test_csv_parser_invalid_utf8() {
        let result = CsvParser.decode("dieta.csv", &[0xff, 0xfe, 0xfd], &DecodeOptions::default());
        assert!(matches!(result, Err(ImportError::CsvParseError(_))));
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let result = ExcelParser.decode(
            "dieta.xlsx",
            b"to nie jest arkusz",
            &DecodeOptions::default(),
        );
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_universal_parser_unsupported_extension() {
        let result = UniversalFileParser.decode("dieta.pdf", b"%PDF", &DecodeOptions::default());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));
    }
}
