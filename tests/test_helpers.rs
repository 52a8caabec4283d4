// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、表格文件生成等功能
// ==========================================
#![allow(dead_code)]

use diet_sheet_import::db::{init_schema, open_sqlite_connection};
use rusqlite::Connection;
use std::error::Error;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// 表头行（第 0 行总是被跳过）
pub const HEADER: [&str; 5] = ["Uwagi", "Nazwa", "Przygotowanie", "Składniki", "Wartości"];

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 构建 xlsx 文件内容（第一行为表头，空字符串单元格不写入）
pub fn build_xlsx(rows: &[[&str; 5]]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, title) in HEADER.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet
                    .write_string((r + 1) as u32, col as u16, *value)
                    .unwrap();
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

/// 构建 n 行合法数据的 xlsx
pub fn build_valid_xlsx(n: usize) -> Vec<u8> {
    let names: Vec<String> = (0..n).map(|i| format!("Posiłek {}", i + 1)).collect();
    let rows: Vec<[&str; 5]> = names
        .iter()
        .map(|name| [
            "",
            name.as_str(),
            "Wymieszać",
            "jajko, chleb",
            "300,20,10,30",
        ])
        .collect();
    build_xlsx(&rows)
}

/// 将内容写入临时目录下的文件
pub fn write_file(dir: &Path, file_name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// 创建临时目录
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// 三行标准样例（营养值 / 无营养值 / 缺少配料）
pub fn sample_rows() -> Vec<[&'static str; 5]> {
    vec![
        ["", "Owsianka", "Ugotować", "płatki owsiane 50g, mleko 200ml", "350,12,7,55"],
        ["", "Kanapka", "Złożyć", "chleb, ser", ""],
        ["", "Zupa", "Ugotować", "", "abc"],
    ]
}
