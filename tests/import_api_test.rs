// ==========================================
// ImportApi 集成测试
// ==========================================
// 测试范围: 配置快照 → 管道运行 → 运行记录 → 饮食计划映射
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

use chrono::NaiveDate;
use diet_sheet_import::api::{ApiError, ImportApi};
use diet_sheet_import::config::config_keys;
use diet_sheet_import::domain::{DietDraft, MealType};
use diet_sheet_import::importer::FileSource;
use diet_sheet_import::logging;

fn setup() -> (tempfile::NamedTempFile, ImportApi) {
    logging::init_test();
    let (temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let api = ImportApi::new(&db_path).expect("Failed to create ImportApi");
    (temp_file, api)
}

fn sample_source() -> FileSource {
    FileSource::Bytes {
        file_name: "dieta.xlsx".to_string(),
        bytes: test_helpers::build_xlsx(&test_helpers::sample_rows()),
    }
}

#[tokio::test]
async fn test_preliminary_validate_reports_row_errors() {
    let (_temp, api) = setup();

    let data = api.preliminary_validate(sample_source()).await.unwrap();

    assert_eq!(data.total_rows, 3);
    assert!(!data.is_valid);
    assert!(data.has_shopping_list);
    assert_eq!(data.errors.len(), 1);
    assert_eq!(data.errors[0].row, 4);
}

#[tokio::test]
async fn test_parse_records_completed_run() {
    let (_temp, api) = setup();

    let mut seen = Vec::new();
    let data = api
        .parse_diet_file(sample_source(), |p| seen.push(p))
        .await
        .unwrap();
    assert_eq!(data.meals.len(), 3);
    // 3 行远小于默认进度间隔
    assert!(seen.is_empty());

    let runs = api.list_recent_runs(10).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, "COMPLETED");
    assert_eq!(runs[0].mode, "FULL_PARSE");
    assert_eq!(runs[0].file_name, "dieta.xlsx");
    assert_eq!(runs[0].total_rows, 3);
    assert_eq!(runs[0].error_count, 1);
    assert_eq!(runs[0].meal_count, 3);
}

#[tokio::test]
async fn test_missing_file_is_import_error_and_recorded() {
    let (_temp, api) = setup();

    let result = api
        .parse_diet_file(FileSource::Path("/nonexistent/dieta.xlsx".into()), |_| {})
        .await;

    match result {
        Err(ApiError::ImportError(message)) => assert!(message.contains("dieta.xlsx")),
        other => panic!("Expected ImportError, got {:?}", other),
    }

    let runs = api.list_recent_runs(10).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, "FAILED");
    assert!(runs[0].error_message.is_some());
}

#[tokio::test]
async fn test_progress_interval_from_config() {
    let (_temp, api) = setup();
    api.config()
        .set_config_value(config_keys::PROGRESS_INTERVAL_ROWS, "50")
        .unwrap();

    let source = FileSource::Bytes {
        file_name: "duza.xlsx".to_string(),
        bytes: test_helpers::build_valid_xlsx(200),
    };

    let mut seen = Vec::new();
    api.parse_diet_file(source, |p| seen.push(p)).await.unwrap();

    assert_eq!(seen, vec![25, 50, 75, 100]);
}

#[tokio::test]
async fn test_build_diet_uses_configured_meals_per_day() {
    let (_temp, api) = setup();
    api.config()
        .set_config_value(config_keys::MEALS_PER_DAY, "2")
        .unwrap();

    let source = FileSource::Bytes {
        file_name: "dieta.xlsx".to_string(),
        bytes: test_helpers::build_valid_xlsx(5),
    };
    let parsed = api.parse_diet_file(source, |_| {}).await.unwrap();
    assert_eq!(parsed.meals[1].meal_type, MealType::Dinner);

    let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let diet = api
        .build_diet(
            &parsed,
            DietDraft {
                name: "Redukcja".to_string(),
                start_date: start,
            },
        )
        .await
        .unwrap();

    assert_eq!(diet.days.len(), 3);
    assert_eq!(diet.days[2].meals.len(), 1);
    assert_eq!(diet.end_date, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    assert_eq!(diet.meal_count(), 5);
    assert_eq!(diet.shopping_list.len(), 2);
    assert_eq!(diet.days[0].totals.map(|t| t.calories), Some(600.0));
}

#[tokio::test]
async fn test_build_diet_rejects_blank_name() {
    let (_temp, api) = setup();
    let parsed = api.parse_diet_file(sample_source(), |_| {}).await.unwrap();

    let result = api
        .build_diet(
            &parsed,
            DietDraft {
                name: "   ".to_string(),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            },
        )
        .await;

    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_diet_days_follow_parse_time_slots_after_config_change() {
    let (_temp, api) = setup();

    // 按默认 5 餐解析
    let source = FileSource::Bytes {
        file_name: "dieta.xlsx".to_string(),
        bytes: test_helpers::build_valid_xlsx(5),
    };
    let parsed = api.parse_diet_file(source, |_| {}).await.unwrap();

    // 构建前修改配置
    api.config()
        .set_config_value(config_keys::MEALS_PER_DAY, "2")
        .unwrap();

    let diet = api
        .build_diet(
            &parsed,
            DietDraft {
                name: "Pięć posiłków".to_string(),
                start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            },
        )
        .await
        .unwrap();

    assert_eq!(diet.days.len(), 1);
    let types: Vec<MealType> = diet.days[0].meals.iter().map(|m| m.meal_type).collect();
    assert_eq!(types, MealType::ALL.to_vec());
    assert_eq!(diet.end_date, diet.start_date);
}

#[tokio::test]
async fn test_build_diet_rejects_out_of_range_start_date() {
    let (_temp, api) = setup();
    let source = FileSource::Bytes {
        file_name: "dieta.xlsx".to_string(),
        bytes: test_helpers::build_valid_xlsx(10),
    };
    let parsed = api.parse_diet_file(source, |_| {}).await.unwrap();

    let result = api
        .build_diet(
            &parsed,
            DietDraft {
                name: "Koniec kalendarza".to_string(),
                start_date: NaiveDate::MAX,
            },
        )
        .await;

    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_get_run_by_id() {
    let (_temp, api) = setup();
    api.preliminary_validate(sample_source()).await.unwrap();

    let recent = api.list_recent_runs(1).await.unwrap();
    let run = api.get_run(&recent[0].run_id).await.unwrap();
    assert_eq!(run, recent[0]);
    assert_eq!(run.mode, "PRELIMINARY_VALIDATION");

    match api.get_run("nie-istnieje").await {
        Err(ApiError::NotFound(msg)) => assert!(msg.contains("nie-istnieje")),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}
