// ==========================================
// 饮食计划表格导入 - 命令行入口
// ==========================================
// 子命令: validate / parse / runs / run / config
// 输出: stdout 为 JSON 结果，日志写 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use diet_sheet_import::api::ImportApi;
use diet_sheet_import::domain::DietDraft;
use diet_sheet_import::importer::FileSource;
use diet_sheet_import::logging;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for diet-sheet-import
#[derive(Parser, Debug)]
#[command(name = "diet-sheet-import")]
#[command(about = "Import i walidacja arkuszy z planem diety")]
#[command(version)]
struct Args {
    /// SQLite database holding configuration and run history
    #[arg(long, global = true, env = "DIET_IMPORT_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preliminary validation of one or more files (no meal extraction)
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Full parse; with --name the result is mapped into a multi-day diet
    Parse {
        file: PathBuf,

        /// Diet name (enables diet mapping)
        #[arg(long)]
        name: Option<String>,

        /// First day of the diet (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// Recent import runs
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Single import run by id
    Run { run_id: String },

    /// Show configuration, optionally overriding entries first
    Config {
        /// KEY=VALUE, e.g. import/meals_per_day=3
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();
    let db_path = args.db.unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建数据库目录: {}", parent.display()))?;
        }
    }

    info!(
        version = diet_sheet_import::VERSION,
        db = %db_path.display(),
        "diet-sheet-import 启动"
    );

    let api = ImportApi::new(&db_path.to_string_lossy()).context("初始化 ImportApi 失败")?;

    match args.command {
        Command::Validate { files } => {
            let sources = files.into_iter().map(FileSource::Path).collect();
            let items = api.batch_preliminary_validate(sources).await?;
            print_json(&items)?;
        }
        Command::Parse {
            file,
            name,
            start_date,
        } => {
            let parsed = api
                .parse_diet_file(FileSource::Path(file), |progress| {
                    info!(progress, "解析进度");
                })
                .await?;

            match name {
                Some(name) => {
                    let draft = DietDraft {
                        name,
                        start_date: start_date.unwrap_or_else(|| Utc::now().date_naive()),
                    };
                    let diet = api.build_diet(&parsed, draft).await?;
                    print_json(&diet)?;
                }
                None => print_json(&parsed)?,
            }
        }
        Command::Runs { limit } => {
            let runs = api.list_recent_runs(limit).await?;
            print_json(&runs)?;
        }
        Command::Run { run_id } => {
            let run = api.get_run(&run_id).await?;
            print_json(&run)?;
        }
        Command::Config { set } => {
            for entry in &set {
                let Some((key, value)) = entry.split_once('=') else {
                    bail!("oczekiwano KEY=VALUE, otrzymano: {}", entry);
                };
                api.config()
                    .set_config_value(key.trim(), value.trim())
                    .map_err(|e| anyhow::anyhow!(e))?;
            }
            let snapshot = api
                .config()
                .get_config_snapshot()
                .map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", snapshot);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 默认数据库路径: <data_dir>/diet-sheet-import/diet_import.db
fn default_db_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join(diet_sheet_import::APP_NAME).join("diet_import.db"),
        None => PathBuf::from("./diet_import.db"),
    }
}
