// ==========================================
// 机器人设备数据导入系统 - 命令行入口
// ==========================================
// 用法:
//   fleet-import import <FILE>... --kind <KIND> [--validate-only] [--skip-errors]
//   fleet-import audit [--limit N]
// 报告以 JSON 输出到 stdout，日志输出到 stderr
// ==========================================

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fleet_import::db::{get_default_db_path, DB_PATH_ENV};
use fleet_import::domain::report::ImportRequest;
use fleet_import::domain::types::ImportStatus;
use fleet_import::{logging, ImportApi};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "机器人设备数据导入系统", long_about = None)]
struct Cli {
    /// SQLite 数据库路径（默认: 环境变量或用户数据目录）
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 导入（或仅校验）一个或多个文件
    Import(ImportArgs),

    /// 查看最近的审计记录
    Audit {
        /// 返回条数
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Args)]
struct ImportArgs {
    /// 待导入文件（.csv / .xlsx / .xls / .json）
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// 实体类别: camera / robot / task / user / map
    #[arg(long)]
    kind: String,

    /// 只校验不落库
    #[arg(long)]
    validate_only: bool,

    /// 跳过有校验错误的行，其余行照常落库
    #[arg(long)]
    skip_errors: bool,

    /// 批大小（缺省取配置）
    #[arg(long)]
    batch_size: Option<usize>,

    /// 操作人
    #[arg(long)]
    actor: Option<String>,

    /// 字段映射 SRC=DST，可重复
    #[arg(long = "map", value_parser = parse_mapping)]
    mappings: Vec<(String, String)>,
}

impl ImportArgs {
    fn request_for(&self, file: &PathBuf) -> ImportRequest {
        let mut request = ImportRequest::new(file.to_string_lossy(), self.kind.clone());
        if self.validate_only {
            request = request.validate_only();
        }
        if self.skip_errors {
            request = request.with_skip_errors(true);
        }
        if let Some(size) = self.batch_size {
            request = request.with_batch_size(size);
        }
        if let Some(actor) = &self.actor {
            request = request.with_actor(actor.clone());
        }
        for (source, target) in &self.mappings {
            request = request.with_field_mapping(source.clone(), target.clone());
        }
        request
    }
}

fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    let (source, target) = raw
        .split_once('=')
        .ok_or_else(|| format!("字段映射格式应为 SRC=DST: {}", raw))?;
    let (source, target) = (source.trim(), target.trim());
    if source.is_empty() || target.is_empty() {
        return Err(format!("字段映射两侧均不能为空: {}", raw));
    }
    Ok((source.to_string(), target.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();

    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!("{} v{} - 数据库: {}", fleet_import::APP_NAME, fleet_import::VERSION, db_path);
    let api = ImportApi::new(&db_path).context("无法初始化导入服务")?;

    match cli.command {
        Commands::Import(args) => {
            let mut reports = Vec::with_capacity(args.files.len());
            if args.files.len() == 1 {
                let file = &args.files[0];
                reports.push(api.import_file(file, args.request_for(file)).await);
            } else {
                let mut jobs = Vec::with_capacity(args.files.len());
                for file in &args.files {
                    let bytes = tokio::fs::read(file).await.unwrap_or_else(|e| {
                        tracing::warn!(path = %file.display(), error = %e, "文件读取失败");
                        Vec::new()
                    });
                    jobs.push((bytes, args.request_for(file)));
                }
                reports = api.import_many(jobs).await;
            }

            let failed = reports
                .iter()
                .any(|r| matches!(r.status, ImportStatus::Error | ImportStatus::Failure));
            let output = if reports.len() == 1 {
                serde_json::to_string_pretty(&reports[0])?
            } else {
                serde_json::to_string_pretty(&reports)?
            };
            println!("{}", output);

            Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Audit { limit } => {
            let entries = api.list_audit_logs(limit)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
