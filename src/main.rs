// ==========================================
// 面粉厂排产系统 - 批处理主入口
// ==========================================
// 用法:
//   flour-mill-aps <data_dir> <start> <end>
//       [--db PATH] [--out DIR] [--summary week,month] [--set KEY=VALUE]...
// ==========================================

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use flour_mill_aps::app::{get_default_db_path, run_batch, AppState, BatchRequest};
use flour_mill_aps::domain::PeriodGranularity;
use flour_mill_aps::importer::parse_date_text;
use flour_mill_aps::logging;

const USAGE: &str = "用法: flour-mill-aps <data_dir> <start> <end> [--db PATH] [--out DIR] [--summary week,month] [--set KEY=VALUE]...";

struct CliArgs {
    request: BatchRequest,
    db_path: Option<String>,
    config_overrides: Vec<(String, String)>,
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut positional = Vec::new();
    let mut db_path = None;
    let mut out_dir = None;
    let mut granularities = Vec::new();
    let mut config_overrides = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => {
                db_path = Some(iter.next().ok_or_else(|| anyhow!("--db 缺少参数"))?);
            }
            "--out" => {
                out_dir = Some(PathBuf::from(
                    iter.next().ok_or_else(|| anyhow!("--out 缺少参数"))?,
                ));
            }
            "--summary" => {
                let value = iter.next().ok_or_else(|| anyhow!("--summary 缺少参数"))?;
                for part in value.split(',').filter(|p| !p.trim().is_empty()) {
                    let g = PeriodGranularity::parse(part)
                        .ok_or_else(|| anyhow!("未知汇总粒度: {}", part))?;
                    granularities.push(g);
                }
            }
            "--set" => {
                let value = iter.next().ok_or_else(|| anyhow!("--set 缺少参数"))?;
                let (key, val) = value
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--set 需要 KEY=VALUE 格式: {}", value))?;
                config_overrides.push((key.trim().to_string(), val.trim().to_string()));
            }
            "-h" | "--help" => bail!("{}", USAGE),
            _ => positional.push(arg),
        }
    }

    if positional.len() != 3 {
        bail!("{}", USAGE);
    }

    let start = parse_date_text(&positional[1])
        .ok_or_else(|| anyhow!("起始日期格式错误: {}", positional[1]))?;
    let end = parse_date_text(&positional[2])
        .ok_or_else(|| anyhow!("结束日期格式错误: {}", positional[2]))?;

    Ok(CliArgs {
        request: BatchRequest {
            data_dir: PathBuf::from(&positional[0]),
            start,
            end,
            out_dir,
            granularities,
        },
        db_path,
        config_overrides,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = parse_args(std::env::args().skip(1).collect())?;

    tracing::info!("==================================================");
    tracing::info!("{} v{}", flour_mill_aps::APP_NAME, flour_mill_aps::VERSION);
    tracing::info!("==================================================");

    let db_path = cli.db_path.unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).context("无法初始化应用状态")?;

    for (key, value) in &cli.config_overrides {
        state
            .config_manager
            .set_config_value(key, value)
            .with_context(|| format!("写入配置失败: {}", key))?;
        tracing::info!(key = %key, value = %value, "配置已覆写");
    }

    let report = run_batch(&state, &cli.request)
        .await
        .context("排产批次执行失败")?;

    tracing::info!(
        run_id = %report.run_id,
        days = report.summary.days,
        entries = report.summary.schedule_entry_count,
        warnings = report.summary.warning_count,
        tons = report.summary.total_tons_produced,
        "完成"
    );
    for (kind, count) in &report.summary.warnings_by_kind {
        tracing::warn!(kind = %kind, count = *count, "数据质量告警");
    }

    Ok(())
}
