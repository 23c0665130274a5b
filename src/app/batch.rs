// ==========================================
// 面粉厂排产系统 - 批次执行
// ==========================================
// 流程: 导入 → 排产 → 整段替换落库 → 批次记录 → 导出
// ==========================================

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::app::state::AppState;
use crate::domain::PeriodGranularity;
use crate::engine::{PlanRunSummary, PlanningOrchestrator, PlanningResult};
use crate::exporter::CsvExporter;
use crate::importer::PlanningDataImporter;
use crate::repository::ReplaceSummary;

/// 批次请求
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub data_dir: PathBuf,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub out_dir: Option<PathBuf>,
    pub granularities: Vec<PeriodGranularity>,
}

/// 批次报告
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub run_id: String,
    pub summary: PlanRunSummary,
    pub replaced: ReplaceSummary,
    pub exported: Vec<PathBuf>,
}

/// 执行一次完整批次
#[instrument(skip(state, request), fields(start = %request.start, end = %request.end))]
pub async fn run_batch(state: &AppState, request: &BatchRequest) -> PlanningResult<BatchReport> {
    // 1. 导入
    let imported = PlanningDataImporter::new(&request.data_dir).import()?;
    let inputs = imported.into_inputs();

    // 2. 排产（配置快照与参数在同一时刻读取）
    let config_snapshot = state.config_manager.get_config_snapshot()?;
    let orchestrator = PlanningOrchestrator::new(state.config_manager.clone());
    let result = orchestrator.run(&inputs, request.start, request.end).await?;

    // 3. 落库
    let replaced = state.plan_repo.replace_range(&result)?;
    state
        .plan_run_repo
        .insert(&result, Some(config_snapshot.as_str()))?;

    // 4. 导出
    let exported = match &request.out_dir {
        Some(dir) => CsvExporter::new(dir).export(&result, &request.granularities)?,
        None => Vec::new(),
    };

    let summary = result.summary();
    info!(
        run_id = %result.run_id,
        entries = summary.schedule_entry_count,
        warnings = summary.warning_count,
        inserted = replaced.inserted,
        exported = exported.len(),
        "批次执行完成"
    );

    Ok(BatchReport {
        run_id: result.run_id,
        summary,
        replaced,
        exported,
    })
}
