// ==========================================
// 面粉厂排产系统 - 结果导出
// ==========================================
// 输出: 输出目录下的 CSV 文件（始终带表头，空表也写表头）
// 顺序: 与 PlanResult 一致（日期、机组主数据顺序、start_hour）
// ==========================================

use crate::domain::PeriodGranularity;
use crate::engine::{PlanResult, PlanSummarizer};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// 导出错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("输出目录不可用: {path}: {message}")]
    OutputDir { path: String, message: String },

    #[error("文件写入失败: {0}")]
    WriteError(String),

    #[error("CSV 序列化失败: {0}")]
    CsvError(#[from] csv::Error),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::WriteError(err.to_string())
    }
}

pub type ExportResult<T> = Result<T, ExportError>;

// ===== 表头 =====
const SCHEDULE_HEADERS: &[&str] = &[
    "date",
    "mill_id",
    "recipe_id",
    "start_hour",
    "end_hour",
    "duration_hours",
    "changeover_hours",
    "tons_produced",
];
const LOAD_HEADERS: &[&str] = &[
    "date",
    "mill_id",
    "scheduled_hours",
    "available_hours",
    "overload_hours",
    "utilization_pct",
    "required_hours",
];
const MIX_HEADERS: &[&str] = &["date", "flour_type", "recipe_id", "allocation_pct"];
const RECIPE_DEMAND_HEADERS: &[&str] = &["date", "recipe_id", "flour_type", "recipe_required_tons"];
const SHORTFALL_HEADERS: &[&str] = &[
    "date",
    "mill_id",
    "recipe_id",
    "required_tons",
    "scheduled_tons",
    "reason",
];
const WARNING_HEADERS: &[&str] = &["date", "kind", "scope", "subject", "lost_tons", "message"];
const PERIOD_HEADERS: &[&str] = &[
    "period",
    "mill_id",
    "recipe_id",
    "production_hours",
    "changeover_hours",
    "tons_produced",
    "run_count",
];

// ==========================================
// CsvExporter
// ==========================================
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    /// 导出全部结果表
    ///
    /// # 参数
    /// - result: 批次结果
    /// - granularities: 额外输出的周期汇总粒度
    ///
    /// # 返回
    /// 写出的文件路径（按写出顺序）
    pub fn export(
        &self,
        result: &PlanResult,
        granularities: &[PeriodGranularity],
    ) -> ExportResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir).map_err(|e| ExportError::OutputDir {
            path: self.out_dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut written = vec![
            self.write_table("schedule.csv", SCHEDULE_HEADERS, &result.schedule)?,
            self.write_table("mill_load.csv", LOAD_HEADERS, &result.loads)?,
            self.write_table("recipe_mix.csv", MIX_HEADERS, &result.recipe_mix)?,
            self.write_table(
                "recipe_demand.csv",
                RECIPE_DEMAND_HEADERS,
                &result.recipe_demand,
            )?,
            self.write_table("shortfalls.csv", SHORTFALL_HEADERS, &result.shortfalls)?,
            self.write_table("warnings.csv", WARNING_HEADERS, &result.warnings)?,
            self.write_summary(result)?,
        ];

        for granularity in granularities {
            let plans = PlanSummarizer::new(*granularity).summarize(&result.schedule);
            written.push(self.write_table(
                &format!("plan_summary_{}.csv", granularity.to_string().to_lowercase()),
                PERIOD_HEADERS,
                &plans,
            )?);
        }

        info!(
            run_id = %result.run_id,
            out_dir = %self.out_dir.display(),
            files = written.len(),
            "排产结果导出完成"
        );

        Ok(written)
    }

    /// 写出单表
    pub fn write_table<T: Serialize>(
        &self,
        file_name: &str,
        headers: &[&str],
        rows: &[T],
    ) -> ExportResult<PathBuf> {
        let path = self.out_dir.join(file_name);
        let mut writer = WriterBuilder::new().has_headers(false).from_path(&path)?;

        writer.write_record(headers)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        Ok(path)
    }

    /// 批次摘要（metric,value）
    fn write_summary(&self, result: &PlanResult) -> ExportResult<PathBuf> {
        let summary = result.summary();
        let mut rows: Vec<(String, String)> = vec![
            ("run_id".to_string(), result.run_id.clone()),
            ("start_date".to_string(), result.start_date.to_string()),
            ("end_date".to_string(), result.end_date.to_string()),
            ("days".to_string(), summary.days.to_string()),
            (
                "schedule_entry_count".to_string(),
                summary.schedule_entry_count.to_string(),
            ),
            ("load_count".to_string(), summary.load_count.to_string()),
            ("warning_count".to_string(), summary.warning_count.to_string()),
            (
                "total_tons_produced".to_string(),
                format!("{:.3}", summary.total_tons_produced),
            ),
            (
                "total_lost_tons".to_string(),
                format!("{:.3}", summary.total_lost_tons),
            ),
        ];
        for (kind, count) in &summary.warnings_by_kind {
            rows.push((format!("warnings.{}", kind), count.to_string()));
        }

        self.write_table("summary.csv", &["metric", "value"], &rows)
    }
}
