// ==========================================
// 面粉厂排产系统 - 排产批次错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 只有静态配置/输入结构性错误会使批次失败；
//       单元级失败以 PlanWarning 形式返回
// ==========================================

use crate::config::ConfigError;
use crate::exporter::ExportError;
use crate::importer::ImportError;
use crate::repository::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// 排产批次错误类型
#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("导入错误: {0}")]
    Import(#[from] ImportError),

    #[error("仓储错误: {0}")]
    Repository(#[from] RepositoryError),

    #[error("导出错误: {0}")]
    Export(#[from] ExportError),

    #[error("日期范围非法: start={start} > end={end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("排产线程池创建失败: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type PlanningResult<T> = Result<T, PlanningError>;
