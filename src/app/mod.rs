// ==========================================
// 面粉厂排产系统 - 应用层
// ==========================================
// 职责: 组装数据库、配置、导入、引擎与仓储，执行批次
// ==========================================

pub mod batch;
pub mod state;

// 重导出
pub use batch::{run_batch, BatchReport, BatchRequest};
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
