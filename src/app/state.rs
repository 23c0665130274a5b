// ==========================================
// 面粉厂排产系统 - 应用状态
// ==========================================
// 职责: 持有共享数据库连接、配置管理器与仓储实例
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::info;

use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::PlanningResult;
use crate::repository::{PlanRepository, PlanRunRepository, RepositoryError};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "FLOUR_MILL_APS_DB_PATH";

/// 应用状态
///
/// 所有组件共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub conn: Arc<Mutex<Connection>>,

    /// 配置管理器（config_kv）
    pub config_manager: Arc<ConfigManager>,

    /// 排产结果仓储
    pub plan_repo: Arc<PlanRepository>,

    /// 批次记录仓储
    pub plan_run_repo: Arc<PlanRunRepository>,
}

impl AppState {
    /// 打开数据库并初始化表结构（幂等）
    pub fn new(db_path: String) -> PlanningResult<Self> {
        let conn = open_sqlite_connection(&db_path).map_err(RepositoryError::from)?;
        init_schema(&conn).map_err(RepositoryError::from)?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let plan_repo = Arc::new(PlanRepository::new(conn.clone()));
        let plan_run_repo = Arc::new(PlanRunRepository::new(conn.clone()));

        info!(db_path = %db_path, "应用状态初始化完成");

        Ok(Self {
            db_path,
            conn,
            config_manager,
            plan_repo,
            plan_run_repo,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 FLOUR_MILL_APS_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./flour_mill_aps.db");

    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join("flour-mill-aps");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&app_dir).is_ok() {
            path = app_dir.join("flour_mill_aps.db");
        }
    }

    path.to_string_lossy().to_string()
}
