// ==========================================
// 面粉厂排产系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::planning_config_trait::{
    PlanningConfigReader, DEFAULT_ALLOCATION_TOLERANCE, DEFAULT_CHANGEOVER_HOURS,
};
use crate::db::open_sqlite_connection;
use crate::domain::SeasonalShiftRule;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（需已执行 db::init_schema）
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ConfigError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 写入 global scope 配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式，键有序）
    ///
    /// # 用途
    /// - 记录到 plan_run，便于追溯批次使用的参数
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&config_map).map_err(|e| ConfigError::Other(e.into()))
    }

    /// 读取并解析 f64 配置，缺省时返回默认值
    fn get_f64_or_default(&self, key: &str, default: f64) -> ConfigResult<f64> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => {
                let value = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| ConfigError::ConfigValueError {
                        key: key.to_string(),
                        value: raw.clone(),
                        message: e.to_string(),
                    })?;
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::ConfigValueError {
                        key: key.to_string(),
                        value: raw,
                        message: "必须为非负有限数".to_string(),
                    });
                }
                Ok(value)
            }
        }
    }
}

#[async_trait]
impl PlanningConfigReader for ConfigManager {
    async fn get_changeover_hours(&self) -> ConfigResult<f64> {
        self.get_f64_or_default(config_keys::CHANGEOVER_HOURS, DEFAULT_CHANGEOVER_HOURS)
    }

    async fn get_allocation_tolerance(&self) -> ConfigResult<f64> {
        self.get_f64_or_default(config_keys::ALLOCATION_TOLERANCE, DEFAULT_ALLOCATION_TOLERANCE)
    }

    async fn get_seasonal_shift_rules(&self) -> ConfigResult<Vec<SeasonalShiftRule>> {
        let Some(raw) = self.get_config_value(config_keys::SEASONAL_SHIFT_RULES)? else {
            return Ok(SeasonalShiftRule::default_rules());
        };

        let rules: Vec<SeasonalShiftRule> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ConfigValueError {
                key: config_keys::SEASONAL_SHIFT_RULES.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            })?;

        if let Some(bad) = rules.iter().find(|r| !r.bonus.is_finite()) {
            return Err(ConfigError::ConfigValueError {
                key: config_keys::SEASONAL_SHIFT_RULES.to_string(),
                value: raw.clone(),
                message: format!("规则加成非法: recipe_id={}", bad.recipe_id),
            });
        }

        Ok(rules)
    }

    async fn get_worker_threads(&self) -> ConfigResult<usize> {
        match self.get_config_value(config_keys::WORKER_THREADS)? {
            None => Ok(0),
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::ConfigValueError {
                    key: config_keys::WORKER_THREADS.to_string(),
                    value: raw.clone(),
                    message: e.to_string(),
                }),
        }
    }

    async fn get_maintenance_days(&self) -> ConfigResult<Vec<(String, NaiveDate)>> {
        let Some(raw) = self.get_config_value(config_keys::MAINTENANCE_DAYS)? else {
            return Ok(Vec::new());
        };

        // 格式: M1:2026-03-02,M2:2026-03-05
        let mut days = Vec::new();
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let parsed = item.split_once(':').and_then(|(mill_id, date)| {
                NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                    .ok()
                    .map(|d| (mill_id.trim().to_string(), d))
            });
            match parsed {
                Some(day) => days.push(day),
                None => {
                    return Err(ConfigError::ConfigValueError {
                        key: config_keys::MAINTENANCE_DAYS.to_string(),
                        value: item.to_string(),
                        message: "期望格式 MILL_ID:YYYY-MM-DD".to_string(),
                    })
                }
            }
        }
        Ok(days)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 排产
    pub const CHANGEOVER_HOURS: &str = "changeover_hours";
    pub const WORKER_THREADS: &str = "worker_threads";

    // 配方配比
    pub const ALLOCATION_TOLERANCE: &str = "allocation_tolerance";
    pub const SEASONAL_SHIFT_RULES: &str = "seasonal_shift_rules"; // JSON 数组

    // 产能
    pub const MAINTENANCE_DAYS: &str = "maintenance_days";
}
